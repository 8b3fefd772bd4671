//! Error types for the wire layer.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Errors raised while framing or formatting IRC lines.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Outbound line exceeded the maximum allowed length.
    #[error("line too long: {actual} bytes (limit: {limit})")]
    LineTooLong {
        /// Actual line length, terminator included.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },

    /// Illegal control character in an outbound line.
    #[error("illegal control character: {0:?}")]
    IllegalControlChar(char),

    /// Command verb was empty or not alphanumeric.
    #[error("invalid command verb: {0:?}")]
    InvalidVerb(String),

    /// A middle parameter was empty, contained a space, or began with `:`.
    #[error("invalid middle parameter: {0:?}")]
    InvalidParameter(String),
}

/// Check whether a character may not appear in an outbound line.
///
/// CR, LF and NUL always terminate or corrupt a line. Other C0 controls are
/// allowed only when they are IRC formatting codes or the CTCP delimiter.
pub fn is_illegal_control_char(ch: char) -> bool {
    match ch {
        '\r' | '\n' | '\0' | '\x07' => true,
        // CTCP delimiter, bold, color, reset, reverse, italics, strikethrough, underline, monospace
        '\x01' | '\x02' | '\x03' | '\x0F' | '\x16' | '\x1D' | '\x1E' | '\x1F' | '\x11' => false,
        c => c.is_control(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_terminators_are_illegal() {
        assert!(is_illegal_control_char('\r'));
        assert!(is_illegal_control_char('\n'));
        assert!(is_illegal_control_char('\0'));
    }

    #[test]
    fn test_formatting_codes_are_allowed() {
        assert!(!is_illegal_control_char('\x01'));
        assert!(!is_illegal_control_char('\x02'));
        assert!(!is_illegal_control_char('\x03'));
        assert!(!is_illegal_control_char('a'));
    }

    #[test]
    fn test_error_display() {
        let err = ProtocolError::LineTooLong {
            actual: 600,
            limit: 512,
        };
        assert_eq!(err.to_string(), "line too long: 600 bytes (limit: 512)");
    }
}
