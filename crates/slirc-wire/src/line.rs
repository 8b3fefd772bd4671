//! Line-based codec for tokio.
//!
//! Reads CRLF- (or bare LF-) terminated lines and hands them out without the
//! terminator; writes lines with a CRLF appended.
//!
//! A client cannot ask the server to resend, so the decoder is lenient where
//! a daemon would be strict: invalid UTF-8 is replaced rather than rejected,
//! and lines longer than the limit are skipped instead of failing the stream.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{self, is_illegal_control_char, ProtocolError};
use crate::MAX_LINE_LEN;

/// Line-based codec that handles newline-terminated messages.
#[derive(Debug)]
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length, terminator included
    max_len: usize,
    /// Set while skipping the remainder of an over-long line
    discarding: bool,
}

impl LineCodec {
    /// Create a codec with the standard 512 byte limit.
    pub fn new() -> Self {
        Self::with_max_len(MAX_LINE_LEN)
    }

    /// Create a codec with a custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            discarding: false,
        }
    }

    /// Maximum line length this codec accepts.
    pub fn max_len(&self) -> usize {
        self.max_len
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        loop {
            let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
                if self.discarding {
                    src.clear();
                    self.next_index = 0;
                } else if src.len() > self.max_len {
                    // Partial line already over the limit: drop it and skip to the next newline
                    src.clear();
                    self.next_index = 0;
                    self.discarding = true;
                } else {
                    self.next_index = src.len();
                }
                return Ok(None);
            };

            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if self.discarding {
                self.discarding = false;
                continue;
            }
            if line.len() > self.max_len {
                continue;
            }

            let text = String::from_utf8_lossy(&line);
            let text = text.trim_end_matches(&['\r', '\n'][..]);
            if text.is_empty() {
                continue;
            }
            return Ok(Some(text.to_string()));
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> error::Result<()> {
        let line = line.trim_end_matches(&['\r', '\n'][..]);

        if let Some(ch) = line.chars().find(|c| is_illegal_control_char(*c)) {
            return Err(ProtocolError::IllegalControlChar(ch));
        }

        let framed_len = line.len() + 2;
        if framed_len > self.max_len {
            return Err(ProtocolError::LineTooLong {
                actual: framed_len,
                limit: self.max_len,
            });
        }

        dst.reserve(framed_len);
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}
