//! # slirc-wire
//!
//! The wire layer of the slirc-bot client framework: everything that touches
//! raw IRC lines without knowing what they mean.
//!
//! - [`line::LineCodec`] frames a byte stream into CRLF-terminated lines
//! - [`OutboundLine`] builds outbound commands with one consistent rule for
//!   the trailing parameter
//! - [`split_params`] breaks a parameter string back into arguments
//! - [`ChannelExt`] and [`normalize_channel`] handle channel names
//!
//! ## Quick Start
//!
//! ```rust
//! use slirc_wire::OutboundLine;
//!
//! let line = OutboundLine::privmsg("#rust", "Hello, world!").render().unwrap();
//! assert_eq!(line, "PRIVMSG #rust :Hello, world!");
//!
//! let pong = OutboundLine::pong("abc123").render().unwrap();
//! assert_eq!(pong, "PONG abc123");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod chan;
pub mod command;
pub mod error;
#[cfg(feature = "codec")]
pub mod line;
pub mod params;

pub use self::chan::{normalize_channel, ChannelExt};
pub use self::command::{ctcp_action, needs_trailing, OutboundLine};
pub use self::error::ProtocolError;
#[cfg(feature = "codec")]
pub use self::line::LineCodec;
pub use self::params::split_params;

/// Maximum IRC line length in bytes, including the CRLF terminator.
pub const MAX_LINE_LEN: usize = 512;
