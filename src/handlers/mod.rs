//! Stock handlers.

mod commands;
mod logging;

pub use commands::{CommandContext, CommandRouter};
pub use logging::{LoggingHandler, CHATLOG_TARGET};
