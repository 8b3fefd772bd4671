//! slirc-bot: an IRC client framework.
//!
//! Raw server lines are matched against a declarative [`grammar`] and turned
//! into named events. Each event runs through the built-in session reactions
//! ([`client`]) and then an ordered chain of pluggable handlers
//! ([`dispatch`]). Handlers talk back to their session through a
//! [`client::ClientHandle`]. Events can also be fanned out to remote workers
//! through a shared coordination space ([`distributed`]).

pub mod client;
pub mod config;
pub mod dispatch;
pub mod distributed;
pub mod error;
pub mod grammar;
pub mod handlers;
pub mod telemetry;
