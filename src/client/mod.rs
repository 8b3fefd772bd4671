//! Client sessions.
//!
//! - [`session`]: the per-connection state machine (sans-IO)
//! - [`runner`]: drives a session over a socket and reconnects it
//! - [`handle`]: what handlers use to talk back to their session
//! - [`registry`]: live sessions in this process
//! - [`profile`]: the grammar and handler chain sessions share

mod backoff;
mod handle;
mod profile;
mod registry;
mod runner;
mod session;
mod state;
mod transport;

pub use backoff::Backoff;
pub use handle::{ClientCommand, ClientHandle};
pub use profile::{ClientProfile, ClientProfileBuilder};
pub use registry::{ConnectionRegistry, SessionEntry};
pub use runner::{drive, Connection, QUIT_GRACE};
pub use session::Session;
pub use state::{DisconnectOutcome, SessionState};
pub use transport::{open, IrcStream};

/// Unique per session, regenerated on every reconnect.
pub type SessionId = uuid::Uuid;
