//! Tracing setup and span constructors.

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise everything at `info` and above.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match config.format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

/// Standardized span constructors.
pub mod spans {
    use std::net::SocketAddr;
    use tracing::{debug_span, info_span, Span};

    use crate::client::SessionId;

    /// One client session (one connection attempt).
    pub fn session(id: &SessionId, server: &str) -> Span {
        info_span!("session", id = %id, server = %server)
    }

    /// One handler invocation.
    pub fn handler(name: &str, event: &str) -> Span {
        debug_span!("handler", name = %name, event = %event)
    }

    /// The link task forwarding events to the coordination space.
    pub fn bridge() -> Span {
        info_span!("bridge")
    }

    /// A remote worker consuming from the coordination space.
    pub fn worker(space: &SocketAddr) -> Span {
        info_span!("worker", space = %space)
    }

    /// One peer connection on the coordination space server.
    pub fn space_peer(peer: &SocketAddr) -> Span {
        info_span!("space_peer", peer = %peer)
    }
}
