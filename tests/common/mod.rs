//! Integration test common infrastructure.
//!
//! Provides a scripted fake IRC server for the bot to connect to, and a
//! handler that records every event it sees.

pub mod recorder;
pub mod server;

#[allow(unused_imports)]
pub use recorder::Recorder;
#[allow(unused_imports)]
pub use server::{FakeServer, Peer};

use slirc_bot::client::{ClientProfile, Connection, ConnectionRegistry};
use slirc_bot::config::{Config, NetworkConfig};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A connection task running against a fake server.
#[allow(dead_code)]
pub struct Running {
    pub task: JoinHandle<anyhow::Result<()>>,
    pub shutdown: watch::Sender<bool>,
    pub registry: Arc<ConnectionRegistry>,
}

/// Config with fast reconnects so tests do not wait on backoff.
#[allow(dead_code)]
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.reconnect.initial_delay_ms = 10;
    config.reconnect.max_delay_ms = 50;
    config.reconnect.max_attempts = 3;
    config
}

/// Spawn a connection task for `network`.
#[allow(dead_code)]
pub fn spawn_connection(
    profile: Arc<ClientProfile>,
    network: NetworkConfig,
    config: &Config,
) -> Running {
    let registry = Arc::new(ConnectionRegistry::new());
    let (shutdown, shutdown_rx) = watch::channel(false);
    let connection = Connection::new(profile, Arc::clone(&registry), network, config);
    Running {
        task: tokio::spawn(connection.run(shutdown_rx)),
        shutdown,
        registry,
    }
}
