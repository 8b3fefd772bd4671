//! Coordination space configuration.
//!
//! `[distributed]` is read by sessions that forward events, `[space]` by the
//! `slirc-space` process that hosts the tuple store.

use serde::Deserialize;

use super::defaults::{default_backlog, default_discovery_port, default_space_bind};

/// Event forwarding from a client process to the coordination space.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DistributedConfig {
    /// Register the dispatch bridge.
    #[serde(default)]
    pub enabled: bool,
    /// Fixed space address. When unset the space is located by UDP broadcast.
    pub space_addr: Option<String>,
    #[serde(default = "default_discovery_port")]
    pub discovery_port: u16,
    /// Tuples kept while the space is unreachable; oldest are dropped first.
    #[serde(default = "default_backlog")]
    pub backlog: usize,
}

impl Default for DistributedConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            space_addr: None,
            discovery_port: default_discovery_port(),
            backlog: default_backlog(),
        }
    }
}

/// The coordination space process.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpaceConfig {
    /// TCP address to accept producers and workers on.
    #[serde(default = "default_space_bind")]
    pub bind: String,
    /// UDP port to answer discovery probes on.
    #[serde(default = "default_discovery_port")]
    pub discovery_port: u16,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            bind: default_space_bind(),
            discovery_port: default_discovery_port(),
        }
    }
}
