//! Core configuration types.

use serde::Deserialize;
use slirc_wire::normalize_channel;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::defaults::*;
use super::distributed::{DistributedConfig, SpaceConfig};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// One block per IRC network to connect to.
    #[serde(default, rename = "network")]
    pub networks: Vec<NetworkConfig>,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    #[serde(default)]
    pub keepalive: KeepaliveConfig,
    #[serde(default)]
    pub handlers: HandlersConfig,
    #[serde(default)]
    pub distributed: DistributedConfig,
    #[serde(default)]
    pub space: SpaceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    ///
    /// Network channel lists are normalized as part of parsing.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(content)?;
        for network in &mut config.networks {
            network.normalize();
        }
        Ok(config)
    }
}

/// Connection options for one network.
///
/// A session keeps its original copy of these so a reconnect starts from
/// exactly the same options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NetworkConfig {
    /// Server hostname.
    pub server: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub tls: bool,
    /// Skip certificate verification. Test networks only.
    #[serde(default)]
    pub tls_insecure: bool,
    /// Sent as PASS before registration, and as IDENTIFY to `nickserv`
    /// after the welcome.
    pub password: Option<String>,
    /// Nickname candidates, tried in order.
    #[serde(default)]
    pub nicknames: Vec<String>,
    /// Channels joined after registration.
    #[serde(default)]
    pub channels: Vec<String>,
    /// Single channel shorthand, merged in front of `channels`.
    pub channel: Option<String>,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default = "default_realname")]
    pub realname: String,
    /// Nick service that receives IDENTIFY.
    #[serde(default = "default_nickserv")]
    pub nickserv: String,
}

impl NetworkConfig {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            port: default_port(),
            tls: false,
            tls_insecure: false,
            password: None,
            nicknames: Vec::new(),
            channels: Vec::new(),
            channel: None,
            user: default_user(),
            realname: default_realname(),
            nickserv: default_nickserv(),
        }
    }

    /// Fold `channel` into `channels`, add missing `#` prefixes, drop duplicates.
    pub fn normalize(&mut self) {
        let mut merged: Vec<String> = Vec::with_capacity(self.channels.len() + 1);
        let single = self.channel.take();
        for name in single.iter().chain(self.channels.iter()) {
            if name.trim().is_empty() {
                continue;
            }
            let name = normalize_channel(name);
            if !merged.iter().any(|c| c.eq_ignore_ascii_case(&name)) {
                merged.push(name);
            }
        }
        self.channels = merged;
    }

    /// `host:port` for logging and connecting.
    pub fn address(&self) -> String {
        format!("{}:{}", self.server, self.port)
    }
}

/// Reconnect backoff settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Consecutive failed attempts before giving up. 0 means never give up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl ReconnectConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

/// Client-side keepalive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeepaliveConfig {
    /// Silence (seconds) before we PING the server.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_secs: u64,
    /// Further silence (seconds) after our PING before the link is declared dead.
    #[serde(default = "default_ping_timeout")]
    pub timeout_secs: u64,
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        Self {
            ping_interval_secs: default_ping_interval(),
            timeout_secs: default_ping_timeout(),
        }
    }
}

impl KeepaliveConfig {
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Stock handlers wired in by the `slirc-bot` binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HandlersConfig {
    /// Register the chat log handler.
    #[serde(default = "default_true")]
    pub logging: bool,
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
}

impl Default for HandlersConfig {
    fn default() -> Self {
        Self {
            logging: true,
            command_prefix: default_command_prefix(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}
