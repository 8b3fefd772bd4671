//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config structs (Config, NetworkConfig, ReconnectConfig, KeepaliveConfig)
//! - [`distributed`]: Coordination space configuration (DistributedConfig, SpaceConfig)
//! - [`defaults`]: serde default functions
//! - [`validation`]: Startup checks

mod defaults;
mod distributed;
mod types;
mod validation;

pub use distributed::{DistributedConfig, SpaceConfig};
pub use types::{
    Config, ConfigError, HandlersConfig, KeepaliveConfig, LogFormat, LoggingConfig,
    NetworkConfig, ReconnectConfig,
};
pub use validation::{validate, ValidationError};

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r##"
[[network]]
server = "irc.libera.chat"
port = 6697
tls = true
nicknames = ["slircbot", "slircbot_"]
channel = "#slirc"
channels = ["rust", "#slirc"]
password = "hunter2"
nickserv = "AuthServ"

[reconnect]
max_attempts = 0

[handlers]
command_prefix = "."

[distributed]
enabled = true
space_addr = "127.0.0.1:47471"

[logging]
format = "json"
"##;

    #[test]
    fn test_parse_sample() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(config.networks.len(), 1);

        let net = &config.networks[0];
        assert_eq!(net.address(), "irc.libera.chat:6697");
        assert!(net.tls);
        assert_eq!(net.user, "slirc");
        assert_eq!(net.password.as_deref(), Some("hunter2"));
        assert_eq!(net.nickserv, "AuthServ");
        // Singular key first, missing prefix added, duplicate dropped
        assert_eq!(net.channels, vec!["#slirc", "#rust"]);
        assert_eq!(net.channel, None);

        assert_eq!(config.reconnect.max_attempts, 0);
        assert_eq!(config.reconnect.initial_delay_ms, 1_000);
        assert_eq!(config.keepalive.ping_interval_secs, 90);
        assert!(config.handlers.logging);
        assert_eq!(config.handlers.command_prefix, ".");
        assert!(config.distributed.enabled);
        assert_eq!(config.distributed.backlog, 10_000);
        assert_eq!(config.space.bind, "0.0.0.0:47471");
        assert_eq!(config.logging.format, LogFormat::Json);

        assert_eq!(validate(&config), Ok(()));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert!(config.networks.is_empty());
        assert_eq!(config.reconnect, ReconnectConfig::default());
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.networks[0].server, "irc.libera.chat");
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load("/nonexistent/slirc.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_example_config_is_valid() {
        let config = Config::parse(include_str!("../../config.example.toml")).unwrap();
        assert_eq!(config.networks[0].channels, vec!["#slirc-test"]);
        assert_eq!(validate(&config), Ok(()));
    }

    #[test]
    fn test_parse_error() {
        let err = Config::parse("[[network]]\nport = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
