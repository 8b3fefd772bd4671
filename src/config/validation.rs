//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use slirc_wire::ChannelExt;
use std::net::SocketAddr;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("network[{0}].server is required")]
    MissingServer(usize),
    #[error("network[{0}].port must not be 0")]
    InvalidPort(usize),
    #[error("network[{0}].nicknames must list at least one nickname")]
    NoNicknames(usize),
    #[error("network[{index}] nickname is invalid: '{nick}'")]
    InvalidNickname { index: usize, nick: String },
    #[error("network[{index}] channel is invalid: '{channel}'")]
    InvalidChannel { index: usize, channel: String },
    #[error("reconnect.initial_delay_ms ({initial}) exceeds reconnect.max_delay_ms ({max})")]
    BackoffInverted { initial: u64, max: u64 },
    #[error("keepalive.{0} must be greater than 0")]
    ZeroKeepalive(&'static str),
    #[error("distributed.backlog must be greater than 0")]
    ZeroBacklog,
    #[error("{field} is not a socket address: '{value}'")]
    InvalidAddress { field: &'static str, value: String },
}

/// Validate a configuration, returning all errors found.
///
/// An empty network list is allowed here; the space and worker binaries
/// share this file and do not connect to IRC.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (index, network) in config.networks.iter().enumerate() {
        if network.server.trim().is_empty() {
            errors.push(ValidationError::MissingServer(index));
        }
        if network.port == 0 {
            errors.push(ValidationError::InvalidPort(index));
        }
        if network.nicknames.is_empty() {
            errors.push(ValidationError::NoNicknames(index));
        }
        for nick in &network.nicknames {
            if !is_valid_nickname(nick) {
                errors.push(ValidationError::InvalidNickname {
                    index,
                    nick: nick.clone(),
                });
            }
        }
        for channel in &network.channels {
            if !channel.is_channel_name() || channel.contains([' ', ',', '\x07']) {
                errors.push(ValidationError::InvalidChannel {
                    index,
                    channel: channel.clone(),
                });
            }
        }
    }

    let reconnect = &config.reconnect;
    if reconnect.initial_delay_ms > reconnect.max_delay_ms {
        errors.push(ValidationError::BackoffInverted {
            initial: reconnect.initial_delay_ms,
            max: reconnect.max_delay_ms,
        });
    }

    if config.keepalive.ping_interval_secs == 0 {
        errors.push(ValidationError::ZeroKeepalive("ping_interval_secs"));
    }
    if config.keepalive.timeout_secs == 0 {
        errors.push(ValidationError::ZeroKeepalive("timeout_secs"));
    }

    if config.distributed.backlog == 0 {
        errors.push(ValidationError::ZeroBacklog);
    }
    if let Some(addr) = &config.distributed.space_addr
        && addr.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "distributed.space_addr",
            value: addr.clone(),
        });
    }
    if config.space.bind.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "space.bind",
            value: config.space.bind.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Nicknames: non-empty, no spaces or separators, not starting with a digit,
/// `-`, `#`, `&` or `:`.
fn is_valid_nickname(nick: &str) -> bool {
    let Some(first) = nick.chars().next() else {
        return false;
    };
    if first.is_ascii_digit() || matches!(first, '-' | '#' | '&' | ':') {
        return false;
    }
    nick.chars()
        .all(|c| !c.is_whitespace() && !c.is_control() && !matches!(c, ',' | '*' | '?' | '!' | '@'))
}
