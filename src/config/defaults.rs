//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Network Defaults
// =============================================================================

pub fn default_port() -> u16 {
    6667
}

pub fn default_user() -> String {
    "slirc".to_string()
}

pub fn default_realname() -> String {
    "slirc-bot".to_string()
}

pub fn default_nickserv() -> String {
    "NickServ".to_string()
}

// =============================================================================
// Reconnect Defaults
// =============================================================================

pub fn default_initial_delay_ms() -> u64 {
    1_000
}

pub fn default_max_delay_ms() -> u64 {
    300_000
}

pub fn default_max_attempts() -> u32 {
    10
}

// =============================================================================
// Keepalive Defaults
// =============================================================================

pub fn default_ping_interval() -> u64 {
    90
}

pub fn default_ping_timeout() -> u64 {
    120
}

// =============================================================================
// Handler Defaults
// =============================================================================

pub fn default_command_prefix() -> String {
    "!".to_string()
}

// =============================================================================
// Coordination Space Defaults
// =============================================================================

pub fn default_discovery_port() -> u16 {
    47470
}

pub fn default_space_bind() -> String {
    "0.0.0.0:47471".to_string()
}

pub fn default_backlog() -> usize {
    10_000
}
