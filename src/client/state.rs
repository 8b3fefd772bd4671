//! Session lifecycle states and disconnect outcomes.

use std::fmt;

use crate::config::NetworkConfig;

/// Where a session is in its lifecycle.
///
/// ```text
/// Disconnected -> Connecting -> Registering -> Ready -> Disconnecting -> Disconnected
///                                     \____________\___ transport drop ___> ReconnectPending
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Disconnected,
    /// Transport up, `client_connected` being dispatched.
    Connecting,
    /// NICK/USER sent, waiting for the welcome numeric.
    Registering,
    Ready,
    /// QUIT sent, waiting for the server to close.
    Disconnecting,
    /// Dropped unexpectedly; a fresh session will be built from the same options.
    ReconnectPending,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Registering => "registering",
            Self::Ready => "ready",
            Self::Disconnecting => "disconnecting",
            Self::ReconnectPending => "reconnect_pending",
        }
    }

    /// The transport is (or should be) open.
    pub fn is_connected(&self) -> bool {
        matches!(
            self,
            Self::Connecting | Self::Registering | Self::Ready | Self::Disconnecting
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do after a session's transport has gone away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectOutcome {
    /// Unexpected drop: build a new session from these original options.
    Reconnect(NetworkConfig),
    /// Expected drop. `registry_empty` tells the caller whether this was the last session.
    Closed { registry_empty: bool },
    /// The session had already handled its disconnect.
    AlreadyDisconnected,
}
