//! Unified error handling for slirc-bot.
//!
//! Grammar and configuration errors live next to their modules; this file
//! holds the errors that cross module boundaries: handler failures, the
//! handle handlers use to talk back to a session, and the coordination space.

use thiserror::Error;

// ============================================================================
// Handler Errors (dispatch chain)
// ============================================================================

/// Errors a handler can return from an event callback.
///
/// The dispatch chain logs these and moves on to the next handler; they never
/// stop delivery and never reach the session.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HandlerError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Client(_) => "client_error",
            Self::MissingField(_) => "missing_field",
            Self::Failed(_) => "handler_failed",
            Self::Other(_) => "other",
        }
    }
}

// ============================================================================
// Client Errors (handle -> session)
// ============================================================================

/// Errors returned by [`crate::client::ClientHandle`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The session behind this handle has been dropped.
    #[error("session has shut down")]
    Closed,

    /// The handle was never attached to a session (remote workers).
    #[error("handle is not attached to a session")]
    Detached,
}

// ============================================================================
// Space Errors (coordination space)
// ============================================================================

/// Errors talking to, or discovering, the coordination space.
#[derive(Debug, Error)]
pub enum SpaceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line codec error: {0}")]
    Codec(#[from] tokio_util::codec::LinesCodecError),

    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("coordination space closed the connection")]
    ConnectionClosed,

    #[error("coordination space reported: {0}")]
    Remote(String),

    #[error("unexpected response to {0}")]
    UnexpectedResponse(&'static str),

    #[error("no coordination space answered within {0:?}")]
    DiscoveryTimeout(std::time::Duration),
}
