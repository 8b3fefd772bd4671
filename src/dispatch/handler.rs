//! Handler trait and the per-event context handed to every handler.

use async_trait::async_trait;
use std::sync::Arc;

use super::event::Event;
use crate::client::{ClientHandle, SessionId};
use crate::error::HandlerError;

/// What the chain should do after a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Pass the event to the next handler.
    Continue,
    /// Skip the remaining handlers for this event only.
    Halt,
}

pub type HandlerResult = Result<Flow, HandlerError>;

/// Per-delivery context: the event plus a way back to the session.
#[derive(Debug, Clone)]
pub struct EventContext {
    pub event: Arc<Event>,
    /// Issues commands to the session that produced the event.
    /// Detached for events replayed by a remote worker.
    pub client: ClientHandle,
    pub session: Option<SessionId>,
    /// The session's nickname at the time of dispatch.
    pub nickname: Option<String>,
}

impl EventContext {
    pub fn new(event: Event, client: ClientHandle) -> Self {
        Self {
            event: Arc::new(event),
            client,
            session: None,
            nickname: None,
        }
    }

    /// Context with no session behind it.
    pub fn detached(event: Event) -> Self {
        Self::new(event, ClientHandle::detached())
    }

    #[must_use]
    pub fn with_session(mut self, session: SessionId, nickname: Option<String>) -> Self {
        self.session = Some(session);
        self.nickname = nickname;
        self
    }

    pub fn name(&self) -> &str {
        &self.event.name
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.event.field(key)
    }

    /// Like [`field`](Self::field) but a missing field is a handler error.
    pub fn require(&self, key: &'static str) -> Result<&str, HandlerError> {
        self.field(key).ok_or(HandlerError::MissingField(key))
    }
}

/// A unit of event processing.
///
/// Handlers are shared across every session built from the same profile and
/// may be invoked concurrently, so they must be `Send + Sync`.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Name used in logs when this handler fails or halts.
    fn name(&self) -> &str;

    async fn handle(&self, ctx: &EventContext) -> HandlerResult;
}
