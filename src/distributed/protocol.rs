//! Wire format for the coordination space.
//!
//! Producers and workers talk to the space over TCP, one JSON object per
//! line. Discovery uses single JSON datagrams over UDP broadcast.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use uuid::Uuid;

use crate::client::SessionId;
use crate::dispatch::{Event, EventContext, Fields};

/// Service name carried in discovery probes and adverts.
pub const SERVICE_NAME: &str = "slirc-space";

/// Longest line the space or its clients will read.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Upper bound on how long a single `take` may block on the server.
pub const MAX_TAKE_TIMEOUT_MS: u64 = 30_000;

/// One dispatched event, as stored in the space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupleMessage {
    pub id: Uuid,
    pub event: String,
    pub fields: Fields,
    pub session: Option<SessionId>,
    pub nickname: Option<String>,
    pub emitted_at: DateTime<Utc>,
}

impl TupleMessage {
    pub fn new(event: Event) -> Self {
        Self {
            id: Uuid::new_v4(),
            event: event.name,
            fields: event.fields,
            session: None,
            nickname: None,
            emitted_at: Utc::now(),
        }
    }

    /// Capture an event together with the session that produced it.
    pub fn from_context(ctx: &EventContext) -> Self {
        Self {
            id: Uuid::new_v4(),
            event: ctx.event.name.clone(),
            fields: ctx.event.fields.clone(),
            session: ctx.session,
            nickname: ctx.nickname.clone(),
            emitted_at: Utc::now(),
        }
    }

    /// Rebuild a dispatch context. Remote handlers get a detached client handle.
    pub fn into_context(self) -> EventContext {
        let mut ctx = EventContext::detached(Event::new(self.event, self.fields));
        ctx.session = self.session;
        ctx.nickname = self.nickname;
        ctx
    }
}

/// Client -> space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Write { tuple: TupleMessage },
    /// Block up to `timeout_ms` for the oldest tuple.
    Take { timeout_ms: u64 },
    Len,
}

/// Space -> client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Ok,
    Tuple { tuple: TupleMessage },
    Empty,
    Len { len: usize },
    Error { message: String },
}

/// UDP discovery probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Probe {
    pub probe: String,
}

impl Probe {
    pub fn new() -> Self {
        Self {
            probe: SERVICE_NAME.to_string(),
        }
    }
}

impl Default for Probe {
    fn default() -> Self {
        Self::new()
    }
}

/// UDP discovery reply.
///
/// An unspecified IP (`0.0.0.0`) means "the address this reply came from".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advert {
    pub service: String,
    pub addr: SocketAddr,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shapes() {
        let json = serde_json::to_string(&Request::Take { timeout_ms: 500 }).unwrap();
        assert_eq!(json, r#"{"op":"take","timeout_ms":500}"#);
        assert_eq!(serde_json::to_string(&Request::Len).unwrap(), r#"{"op":"len"}"#);
    }

    #[test]
    fn test_response_shapes() {
        assert_eq!(serde_json::to_string(&Response::Ok).unwrap(), r#"{"status":"ok"}"#);
        assert_eq!(
            serde_json::to_string(&Response::Len { len: 3 }).unwrap(),
            r#"{"status":"len","len":3}"#
        );
        let parsed: Response = serde_json::from_str(r#"{"status":"empty"}"#).unwrap();
        assert_eq!(parsed, Response::Empty);
    }

    #[test]
    fn test_tuple_keeps_field_order() {
        let event = Event::new(
            "incoming_message",
            Fields::new()
                .with("nick", "alice")
                .with("target", "#rust")
                .with("message", "hi"),
        );
        let tuple = TupleMessage::new(event);
        let json = serde_json::to_string(&tuple).unwrap();
        assert!(json.contains(r##""fields":{"nick":"alice","target":"#rust","message":"hi"}"##));

        let back: TupleMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tuple);
    }

    #[test]
    fn test_into_context_is_detached() {
        let tuple = TupleMessage::new(Event::bare("client_connected"));
        let ctx = tuple.into_context();
        assert!(ctx.client.is_detached());
        assert_eq!(ctx.name(), "client_connected");
    }
}
