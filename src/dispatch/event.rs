//! Events and their field mappings.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Names of the events the framework itself raises.
///
/// Inbound grammar matches are dispatched as `incoming_<definition name>`;
/// see [`incoming`].
pub mod names {
    pub const CLIENT_CONNECTED: &str = "client_connected";
    pub const CLIENT_DISCONNECTED: &str = "client_disconnected";
    pub const INCOMING_LINE: &str = "incoming_line";
    pub const QUIT: &str = "quit";

    pub const OUTGOING_JOIN: &str = "outgoing_join";
    pub const OUTGOING_PART: &str = "outgoing_part";
    pub const OUTGOING_MESSAGE: &str = "outgoing_message";
    pub const OUTGOING_ACTION: &str = "outgoing_action";
    pub const OUTGOING_NICK: &str = "outgoing_nick";
    pub const OUTGOING_PONG: &str = "outgoing_pong";

    pub const INCOMING_PING: &str = "incoming_ping";
    pub const INCOMING_NUMERIC: &str = "incoming_numeric";
    pub const INCOMING_NICK_TAKEN: &str = "incoming_nick_taken";
    pub const INCOMING_MESSAGE: &str = "incoming_message";
    pub const INCOMING_ACTION: &str = "incoming_action";
    pub const INCOMING_PART: &str = "incoming_part";
    pub const INCOMING_KICK: &str = "incoming_kick";
    pub const INCOMING_NICK: &str = "incoming_nick";
    pub const INCOMING_ERROR: &str = "incoming_error";
}

/// Dispatch name for a grammar definition.
pub fn incoming(definition: &str) -> String {
    format!("incoming_{definition}")
}

/// Ordered mapping from field name to value.
///
/// Order is the order the fields were declared in (for grammar matches) or
/// inserted in (for framework events). Serializes as a JSON object with the
/// same key order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fields(Vec<(String, String)>);

impl Fields {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a field, keeping the original position on replace.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (k, v) in iter {
            fields.insert(&k.into(), v);
        }
        fields
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Fields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = Fields;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of string fields")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Fields, A::Error> {
                let mut fields = Fields::new();
                while let Some((k, v)) = access.next_entry::<String, String>()? {
                    fields.insert(&k, v);
                }
                Ok(fields)
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}

/// A named event with its fields, as delivered through the dispatch chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub name: String,
    pub fields: Fields,
}

impl Event {
    pub fn new(name: impl Into<String>, fields: Fields) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// An event with no fields.
    pub fn bare(name: impl Into<String>) -> Self {
        Self::new(name, Fields::new())
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut fields = Fields::new().with("a", "1").with("b", "2");
        fields.insert("a", "3");
        let pairs: Vec<_> = fields.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_json_keeps_declared_order() {
        let fields = Fields::new().with("nick", "n").with("ident", "i").with("host", "h");
        let json = serde_json::to_string(&fields).unwrap();
        assert_eq!(json, r#"{"nick":"n","ident":"i","host":"h"}"#);

        let back: Fields = serde_json::from_str(&json).unwrap();
        assert_eq!(back.keys().collect::<Vec<_>>(), vec!["nick", "ident", "host"]);
    }

    #[test]
    fn test_incoming_name() {
        assert_eq!(incoming("message"), names::INCOMING_MESSAGE);
        assert_eq!(incoming("ping"), names::INCOMING_PING);
    }
}
