//! A single named line pattern.

use regex::Regex;

use super::GrammarError;
use crate::dispatch::{incoming, Event, Fields};

/// A named pattern with an ordered list of field names, one per capture group.
#[derive(Debug, Clone)]
pub struct EventDefinition {
    name: String,
    pattern: Regex,
    fields: Vec<String>,
}

impl EventDefinition {
    /// Compile a definition.
    ///
    /// Fails if the pattern does not compile or if its capture group count
    /// differs from the number of field names.
    pub fn new(name: &str, pattern: &str, fields: &[&str]) -> Result<Self, GrammarError> {
        if name.is_empty() {
            return Err(GrammarError::EmptyName);
        }

        let regex = Regex::new(pattern).map_err(|source| GrammarError::InvalidPattern {
            name: name.to_string(),
            source: Box::new(source),
        })?;

        // Group 0 is the whole match
        let groups = regex.captures_len() - 1;
        if groups != fields.len() {
            return Err(GrammarError::SlotMismatch {
                name: name.to_string(),
                groups,
                fields: fields.len(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            pattern: regex,
            fields: fields.iter().map(|f| f.to_string()).collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn field_names(&self) -> &[String] {
        &self.fields
    }

    /// Try this definition against a terminator-free line.
    ///
    /// Capture groups that did not participate in the match yield empty strings.
    pub fn matches(&self, line: &str) -> Option<MatchedEvent> {
        let caps = self.pattern.captures(line)?;

        let fields = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let value = caps.get(i + 1).map_or("", |m| m.as_str());
                (field.as_str(), value)
            })
            .collect();

        Some(MatchedEvent {
            name: self.name.clone(),
            fields,
        })
    }
}

/// The result of a successful grammar match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedEvent {
    /// Definition name, without the `incoming_` prefix.
    pub name: String,
    pub fields: Fields,
}

impl MatchedEvent {
    /// Convert into the event the session dispatches (`incoming_<name>`).
    pub fn into_event(self) -> Event {
        Event::new(incoming(&self.name), self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_mismatch_rejected() {
        let err = EventDefinition::new("bad", r"^(\S+) (\S+)$", &["one"]).unwrap_err();
        assert!(matches!(
            err,
            GrammarError::SlotMismatch {
                groups: 2,
                fields: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = EventDefinition::new("bad", r"^(unclosed", &["x"]).unwrap_err();
        assert!(matches!(err, GrammarError::InvalidPattern { .. }));
    }

    #[test]
    fn test_non_capturing_groups_do_not_count() {
        let def = EventDefinition::new("greet", r"^(?:hi|hello) (\S+)$", &["who"]).unwrap();
        let matched = def.matches("hello world").unwrap();
        assert_eq!(matched.fields.get("who"), Some("world"));
    }

    #[test]
    fn test_optional_group_yields_empty() {
        let def = EventDefinition::new("quit", r"^QUIT(?: :(.*))?$", &["reason"]).unwrap();
        let matched = def.matches("QUIT").unwrap();
        assert_eq!(matched.fields.get("reason"), Some(""));
    }

    #[test]
    fn test_into_event_prefixes_name() {
        let def = EventDefinition::new("custom", r"^X (\d+)$", &["n"]).unwrap();
        let event = def.matches("X 42").unwrap().into_event();
        assert_eq!(event.name, "incoming_custom");
        assert_eq!(event.field("n"), Some("42"));
    }
}
