//! Event grammar: an ordered table of named line patterns.
//!
//! Each raw line from the server is tested against the definitions in
//! registration order; the first match becomes an `incoming_<name>` event
//! whose fields are the pattern's capture groups, named in declared order.
//! Lines nothing matches are dropped by the caller.

mod defaults;
mod definition;

pub use definition::{EventDefinition, MatchedEvent};

use thiserror::Error;

/// Errors building a grammar.
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("event name must not be empty")]
    EmptyName,

    #[error("event {name:?} has an invalid pattern: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: Box<regex::Error>,
    },

    #[error("event {name:?} declares {fields} fields but its pattern has {groups} capture groups")]
    SlotMismatch {
        name: String,
        groups: usize,
        fields: usize,
    },
}

/// Ordered list of event definitions.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    definitions: Vec<EventDefinition>,
}

impl Grammar {
    /// An empty grammar. Every line is unmatched.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in IRC event table.
    pub fn irc() -> Result<Self, GrammarError> {
        let mut grammar = Self::new();
        for (name, pattern, fields) in defaults::IRC_EVENTS {
            grammar.register(name, pattern, fields)?;
        }
        Ok(grammar)
    }

    /// Compile and append a definition. Later registrations have lower priority.
    pub fn register(
        &mut self,
        name: &str,
        pattern: &str,
        fields: &[&str],
    ) -> Result<&mut Self, GrammarError> {
        let definition = EventDefinition::new(name, pattern, fields)?;
        self.definitions.push(definition);
        Ok(self)
    }

    /// Append an already-compiled definition.
    pub fn push(&mut self, definition: EventDefinition) -> &mut Self {
        self.definitions.push(definition);
        self
    }

    /// Match a raw line. Trailing CR/LF is ignored.
    pub fn match_line(&self, line: &str) -> Option<MatchedEvent> {
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        self.definitions.iter().find_map(|def| def.matches(line))
    }

    pub fn definitions(&self) -> &[EventDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
