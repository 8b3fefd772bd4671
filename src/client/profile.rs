//! Client profiles: the grammar and handler chain sessions are built from.

use std::sync::Arc;

use crate::dispatch::{DispatchChain, Handler};
use crate::grammar::{EventDefinition, Grammar, GrammarError};

/// Immutable grammar plus handler chain, shared by every session built from it.
#[derive(Debug)]
pub struct ClientProfile {
    grammar: Grammar,
    chain: DispatchChain,
}

impl ClientProfile {
    /// Start a profile from the built-in IRC grammar with no handlers.
    pub fn builder() -> Result<ClientProfileBuilder, GrammarError> {
        Ok(ClientProfileBuilder {
            grammar: Grammar::irc()?,
            chain: DispatchChain::new(),
        })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn chain(&self) -> &DispatchChain {
        &self.chain
    }
}

/// Mutable stage of a profile. Freezes into an `Arc<ClientProfile>`.
#[derive(Debug, Default)]
pub struct ClientProfileBuilder {
    grammar: Grammar,
    chain: DispatchChain,
}

impl ClientProfileBuilder {
    /// A builder with an empty grammar.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append a custom event definition after the existing ones.
    pub fn register_event(
        &mut self,
        name: &str,
        pattern: &str,
        fields: &[&str],
    ) -> Result<&mut Self, GrammarError> {
        self.grammar.push(EventDefinition::new(name, pattern, fields)?);
        Ok(self)
    }

    /// Append a handler to the chain.
    pub fn register_handler<H: Handler + 'static>(&mut self, handler: H) -> &mut Self {
        self.chain.register(Arc::new(handler));
        self
    }

    /// Append a handler that is also held elsewhere.
    pub fn register_shared(&mut self, handler: Arc<dyn Handler>) -> &mut Self {
        self.chain.register(handler);
        self
    }

    pub fn build(self) -> Arc<ClientProfile> {
        Arc::new(ClientProfile {
            grammar: self.grammar,
            chain: self.chain,
        })
    }
}
