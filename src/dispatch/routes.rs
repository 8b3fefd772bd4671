//! Name-routed handler built from closures.
//!
//! A handler that only cares about a few events registers one callback per
//! event name. Events with no callback fall through to the fallback if one
//! is set, and are otherwise skipped with [`Flow::Continue`].

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use super::handler::{EventContext, Flow, Handler, HandlerResult};

type Callback = Arc<dyn Fn(EventContext) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

fn boxed<F, Fut>(f: F) -> Callback
where
    F: Fn(EventContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(f(ctx)))
}

pub struct Routes {
    name: String,
    routes: HashMap<String, Callback>,
    fallback: Option<Callback>,
}

impl Routes {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            routes: HashMap::new(),
            fallback: None,
        }
    }

    /// Route an event name to a callback. Re-registering a name replaces it.
    #[must_use]
    pub fn on<F, Fut>(mut self, event: &str, f: F) -> Self
    where
        F: Fn(EventContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.routes.insert(event.to_string(), boxed(f));
        self
    }

    /// Callback for every event without a dedicated route.
    #[must_use]
    pub fn fallback<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(EventContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.fallback = Some(boxed(f));
        self
    }

    pub fn handles(&self, event: &str) -> bool {
        self.routes.contains_key(event) || self.fallback.is_some()
    }
}

#[async_trait]
impl Handler for Routes {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, ctx: &EventContext) -> HandlerResult {
        let callback = self.routes.get(ctx.name()).or(self.fallback.as_ref());
        match callback {
            Some(callback) => callback(ctx.clone()).await,
            None => Ok(Flow::Continue),
        }
    }
}

impl std::fmt::Debug for Routes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Routes")
            .field("name", &self.name)
            .field("routes", &self.routes.keys().collect::<Vec<_>>())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Event;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_routes_by_name() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let routes = Routes::new("test").on("incoming_message", move |_ctx| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Flow::Halt)
            }
        });

        let flow = routes
            .handle(&EventContext::detached(Event::bare("incoming_message")))
            .await
            .unwrap();
        assert_eq!(flow, Flow::Halt);

        // No route and no fallback: skipped
        let flow = routes
            .handle(&EventContext::detached(Event::bare("incoming_join")))
            .await
            .unwrap();
        assert_eq!(flow, Flow::Continue);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fallback_sees_unrouted_events() {
        let routes = Routes::new("test")
            .on("a", |_ctx| async { Ok(Flow::Continue) })
            .fallback(|ctx| async move {
                assert_eq!(ctx.name(), "b");
                Ok(Flow::Halt)
            });

        assert!(routes.handles("anything"));
        let flow = routes
            .handle(&EventContext::detached(Event::bare("b")))
            .await
            .unwrap();
        assert_eq!(flow, Flow::Halt);
    }
}
