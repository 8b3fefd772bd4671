//! Ordered handler chain with per-handler fault isolation.

use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, warn, Instrument};

use super::handler::{EventContext, Flow, Handler};

/// Handlers in registration order.
#[derive(Clone, Default)]
pub struct DispatchChain {
    handlers: Vec<Arc<dyn Handler>>,
}

/// What happened to one event on its way through the chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Handlers that were invoked, including ones that failed.
    pub invoked: usize,
    /// Name of the handler that halted delivery, if any.
    pub halted_by: Option<String>,
    /// Names of handlers that returned an error or panicked.
    pub failed: Vec<String>,
}

impl DispatchChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler. Registration order is delivery order.
    pub fn register(&mut self, handler: Arc<dyn Handler>) {
        self.handlers.push(handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.iter().map(|h| h.name())
    }

    /// Deliver an event to each handler in order until one halts.
    ///
    /// A handler that errors or panics is logged and skipped; the next one
    /// still runs. Halting only affects this event.
    pub async fn deliver(&self, ctx: &EventContext) -> Delivery {
        let mut delivery = Delivery::default();

        for handler in &self.handlers {
            delivery.invoked += 1;

            let span = crate::telemetry::spans::handler(handler.name(), ctx.name());
            let outcome = AssertUnwindSafe(handler.handle(ctx))
                .catch_unwind()
                .instrument(span)
                .await;

            match outcome {
                Ok(Ok(Flow::Continue)) => {}
                Ok(Ok(Flow::Halt)) => {
                    debug!(handler = %handler.name(), event = %ctx.name(), "Handler halted delivery");
                    delivery.halted_by = Some(handler.name().to_string());
                    break;
                }
                Ok(Err(e)) => {
                    warn!(
                        handler = %handler.name(),
                        event = %ctx.name(),
                        code = e.error_code(),
                        error = %e,
                        "Handler failed"
                    );
                    delivery.failed.push(handler.name().to_string());
                }
                Err(panic) => {
                    error!(
                        handler = %handler.name(),
                        event = %ctx.name(),
                        panic = %panic_message(panic.as_ref()),
                        "Handler panicked"
                    );
                    delivery.failed.push(handler.name().to_string());
                }
            }
        }

        delivery
    }
}

impl std::fmt::Debug for DispatchChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{Event, HandlerResult};
    use crate::error::HandlerError;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        flow: Flow,
    }

    #[async_trait]
    impl Handler for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        async fn handle(&self, ctx: &EventContext) -> HandlerResult {
            self.log.lock().push(format!("{}:{}", self.name, ctx.name()));
            Ok(self.flow)
        }
    }

    struct Failing;

    #[async_trait]
    impl Handler for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn handle(&self, _ctx: &EventContext) -> HandlerResult {
            Err(HandlerError::Failed("nope".into()))
        }
    }

    struct Panicking;

    #[async_trait]
    impl Handler for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn handle(&self, _ctx: &EventContext) -> HandlerResult {
            panic!("handler blew up");
        }
    }

    fn recorder(name: &'static str, log: &Arc<Mutex<Vec<String>>>, flow: Flow) -> Arc<dyn Handler> {
        Arc::new(Recorder {
            name,
            log: log.clone(),
            flow,
        })
    }

    fn ctx(name: &str) -> EventContext {
        EventContext::detached(Event::bare(name))
    }

    #[tokio::test]
    async fn test_delivers_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = DispatchChain::new();
        chain.register(recorder("a", &log, Flow::Continue));
        chain.register(recorder("b", &log, Flow::Continue));

        let delivery = chain.deliver(&ctx("ev")).await;

        assert_eq!(*log.lock(), vec!["a:ev", "b:ev"]);
        assert_eq!(delivery.invoked, 2);
        assert_eq!(delivery.halted_by, None);
    }

    #[tokio::test]
    async fn test_halt_stops_remaining_handlers_for_one_event() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = DispatchChain::new();
        chain.register(recorder("a", &log, Flow::Halt));
        chain.register(recorder("b", &log, Flow::Continue));

        let delivery = chain.deliver(&ctx("first")).await;
        assert_eq!(delivery.halted_by.as_deref(), Some("a"));

        // The next event starts from the top again
        chain.deliver(&ctx("second")).await;
        assert_eq!(*log.lock(), vec!["a:first", "a:second"]);
    }

    #[tokio::test]
    async fn test_error_and_panic_are_isolated() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = DispatchChain::new();
        chain.register(Arc::new(Failing));
        chain.register(Arc::new(Panicking));
        chain.register(recorder("after", &log, Flow::Continue));

        let delivery = chain.deliver(&ctx("ev")).await;

        assert_eq!(*log.lock(), vec!["after:ev"]);
        assert_eq!(delivery.failed, vec!["failing", "panicking"]);
        assert_eq!(delivery.invoked, 3);
    }

    #[tokio::test]
    async fn test_empty_chain() {
        let chain = DispatchChain::new();
        let delivery = chain.deliver(&ctx("ev")).await;
        assert_eq!(delivery, Delivery::default());
    }
}
