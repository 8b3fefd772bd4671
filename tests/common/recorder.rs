//! A handler that remembers every event.

use async_trait::async_trait;
use parking_lot::Mutex;
use slirc_bot::dispatch::{Event, EventContext, Flow, Handler, HandlerResult};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
}

#[allow(dead_code)]
impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> Vec<String> {
        self.events.lock().iter().map(|e| e.name.clone()).collect()
    }

    pub fn find(&self, name: &str) -> Option<Event> {
        self.events.lock().iter().find(|e| e.name == name).cloned()
    }

    pub fn count(&self, name: &str) -> usize {
        self.events.lock().iter().filter(|e| e.name == name).count()
    }

    /// Poll until an event with `name` has been seen.
    pub async fn wait_for(&self, name: &str) -> Event {
        for _ in 0..500 {
            if let Some(event) = self.find(name) {
                return event;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("never saw {name}; saw {:?}", self.names());
    }
}

#[async_trait]
impl Handler for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    async fn handle(&self, ctx: &EventContext) -> HandlerResult {
        self.events.lock().push((*ctx.event).clone());
        Ok(Flow::Continue)
    }
}
