//! In-memory tuple store.
//!
//! FIFO, and every tuple is handed to exactly one taker.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Notify;

use super::protocol::TupleMessage;

#[derive(Debug, Default)]
pub struct TupleSpace {
    queue: Mutex<VecDeque<TupleMessage>>,
    available: Notify,
}

impl TupleSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&self, tuple: TupleMessage) {
        self.queue.lock().push_back(tuple);
        self.available.notify_one();
    }

    /// Put back a tuple whose taker never received it, ahead of newer ones.
    pub fn restore(&self, tuple: TupleMessage) {
        self.queue.lock().push_front(tuple);
        self.available.notify_one();
    }

    pub fn try_take(&self) -> Option<TupleMessage> {
        self.queue.lock().pop_front()
    }

    /// Take the oldest tuple, waiting up to `timeout` for one to arrive.
    pub async fn take(&self, timeout: Duration) -> Option<TupleMessage> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.available.notified();
            if let Some(tuple) = self.try_take() {
                return Some(tuple);
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.try_take();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}
