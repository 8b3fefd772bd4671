//! Forwards every dispatched event to the coordination space.
//!
//! The handler half never blocks and never fails: it pushes a tuple onto a
//! channel and lets the event continue. A background link task owns the
//! space connection, keeps a bounded backlog while the space is unreachable
//! (oldest tuples are dropped first), and reconnects with backoff.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn, Instrument};

use super::discovery;
use super::protocol::TupleMessage;
use super::remote::SpaceClient;
use crate::client::Backoff;
use crate::config::DistributedConfig;
use crate::dispatch::{EventContext, Flow, Handler, HandlerResult};
use crate::error::SpaceError;

const DISCOVERY_WAIT: Duration = Duration::from_secs(3);
const RETRY_INITIAL: Duration = Duration::from_secs(1);
const RETRY_MAX: Duration = Duration::from_secs(60);

pub struct DispatchBridge {
    tx: mpsc::UnboundedSender<TupleMessage>,
}

impl DispatchBridge {
    /// Spawn the link task and return the handler that feeds it.
    pub fn spawn(config: DistributedConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let link = BridgeLink::new(config, rx);
        tokio::spawn(link.run().instrument(crate::telemetry::spans::bridge()));
        Self { tx }
    }

    /// A bridge feeding an existing channel instead of a link task.
    pub fn with_sender(tx: mpsc::UnboundedSender<TupleMessage>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Handler for DispatchBridge {
    fn name(&self) -> &str {
        "distributed-bridge"
    }

    async fn handle(&self, ctx: &EventContext) -> HandlerResult {
        if self.tx.send(TupleMessage::from_context(ctx)).is_err() {
            debug!(event = %ctx.name(), "Bridge link stopped, event not forwarded");
        }
        Ok(Flow::Continue)
    }
}

struct BridgeLink {
    config: DistributedConfig,
    rx: mpsc::UnboundedReceiver<TupleMessage>,
    backlog: VecDeque<TupleMessage>,
    backoff: Backoff,
    dropped: u64,
}

impl BridgeLink {
    fn new(config: DistributedConfig, rx: mpsc::UnboundedReceiver<TupleMessage>) -> Self {
        Self {
            config,
            rx,
            backlog: VecDeque::new(),
            backoff: Backoff::new(RETRY_INITIAL, RETRY_MAX, 0),
            dropped: 0,
        }
    }

    async fn run(mut self) {
        loop {
            let client = match self.locate().await {
                Ok(addr) => SpaceClient::connect(addr).await,
                Err(e) => Err(e),
            };

            match client {
                Ok(mut client) => {
                    info!(addr = %client.addr(), backlog = self.backlog.len(), "Connected to coordination space");
                    self.backoff.reset();
                    match self.forward(&mut client).await {
                        Ok(()) => {
                            debug!("Bridge closed");
                            return;
                        }
                        Err(e) => warn!(error = %e, "Lost coordination space"),
                    }
                }
                Err(e) => warn!(error = %e, "Coordination space unavailable"),
            }

            // Backoff never runs out with unlimited attempts
            let delay = self.backoff.next_delay().unwrap_or(RETRY_MAX);
            let sleep = tokio::time::sleep(delay);
            tokio::pin!(sleep);
            loop {
                tokio::select! {
                    _ = &mut sleep => break,
                    tuple = self.rx.recv() => match tuple {
                        Some(tuple) => self.push(tuple),
                        None => {
                            debug!(pending = self.backlog.len(), "Bridge closed while disconnected");
                            return;
                        }
                    },
                }
            }
        }
    }

    async fn locate(&self) -> Result<SocketAddr, SpaceError> {
        match &self.config.space_addr {
            Some(addr) => addr.parse().map_err(|_| {
                SpaceError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("invalid space address: {addr}"),
                ))
            }),
            None => discovery::discover(self.config.discovery_port, DISCOVERY_WAIT).await,
        }
    }

    /// Flush the backlog, then forward live tuples. Returns Ok when the
    /// handler side has gone away.
    async fn forward(&mut self, client: &mut SpaceClient) -> Result<(), SpaceError> {
        loop {
            while let Some(tuple) = self.backlog.front() {
                client.write(tuple.clone()).await?;
                self.backlog.pop_front();
            }

            match self.rx.recv().await {
                Some(tuple) => self.push(tuple),
                None => return Ok(()),
            }
        }
    }

    fn push(&mut self, tuple: TupleMessage) {
        if self.backlog.len() >= self.config.backlog.max(1) {
            self.backlog.pop_front();
            self.dropped += 1;
            if self.dropped.is_power_of_two() {
                warn!(dropped = self.dropped, "Bridge backlog full, dropping oldest events");
            }
        }
        self.backlog.push_back(tuple);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Event;

    #[tokio::test]
    async fn test_handler_always_continues() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let bridge = DispatchBridge::with_sender(tx);

        let ctx = EventContext::detached(Event::bare("incoming_join"));
        assert_eq!(bridge.handle(&ctx).await.unwrap(), Flow::Continue);
        assert_eq!(rx.recv().await.unwrap().event, "incoming_join");

        // Link gone: still continues
        drop(rx);
        assert_eq!(bridge.handle(&ctx).await.unwrap(), Flow::Continue);
    }

    #[test]
    fn test_backlog_drops_oldest() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let config = DistributedConfig {
            backlog: 2,
            ..DistributedConfig::default()
        };
        let mut link = BridgeLink::new(config, rx);

        for name in ["a", "b", "c"] {
            link.push(TupleMessage::new(Event::bare(name)));
        }

        let kept: Vec<_> = link.backlog.iter().map(|t| t.event.as_str()).collect();
        assert_eq!(kept, vec!["b", "c"]);
        assert_eq!(link.dropped, 1);
    }
}
