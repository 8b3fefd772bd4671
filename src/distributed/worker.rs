//! Remote consumer: takes tuples from the space and runs them through a
//! local dispatch chain.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn, Instrument};

use super::protocol::TupleMessage;
use super::remote::SpaceClient;
use crate::client::Backoff;
use crate::dispatch::{Delivery, DispatchChain};
use crate::error::SpaceError;

/// How long one `take` waits on the space before checking for shutdown.
const POLL: Duration = Duration::from_secs(5);

pub struct Worker {
    space: SocketAddr,
    chain: DispatchChain,
}

impl Worker {
    pub fn new(space: SocketAddr, chain: DispatchChain) -> Self {
        Self { space, chain }
    }

    /// Deliver one tuple. Handlers see a detached client handle.
    pub async fn process(&self, tuple: TupleMessage) -> Delivery {
        debug!(event = %tuple.event, id = %tuple.id, "Processing tuple");
        let ctx = tuple.into_context();
        self.chain.deliver(&ctx).await
    }

    /// Consume until `shutdown` turns true, reconnecting to the space on errors.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let span = crate::telemetry::spans::worker(&self.space);
        async {
            let mut backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(60), 0);
            while !*shutdown.borrow() {
                match self.consume(&shutdown).await {
                    Ok(()) => break,
                    Err(e) => warn!(error = %e, "Coordination space connection failed"),
                }

                let delay = backoff.next_delay().unwrap_or(Duration::from_secs(60));
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    Ok(()) = shutdown.changed() => {}
                }
            }
            info!("Worker stopped");
        }
        .instrument(span)
        .await
    }

    async fn consume(&self, shutdown: &watch::Receiver<bool>) -> Result<(), SpaceError> {
        let mut client = SpaceClient::connect(self.space).await?;
        info!("Connected to coordination space");

        // A take is never cancelled midway: the space may already have
        // handed us the tuple.
        while !*shutdown.borrow() {
            if let Some(tuple) = client.take(POLL).await? {
                self.process(tuple).await;
            }
        }
        Ok(())
    }
}
