//! slirc-worker - consumes events from the coordination space.
//!
//! Usage: `slirc-worker [config.toml]`. Uses `[distributed] space_addr`, or
//! broadcast discovery on `discovery_port` when it is unset. Remote handlers
//! get a detached client handle: they observe, they cannot reply.

use anyhow::Context;
use slirc_bot::config::{validate, Config};
use slirc_bot::dispatch::{DispatchChain, Flow, Routes};
use slirc_bot::distributed::{discovery, Worker};
use slirc_bot::handlers::LoggingHandler;
use slirc_bot::telemetry;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            Config::load(&path).with_context(|| format!("failed to load config from {path}"))?
        }
        None => Config::default(),
    };

    telemetry::init(&config.logging);

    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s)", errors.len());
    }

    let space: SocketAddr = match &config.distributed.space_addr {
        Some(addr) => addr.parse()?,
        None => discovery::discover(config.distributed.discovery_port, Duration::from_secs(5))
            .await
            .context("could not locate the coordination space")?,
    };

    let mut chain = DispatchChain::new();
    chain.register(Arc::new(Routes::new("trace").fallback(|ctx| async move {
        debug!(event = %ctx.name(), session = ?ctx.session, "Remote event");
        Ok(Flow::Continue)
    })));
    if config.handlers.logging {
        chain.register(Arc::new(LoggingHandler::new()));
    }

    info!(%space, handlers = chain.len(), "Starting slirc-worker");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = tokio::spawn(Worker::new(space, chain).run(shutdown_rx));

    tokio::signal::ctrl_c().await?;
    info!("Interrupt received, finishing current take");
    let _ = shutdown_tx.send(true);
    worker.await?;

    Ok(())
}
