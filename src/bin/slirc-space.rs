//! slirc-space - hosts the coordination space.
//!
//! Usage: `slirc-space [config.toml]`. Only the `[space]` and `[logging]`
//! sections are read.

use anyhow::Context;
use slirc_bot::config::{validate, Config};
use slirc_bot::distributed::discovery::DiscoveryResponder;
use slirc_bot::distributed::SpaceServer;
use slirc_bot::telemetry;
use tracing::{error, info};

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

    let server = SpaceServer::bind(&config.space.bind).await?;
    let addr = server.local_addr()?;
    let responder = DiscoveryResponder::bind(config.space.discovery_port, addr).await?;

    info!(%addr, discovery_port = config.space.discovery_port, "Starting slirc-space");

    tokio::select! {
        result = server.run() => result?,
        result = responder.run() => result?,
        _ = tokio::signal::ctrl_c() => info!("Interrupt received, shutting down"),
    }

    Ok(())
}
