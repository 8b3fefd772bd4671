//! slirc-bot - IRC bot built on the slirc framework.
//!
//! Connects to every configured network with the stock handlers and exits
//! once all sessions have quit.

use anyhow::Context;
use slirc_bot::client::{ClientProfile, Connection, ConnectionRegistry};
use slirc_bot::config::{validate, Config};
use slirc_bot::dispatch::Flow;
use slirc_bot::distributed::DispatchBridge;
use slirc_bot::handlers::{CommandRouter, LoggingHandler};
use slirc_bot::telemetry;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {config_path}"))?;

    telemetry::init(&config.logging);

    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {config_path}", errors.len());
    }
    if config.networks.is_empty() {
        anyhow::bail!("no [[network]] blocks in {config_path}");
    }

    info!(networks = config.networks.len(), "Starting slirc-bot");

    // Handler chain: bridge first so it sees events later handlers halt
    let mut builder = ClientProfile::builder()?;
    if config.distributed.enabled {
        builder.register_handler(DispatchBridge::spawn(config.distributed.clone()));
        info!("Forwarding events to the coordination space");
    }

    let mut router = CommandRouter::new(config.handlers.command_prefix.clone()).command(
        "ping",
        "check that the bot is alive",
        |cmd| async move {
            cmd.reply_to("pong")?;
            Ok(Flow::Halt)
        },
    );
    if config.handlers.logging {
        let logger = LoggingHandler::new();
        router = logger.commands(router);
        builder.register_handler(logger);
    }
    builder.register_handler(router);
    let profile = builder.build();

    // One task per network
    let registry = Arc::new(ConnectionRegistry::new());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut tasks = JoinSet::new();
    for network in &config.networks {
        let connection = Connection::new(
            Arc::clone(&profile),
            Arc::clone(&registry),
            network.clone(),
            &config,
        );
        tasks.spawn(connection.run(shutdown_rx.clone()));
    }

    let mut failures = 0usize;
    loop {
        tokio::select! {
            joined = tasks.join_next() => match joined {
                Some(Ok(Ok(()))) => {}
                Some(Ok(Err(e))) => {
                    error!(error = %e, "Network connection gave up");
                    failures += 1;
                }
                Some(Err(e)) => {
                    error!(error = %e, "Network task panicked");
                    failures += 1;
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c(), if !*shutdown_tx.borrow() => {
                info!("Interrupt received, quitting all sessions");
                let _ = shutdown_tx.send(true);
            }
        }
    }

    registry.wait_empty().await;
    info!("All sessions closed");

    if failures > 0 {
        anyhow::bail!("{failures} network(s) stopped after exhausting reconnect attempts");
    }
    Ok(())
}
