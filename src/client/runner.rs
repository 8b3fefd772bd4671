//! Drives a session over a transport, and reconnects it when it drops.

use futures_util::{SinkExt, StreamExt};
use slirc_wire::{LineCodec, ProtocolError};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::codec::Framed;
use tracing::{error, info, warn, Instrument};

use super::backoff::Backoff;
use super::profile::ClientProfile;
use super::registry::ConnectionRegistry;
use super::session::Session;
use super::state::{DisconnectOutcome, SessionState};
use super::transport;
use crate::config::{Config, KeepaliveConfig, NetworkConfig, ReconnectConfig};

/// How long to wait for the server to close the link after our QUIT.
pub const QUIT_GRACE: Duration = Duration::from_secs(5);

/// Keepalive and quit-deadline check period.
const TICK: Duration = Duration::from_secs(1);

const SHUTDOWN_REASON: &str = "Shutting down";

/// Run one connected session until its transport closes.
///
/// Reads lines into the session, writes its outbox to the stream, applies
/// commands issued through detached-from-dispatch handles, and probes the
/// server when it goes quiet. A `true` on `shutdown` makes the session quit.
pub async fn drive<S>(
    session: &mut Session,
    outbox: &mut mpsc::UnboundedReceiver<String>,
    stream: S,
    keepalive: &KeepaliveConfig,
    shutdown: &mut watch::Receiver<bool>,
) -> DisconnectOutcome
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut framed = Framed::new(stream, LineCodec::new());
    session.connect().await;

    if *shutdown.borrow() {
        session.quit(Some(SHUTDOWN_REASON)).await;
    }

    let mut last_seen = Instant::now();
    let mut ping_sent_at: Option<Instant> = None;
    let mut quit_deadline: Option<Instant> = None;
    let mut watching_shutdown = true;
    let mut ticker = tokio::time::interval(TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if quit_deadline.is_none() && session.state() == SessionState::Disconnecting {
            quit_deadline = Some(Instant::now() + QUIT_GRACE);
        }

        tokio::select! {
            biased;

            Some(line) = outbox.recv() => {
                match framed.send(line).await {
                    Ok(()) => {}
                    Err(ProtocolError::Io(e)) => {
                        warn!(error = %e, "Write failed");
                        break;
                    }
                    Err(e) => warn!(error = %e, "Dropped unsendable line"),
                }
            }

            frame = framed.next() => match frame {
                Some(Ok(line)) => {
                    last_seen = Instant::now();
                    ping_sent_at = None;
                    session.receive_line(&line).await;
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Read failed");
                    break;
                }
                None => {
                    info!("Server closed the connection");
                    break;
                }
            },

            Some(command) = session.recv_command() => session.execute(command).await,

            changed = shutdown.changed(), if watching_shutdown => {
                watching_shutdown = false;
                if changed.is_ok() && *shutdown.borrow() {
                    session.quit(Some(SHUTDOWN_REASON)).await;
                }
            }

            _ = ticker.tick() => {
                let now = Instant::now();
                if let Some(deadline) = quit_deadline
                    && now >= deadline
                {
                    info!("No close from server after QUIT, dropping connection");
                    break;
                }
                match ping_sent_at {
                    Some(sent) if now.duration_since(sent) >= keepalive.timeout() => {
                        warn!(timeout_secs = keepalive.timeout_secs, "Ping timeout");
                        break;
                    }
                    None if now.duration_since(last_seen) >= keepalive.ping_interval() => {
                        let token = chrono::Utc::now().timestamp().to_string();
                        session.send_ping(&token);
                        ping_sent_at = Some(now);
                    }
                    _ => {}
                }
            }
        }
    }

    session.disconnected().await
}

/// One configured network: connects, drives the session, and reconnects
/// with backoff after unexpected drops.
pub struct Connection {
    profile: Arc<ClientProfile>,
    registry: Arc<ConnectionRegistry>,
    options: NetworkConfig,
    reconnect: ReconnectConfig,
    keepalive: KeepaliveConfig,
}

impl Connection {
    pub fn new(
        profile: Arc<ClientProfile>,
        registry: Arc<ConnectionRegistry>,
        options: NetworkConfig,
        config: &Config,
    ) -> Self {
        Self {
            profile,
            registry,
            options,
            reconnect: config.reconnect.clone(),
            keepalive: config.keepalive.clone(),
        }
    }

    /// Run until the session quits, shutdown is requested, or reconnect
    /// attempts are exhausted (the only error).
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        let mut backoff = Backoff::from_config(&self.reconnect);
        let mut options = self.options.clone();

        loop {
            let (outbox_tx, mut outbox_rx) = mpsc::unbounded_channel();
            let mut session = Session::new(
                Arc::clone(&self.profile),
                options.clone(),
                Arc::clone(&self.registry),
                outbox_tx,
            );
            let span = crate::telemetry::spans::session(&session.id(), &options.address());

            let outcome = async {
                match transport::open(&options).await {
                    Ok(stream) => {
                        info!(tls = stream.is_tls(), "Transport open");
                        drive(
                            &mut session,
                            &mut outbox_rx,
                            stream,
                            &self.keepalive,
                            &mut shutdown,
                        )
                        .await
                    }
                    Err(e) => {
                        warn!(error = %e, "Connection attempt failed");
                        DisconnectOutcome::Reconnect(options.clone())
                    }
                }
            }
            .instrument(span)
            .await;

            if session.has_registered() {
                backoff.reset();
            }

            match outcome {
                DisconnectOutcome::Reconnect(original) => {
                    if *shutdown.borrow() {
                        return Ok(());
                    }
                    options = original;

                    let Some(delay) = backoff.next_delay() else {
                        error!(
                            server = %options.address(),
                            attempts = backoff.attempts(),
                            "Giving up on reconnecting"
                        );
                        anyhow::bail!(
                            "gave up reconnecting to {} after {} attempts",
                            options.address(),
                            backoff.attempts()
                        );
                    };

                    info!(
                        server = %options.address(),
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        attempt = backoff.attempts(),
                        "Reconnecting"
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        Ok(()) = shutdown.changed() => {
                            if *shutdown.borrow() {
                                return Ok(());
                            }
                        }
                    }
                }
                DisconnectOutcome::Closed { registry_empty } => {
                    info!(server = %options.address(), registry_empty, "Session closed");
                    return Ok(());
                }
                DisconnectOutcome::AlreadyDisconnected => return Ok(()),
            }
        }
    }
}
