//! Chat log handler.
//!
//! Writes channel and private messages to the `slirc_bot::chatlog` tracing
//! target while listening. The `listen` and `earmuffs` commands toggle it.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

use super::commands::CommandRouter;
use crate::dispatch::{names, EventContext, Flow, Handler, HandlerResult};

pub const CHATLOG_TARGET: &str = "slirc_bot::chatlog";

#[derive(Debug, Clone)]
pub struct LoggingHandler {
    listening: Arc<AtomicBool>,
}

impl LoggingHandler {
    pub fn new() -> Self {
        Self {
            listening: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }

    /// Add `listen` and `earmuffs` to a command router.
    pub fn commands(&self, router: CommandRouter) -> CommandRouter {
        let listen = Arc::clone(&self.listening);
        let earmuffs = Arc::clone(&self.listening);

        router
            .command("listen", "start logging this channel", move |cmd| {
                let was_listening = listen.swap(true, Ordering::Relaxed);
                async move {
                    if was_listening {
                        cmd.reply("Uh, You never asked me to put my earmuffs on?")?;
                    } else {
                        cmd.reply("Busted! I heard _everything_ you said ;)")?;
                    }
                    Ok(Flow::Halt)
                }
            })
            .command("earmuffs", "stop logging", move |cmd| {
                let was_listening = earmuffs.swap(false, Ordering::Relaxed);
                async move {
                    if was_listening {
                        cmd.reply("Oh hai, I'm not listening anymore.")?;
                    } else {
                        cmd.reply("I've already put the earmuffs on!")?;
                    }
                    Ok(Flow::Halt)
                }
            })
    }

    fn record(&self, from: &str, to: &str, text: &str, kind: &'static str) {
        if self.is_listening() {
            info!(target: CHATLOG_TARGET, from, to, kind, "{text}");
        }
    }
}

impl Default for LoggingHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Handler for LoggingHandler {
    fn name(&self) -> &str {
        "chatlog"
    }

    async fn handle(&self, ctx: &EventContext) -> HandlerResult {
        let own_nick = ctx.nickname.as_deref().unwrap_or("*");
        match ctx.name() {
            names::INCOMING_MESSAGE | names::INCOMING_ACTION => {
                let kind = if ctx.name() == names::INCOMING_ACTION { "action" } else { "message" };
                self.record(
                    ctx.field("nick").unwrap_or_default(),
                    ctx.field("target").unwrap_or_default(),
                    ctx.field("message").unwrap_or_default(),
                    kind,
                );
            }
            names::OUTGOING_MESSAGE | names::OUTGOING_ACTION => {
                let kind = if ctx.name() == names::OUTGOING_ACTION { "action" } else { "message" };
                self.record(
                    own_nick,
                    ctx.field("target").unwrap_or_default(),
                    ctx.field("message").unwrap_or_default(),
                    kind,
                );
            }
            _ => {}
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientCommand, ClientHandle};
    use crate::dispatch::{Event, Fields};
    use tokio::sync::mpsc;

    fn command(text: &str) -> (EventContext, mpsc::UnboundedReceiver<ClientCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let event = Event::new(
            names::INCOMING_MESSAGE,
            Fields::new()
                .with("nick", "alice")
                .with("target", "#chan")
                .with("message", text),
        );
        (EventContext::new(event, ClientHandle::new(tx)), rx)
    }

    fn reply(rx: &mut mpsc::UnboundedReceiver<ClientCommand>) -> String {
        match rx.try_recv().unwrap() {
            ClientCommand::Msg { text, .. } => text,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_earmuffs_and_listen_toggle() {
        let logger = LoggingHandler::new();
        let router = logger.commands(CommandRouter::new("!"));

        let (ctx, mut rx) = command("!earmuffs");
        router.handle(&ctx).await.unwrap();
        assert!(!logger.is_listening());
        assert_eq!(reply(&mut rx), "Oh hai, I'm not listening anymore.");

        let (ctx, mut rx) = command("!earmuffs");
        router.handle(&ctx).await.unwrap();
        assert_eq!(reply(&mut rx), "I've already put the earmuffs on!");

        let (ctx, mut rx) = command("!listen");
        router.handle(&ctx).await.unwrap();
        assert!(logger.is_listening());
        assert_eq!(reply(&mut rx), "Busted! I heard _everything_ you said ;)");

        let (ctx, mut rx) = command("!listen");
        router.handle(&ctx).await.unwrap();
        assert_eq!(reply(&mut rx), "Uh, You never asked me to put my earmuffs on?");
    }

    #[tokio::test]
    async fn test_logging_never_halts() {
        let logger = LoggingHandler::new();
        let (ctx, _rx) = command("hello");
        assert_eq!(logger.handle(&ctx).await.unwrap(), Flow::Continue);
    }
}
