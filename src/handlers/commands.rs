//! Prefix command router.
//!
//! Recognises `!cmd args` in channels, `<nick>: cmd args` addressed to the
//! bot, and bare `cmd args` in private messages. Unknown commands are
//! ignored so later handlers still see the message.

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use slirc_wire::ChannelExt;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use crate::client::ClientHandle;
use crate::dispatch::{names, EventContext, Flow, Handler, HandlerResult};
use crate::error::ClientError;

/// A parsed command invocation.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub client: ClientHandle,
    /// Nick that sent the command.
    pub sender: String,
    /// Where the message was sent: a channel, or our own nick for private messages.
    pub target: String,
    /// Lower-cased command name, without prefix.
    pub command: String,
    /// Everything after the command name, trimmed.
    pub args_raw: String,
    pub args: Vec<String>,
}

impl CommandContext {
    pub fn is_channel(&self) -> bool {
        self.target.is_channel_name()
    }

    /// Where replies go: the channel, or the sender for private messages.
    pub fn reply_target(&self) -> &str {
        if self.is_channel() {
            &self.target
        } else {
            &self.sender
        }
    }

    pub fn reply(&self, text: &str) -> Result<(), ClientError> {
        self.client.msg(self.reply_target(), text)
    }

    /// Reply prefixed with the sender's nick when in a channel.
    pub fn reply_to(&self, text: &str) -> Result<(), ClientError> {
        if self.is_channel() {
            self.reply(&format!("{}: {}", self.sender, text))
        } else {
            self.reply(text)
        }
    }

    pub fn action(&self, text: &str) -> Result<(), ClientError> {
        self.client.action(self.reply_target(), text)
    }
}

type CommandFn = Arc<dyn Fn(CommandContext) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

struct CommandEntry {
    name: String,
    help: String,
    callback: CommandFn,
}

pub struct CommandRouter {
    prefix: String,
    commands: Vec<CommandEntry>,
}

impl CommandRouter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            commands: Vec::new(),
        }
    }

    /// Register a command. Names are case-insensitive; a later registration
    /// with the same name replaces the earlier one.
    #[must_use]
    pub fn command<F, Fut>(mut self, name: &str, help: &str, f: F) -> Self
    where
        F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let name = name.to_ascii_lowercase();
        self.commands.retain(|c| c.name != name);
        self.commands.push(CommandEntry {
            name,
            help: help.to_string(),
            callback: Arc::new(move |ctx| Box::pin(f(ctx))),
        });
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|c| c.name.as_str())
    }

    /// Split a message into (command, args) if it is addressed to us.
    fn parse<'a>(&self, text: &'a str, own_nick: Option<&str>, private: bool) -> Option<(String, &'a str)> {
        let text = text.trim();

        let body = if !self.prefix.is_empty() && text.starts_with(self.prefix.as_str()) {
            &text[self.prefix.len()..]
        } else if let Some(rest) = own_nick.and_then(|nick| strip_address(text, nick)) {
            rest
        } else if private {
            text
        } else {
            return None;
        };

        let body = body.trim_start();
        let (command, args) = body.split_once(char::is_whitespace).unwrap_or((body, ""));
        if command.is_empty() {
            return None;
        }
        Some((command.to_ascii_lowercase(), args.trim()))
    }

    fn help_text(&self) -> String {
        let listing = self
            .commands
            .iter()
            .map(|c| format!("{}{} - {}", self.prefix, c.name, c.help))
            .collect::<Vec<_>>()
            .join(", ");
        if listing.is_empty() {
            "No commands available".to_string()
        } else {
            format!("Commands: {listing}")
        }
    }
}

/// `nick: rest` or `nick, rest`, nick matched case-insensitively.
fn strip_address<'a>(text: &'a str, nick: &str) -> Option<&'a str> {
    let head = text.get(..nick.len())?;
    if !head.eq_ignore_ascii_case(nick) {
        return None;
    }
    let rest = &text[nick.len()..];
    rest.strip_prefix(':').or_else(|| rest.strip_prefix(','))
}

#[async_trait]
impl Handler for CommandRouter {
    fn name(&self) -> &str {
        "commands"
    }

    async fn handle(&self, ctx: &EventContext) -> HandlerResult {
        if ctx.name() != names::INCOMING_MESSAGE {
            return Ok(Flow::Continue);
        }

        let target = ctx.require("target")?;
        let private = !target.is_channel_name();
        let Some((command, args)) = self.parse(ctx.require("message")?, ctx.nickname.as_deref(), private) else {
            return Ok(Flow::Continue);
        };

        let invocation = CommandContext {
            client: ctx.client.clone(),
            sender: ctx.require("nick")?.to_string(),
            target: target.to_string(),
            command: command.clone(),
            args_raw: args.to_string(),
            args: args.split_whitespace().map(str::to_string).collect(),
        };

        if let Some(entry) = self.commands.iter().find(|c| c.name == command) {
            debug!(command = %command, sender = %invocation.sender, "Running command");
            return (entry.callback)(invocation).await;
        }

        if command == "help" {
            invocation.reply(&self.help_text())?;
            return Ok(Flow::Halt);
        }

        Ok(Flow::Continue)
    }
}
