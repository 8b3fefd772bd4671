//! A single connection's session: registration, built-in reactions and the
//! outward commands handlers issue.
//!
//! The session is sans-IO. It consumes raw lines through [`Session::receive_line`]
//! and writes rendered lines to an outbox channel; the runner owns the socket.
//!
//! Every event, whatever its origin, goes through one FIFO queue. For each
//! event the built-in reaction runs first, then the handler chain, then any
//! commands handlers queued through their [`ClientHandle`]. Commands can raise
//! further events (`outgoing_*`), which join the back of the queue. Halting
//! the chain therefore never suppresses the built-ins.

use slirc_wire::{normalize_channel, split_params, OutboundLine};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use super::handle::{ClientCommand, ClientHandle};
use super::profile::ClientProfile;
use super::registry::ConnectionRegistry;
use super::state::{DisconnectOutcome, SessionState};
use super::SessionId;
use crate::config::NetworkConfig;
use crate::dispatch::{names, Event, EventContext, Fields};

/// Welcome numeric: registration is complete.
const RPL_WELCOME: &str = "001";

pub struct Session {
    id: SessionId,
    profile: Arc<ClientProfile>,
    /// Original options, handed back verbatim for reconnects.
    options: NetworkConfig,
    registry: Arc<ConnectionRegistry>,
    outbox: mpsc::UnboundedSender<String>,
    handle: ClientHandle,
    commands: mpsc::UnboundedReceiver<ClientCommand>,

    state: SessionState,
    nickname: Option<String>,
    /// Nickname before our last NICK, restored if the server rejects it after registration.
    previous_nickname: Option<String>,
    candidates: VecDeque<String>,
    channels: Vec<String>,
    disconnect_expected: bool,
    registered: bool,
    pending: VecDeque<Event>,
}

impl Session {
    pub fn new(
        profile: Arc<ClientProfile>,
        options: NetworkConfig,
        registry: Arc<ConnectionRegistry>,
        outbox: mpsc::UnboundedSender<String>,
    ) -> Self {
        let (tx, commands) = mpsc::unbounded_channel();
        Self {
            id: Uuid::new_v4(),
            profile,
            options,
            registry,
            outbox,
            handle: ClientHandle::new(tx),
            commands,
            state: SessionState::Disconnected,
            nickname: None,
            previous_nickname: None,
            candidates: VecDeque::new(),
            channels: Vec::new(),
            disconnect_expected: false,
            registered: false,
            pending: VecDeque::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn nickname(&self) -> Option<&str> {
        self.nickname.as_deref()
    }

    /// Joined channels, in join order.
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn is_joined(&self, channel: &str) -> bool {
        let channel = normalize_channel(channel);
        self.channels.iter().any(|c| c.eq_ignore_ascii_case(&channel))
    }

    pub fn disconnect_expected(&self) -> bool {
        self.disconnect_expected
    }

    /// True once the welcome numeric has been seen on this connection.
    pub fn has_registered(&self) -> bool {
        self.registered
    }

    pub fn options(&self) -> &NetworkConfig {
        &self.options
    }

    /// A handle for issuing commands from outside the dispatch chain.
    pub fn handle(&self) -> ClientHandle {
        self.handle.clone()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// The transport is up: register with the connection registry and
    /// dispatch `client_connected`, which starts registration.
    pub async fn connect(&mut self) {
        self.state = SessionState::Connecting;
        self.nickname = None;
        self.previous_nickname = None;
        self.candidates = self.options.nicknames.iter().cloned().collect();
        self.channels.clear();
        self.disconnect_expected = false;
        self.registered = false;

        self.registry.insert(self.id, &self.options.address());
        info!(server = %self.options.address(), "Connected");

        self.dispatch(Event::bare(names::CLIENT_CONNECTED)).await;
    }

    /// Feed one raw line from the server.
    ///
    /// `incoming_line` is dispatched first, then the grammar match (if any).
    pub async fn receive_line(&mut self, line: &str) {
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        if line.is_empty() {
            return;
        }

        self.enqueue(Event::new(
            names::INCOMING_LINE,
            Fields::new().with("line", line),
        ));
        match self.profile.grammar().match_line(line) {
            Some(matched) => self.enqueue(matched.into_event()),
            None => trace!(line, "No event matched"),
        }
        self.drain().await;
    }

    /// The transport has gone away.
    ///
    /// Dispatches `client_disconnected` and decides whether to reconnect.
    pub async fn disconnected(&mut self) -> DisconnectOutcome {
        if matches!(
            self.state,
            SessionState::Disconnected | SessionState::ReconnectPending
        ) {
            return DisconnectOutcome::AlreadyDisconnected;
        }

        self.registry.remove(&self.id);
        self.state = SessionState::Disconnected;
        self.channels.clear();

        let expected = self.disconnect_expected;
        self.dispatch(Event::new(
            names::CLIENT_DISCONNECTED,
            Fields::new().with("expected", expected.to_string()),
        ))
        .await;

        if expected {
            let registry_empty = self.registry.is_empty();
            info!(registry_empty, "Disconnected");
            DisconnectOutcome::Closed { registry_empty }
        } else {
            self.state = SessionState::ReconnectPending;
            warn!(server = %self.options.address(), "Connection lost unexpectedly");
            DisconnectOutcome::Reconnect(self.options.clone())
        }
    }

    /// Dispatch an event through the built-ins and the handler chain.
    pub async fn dispatch(&mut self, event: Event) {
        self.enqueue(event);
        self.drain().await;
    }

    /// Wait for a command issued through a handle outside of dispatch.
    pub async fn recv_command(&mut self) -> Option<ClientCommand> {
        self.commands.recv().await
    }

    /// Apply a command and dispatch what it raises.
    pub async fn execute(&mut self, command: ClientCommand) {
        self.apply(command);
        self.drain().await;
    }

    // ========================================================================
    // Outward commands
    // ========================================================================

    pub async fn join(&mut self, channel: &str) {
        self.do_join(channel);
        self.drain().await;
    }

    pub async fn part(&mut self, channel: &str, reason: Option<&str>) {
        self.do_part(channel, reason);
        self.drain().await;
    }

    pub async fn msg(&mut self, target: &str, text: &str) {
        self.do_msg(target, text);
        self.drain().await;
    }

    pub async fn action(&mut self, target: &str, text: &str) {
        self.do_action(target, text);
        self.drain().await;
    }

    pub async fn nick(&mut self, nickname: &str) {
        self.do_nick(nickname.to_string());
        self.drain().await;
    }

    pub async fn pong(&mut self, data: &str) {
        self.do_pong(data);
        self.drain().await;
    }

    pub async fn quit(&mut self, reason: Option<&str>) {
        self.do_quit(reason);
        self.drain().await;
    }

    /// Keepalive probe. Not an event.
    pub(crate) fn send_ping(&self, token: &str) {
        self.send(OutboundLine::ping(token));
    }

    // ========================================================================
    // Dispatch queue
    // ========================================================================

    fn enqueue(&mut self, event: Event) {
        self.pending.push_back(event);
    }

    async fn drain(&mut self) {
        while let Some(event) = self.pending.pop_front() {
            self.react(&event);

            let ctx = EventContext::new(event, self.handle.clone())
                .with_session(self.id, self.nickname.clone());
            let profile = Arc::clone(&self.profile);
            profile.chain().deliver(&ctx).await;

            while let Ok(command) = self.commands.try_recv() {
                self.apply(command);
            }
        }
    }

    fn apply(&mut self, command: ClientCommand) {
        match command {
            ClientCommand::Join(channel) => self.do_join(&channel),
            ClientCommand::Part { channel, reason } => self.do_part(&channel, reason.as_deref()),
            ClientCommand::Msg { target, text } => self.do_msg(&target, &text),
            ClientCommand::Action { target, text } => self.do_action(&target, &text),
            ClientCommand::Nick(nickname) => self.do_nick(nickname),
            ClientCommand::Quit(reason) => self.do_quit(reason.as_deref()),
            ClientCommand::Raw(line) => self.send_raw(&line),
        }
    }

    // ========================================================================
    // Built-in reactions
    // ========================================================================

    fn react(&mut self, event: &Event) {
        match event.name.as_str() {
            names::CLIENT_CONNECTED => self.begin_registration(),
            names::INCOMING_PING => self.do_pong(event.field("data").unwrap_or_default()),
            names::INCOMING_NICK_TAKEN => {
                self.on_nick_taken(event.field("target").unwrap_or_default())
            }
            names::INCOMING_NUMERIC if event.field("code") == Some(RPL_WELCOME) => {
                self.on_welcome(event.field("data").unwrap_or_default())
            }
            names::INCOMING_NICK => {
                if self.is_me(event.field("nick"))
                    && let Some(new_nick) = event.field("new_nick")
                {
                    debug!(new_nick, "Server changed our nickname");
                    self.nickname = Some(new_nick.to_string());
                }
            }
            names::INCOMING_PART => {
                if self.is_me(event.field("nick")) {
                    self.forget_channel(event.field("target").unwrap_or_default());
                }
            }
            names::INCOMING_KICK => {
                // `channel` holds the kicked nick, `target` the channel
                if self.is_me(event.field("channel")) {
                    let channel = event.field("target").unwrap_or_default();
                    warn!(channel, reason = event.field("reason"), "Kicked from channel");
                    self.forget_channel(channel);
                }
            }
            names::INCOMING_ERROR => {
                warn!(message = event.field("message"), "Server sent ERROR");
            }
            _ => {}
        }
    }

    fn begin_registration(&mut self) {
        self.state = SessionState::Registering;

        if let Some(password) = &self.options.password {
            self.send(OutboundLine::pass(password));
        }

        let Some(first) = self.candidates.pop_front() else {
            warn!("No nicknames configured, quitting");
            self.do_quit(Some("No nickname configured"));
            return;
        };
        self.do_nick(first);

        self.send(OutboundLine::user(&self.options.user, &self.options.realname));
        debug!(user = %self.options.user, "Registration sent");
    }

    fn on_nick_taken(&mut self, taken: &str) {
        if self.registered {
            warn!(nick = taken, "Nickname change rejected, keeping current nickname");
            if let Some(previous) = self.previous_nickname.take() {
                self.nickname = Some(previous);
            }
            return;
        }

        match self.candidates.pop_front() {
            Some(next) => {
                info!(taken, next = %next, "Nickname in use, trying next candidate");
                self.do_nick(next);
            }
            None => {
                warn!(taken, "Every nickname candidate is taken, quitting");
                self.do_quit(Some("No available nickname"));
            }
        }
    }

    fn on_welcome(&mut self, data: &str) {
        if self.registered {
            debug!("Ignoring repeated welcome");
            return;
        }
        self.registered = true;

        if let Some(confirmed) = split_params(data).into_iter().next()
            && !confirmed.is_empty()
            && confirmed != "*"
        {
            self.nickname = Some(confirmed);
        }
        self.previous_nickname = None;
        info!(nick = ?self.nickname, "Registered with server");

        if let Some(password) = &self.options.password {
            let service = self.options.nickserv.clone();
            self.send(OutboundLine::privmsg(&service, &format!("IDENTIFY {password}")));
            debug!(service = %service, "Identify sent");
        }

        for channel in self.options.channels.clone() {
            self.do_join(&channel);
        }

        self.state = SessionState::Ready;
    }

    fn is_me(&self, nick: Option<&str>) -> bool {
        match (nick, &self.nickname) {
            (Some(nick), Some(me)) => nick.eq_ignore_ascii_case(me),
            _ => false,
        }
    }

    fn forget_channel(&mut self, channel: &str) {
        let channel = normalize_channel(channel);
        self.channels.retain(|c| !c.eq_ignore_ascii_case(&channel));
    }

    // ========================================================================
    // Command internals
    // ========================================================================

    fn do_join(&mut self, channel: &str) {
        if channel.trim().is_empty() {
            warn!("Ignoring join with empty channel name");
            return;
        }
        let channel = normalize_channel(channel);
        if !self.send(OutboundLine::join(&channel)) {
            return;
        }
        if !self.channels.iter().any(|c| c.eq_ignore_ascii_case(&channel)) {
            self.channels.push(channel.clone());
        }
        info!(channel = %channel, "Joining channel");
        self.enqueue(Event::new(
            names::OUTGOING_JOIN,
            Fields::new().with("target", channel),
        ));
    }

    fn do_part(&mut self, channel: &str, reason: Option<&str>) {
        let channel = normalize_channel(channel);
        let Some(pos) = self
            .channels
            .iter()
            .position(|c| c.eq_ignore_ascii_case(&channel))
        else {
            warn!(channel = %channel, "Not in channel, ignoring part");
            return;
        };

        let channel = self.channels.remove(pos);
        self.send(OutboundLine::part(&channel, reason));
        info!(channel = %channel, "Parting channel");
        self.enqueue(Event::new(
            names::OUTGOING_PART,
            Fields::new()
                .with("target", channel)
                .with("reason", reason.unwrap_or_default()),
        ));
    }

    fn do_msg(&mut self, target: &str, text: &str) {
        if self.send(OutboundLine::privmsg(target, text)) {
            self.enqueue(Event::new(
                names::OUTGOING_MESSAGE,
                Fields::new().with("target", target).with("message", text),
            ));
        }
    }

    fn do_action(&mut self, target: &str, text: &str) {
        if self.send(OutboundLine::action(target, text)) {
            self.enqueue(Event::new(
                names::OUTGOING_ACTION,
                Fields::new().with("target", target).with("message", text.trim()),
            ));
        }
    }

    fn do_nick(&mut self, nickname: String) {
        if !self.send(OutboundLine::nick(&nickname)) {
            return;
        }
        self.previous_nickname = self.nickname.replace(nickname.clone());
        self.enqueue(Event::new(
            names::OUTGOING_NICK,
            Fields::new().with("new_nick", nickname),
        ));
    }

    fn do_pong(&mut self, data: &str) {
        if self.send(OutboundLine::pong(data)) {
            self.enqueue(Event::new(
                names::OUTGOING_PONG,
                Fields::new().with("data", data),
            ));
        }
    }

    fn do_quit(&mut self, reason: Option<&str>) {
        self.disconnect_expected = true;
        if !self.state.is_connected() || self.state == SessionState::Disconnecting {
            debug!(state = %self.state, "Quit requested while not connected");
            return;
        }

        for channel in self.channels.clone() {
            self.do_part(&channel, reason);
        }
        self.send(OutboundLine::quit(reason));
        self.state = SessionState::Disconnecting;
        self.registry.remove(&self.id);
        info!(reason = reason.unwrap_or_default(), "Quitting");

        self.enqueue(Event::new(
            names::QUIT,
            Fields::new().with("reason", reason.unwrap_or_default()),
        ));
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// Render and queue a line. Returns false if the line was malformed.
    fn send(&self, line: OutboundLine) -> bool {
        match line.render() {
            Ok(text) => {
                trace!(verb = line.verb(), "Queueing line");
                if self.outbox.send(text).is_err() {
                    debug!(verb = line.verb(), "Transport gone, dropping line");
                }
                true
            }
            Err(e) => {
                warn!(verb = line.verb(), error = %e, "Refusing to send malformed line");
                false
            }
        }
    }

    fn send_raw(&self, line: &str) {
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        if line.is_empty() || line.chars().any(slirc_wire::error::is_illegal_control_char) {
            warn!("Refusing to send malformed raw line");
            return;
        }
        if self.outbox.send(line.to_string()).is_err() {
            debug!("Transport gone, dropping raw line");
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("server", &self.options.address())
            .field("state", &self.state)
            .field("nickname", &self.nickname)
            .field("channels", &self.channels)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientProfileBuilder;
    use crate::dispatch::{Flow, Routes};

    fn profile() -> Arc<ClientProfile> {
        ClientProfile::builder().unwrap().build()
    }

    fn options(nicks: &[&str]) -> NetworkConfig {
        let mut options = NetworkConfig::new("irc.test");
        options.nicknames = nicks.iter().map(|n| n.to_string()).collect();
        options
    }

    fn session(
        profile: Arc<ClientProfile>,
        options: NetworkConfig,
    ) -> (Session, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let registry = Arc::new(ConnectionRegistry::new());
        (Session::new(profile, options, registry, tx), rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(line) = rx.try_recv() {
            lines.push(line);
        }
        lines
    }

    #[tokio::test]
    async fn test_registration_order_with_password() {
        let mut opts = options(&["bot"]);
        opts.password = Some("secret".into());
        let (mut session, mut rx) = session(profile(), opts);

        session.connect().await;

        assert_eq!(
            drain(&mut rx),
            vec!["PASS secret", "NICK bot", "USER slirc 0 * :slirc-bot"]
        );
        assert_eq!(session.state(), SessionState::Registering);
        assert_eq!(session.nickname(), Some("bot"));
    }

    #[tokio::test]
    async fn test_ping_is_answered() {
        let (mut session, mut rx) = session(profile(), options(&["bot"]));
        session.connect().await;
        drain(&mut rx);

        session.receive_line("PING :abc123").await;
        assert_eq!(drain(&mut rx), vec!["PONG abc123"]);

        session.receive_line("PING :two words").await;
        assert_eq!(drain(&mut rx), vec!["PONG :two words"]);
    }

    #[tokio::test]
    async fn test_welcome_confirms_nick_and_joins() {
        let mut opts = options(&["bot"]);
        opts.channels = vec!["#a".into(), "#b".into()];
        let (mut session, mut rx) = session(profile(), opts);
        session.connect().await;
        drain(&mut rx);

        session.receive_line(":srv 001 bot_ :Welcome").await;

        assert_eq!(drain(&mut rx), vec!["JOIN #a", "JOIN #b"]);
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.nickname(), Some("bot_"));
        assert_eq!(session.channels(), &["#a".to_string(), "#b".to_string()]);
    }

    #[tokio::test]
    async fn test_password_identifies_after_welcome() {
        let mut opts = options(&["bot"]);
        opts.password = Some("secret".into());
        let (mut session, mut rx) = session(profile(), opts);
        session.connect().await;
        drain(&mut rx);

        session.receive_line(":srv 001 bot :Welcome").await;
        assert_eq!(drain(&mut rx), vec!["PRIVMSG NickServ :IDENTIFY secret"]);
    }

    #[tokio::test]
    async fn test_identify_goes_to_configured_service() {
        let mut opts = options(&["bot"]);
        opts.password = Some("secret".into());
        opts.nickserv = "AuthServ".into();
        opts.channels = vec!["#a".into()];
        let (mut session, mut rx) = session(profile(), opts);
        session.connect().await;
        drain(&mut rx);

        session.receive_line(":srv 001 bot :Welcome").await;
        assert_eq!(
            drain(&mut rx),
            vec!["PRIVMSG AuthServ :IDENTIFY secret", "JOIN #a"]
        );
    }

    #[tokio::test]
    async fn test_part_unknown_channel_is_noop() {
        let (mut session, mut rx) = session(profile(), options(&["bot"]));
        session.connect().await;
        drain(&mut rx);

        session.part("#nowhere", None).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_malformed_message_not_sent() {
        let (mut session, mut rx) = session(profile(), options(&["bot"]));
        session.connect().await;
        drain(&mut rx);

        session.msg("#a", "line one\r\nQUIT").await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_handler_commands_follow_the_event() {
        let mut builder = ClientProfileBuilder::empty();
        builder.register_handler(Routes::new("greeter").on(names::OUTGOING_JOIN, |ctx| async move {
            let channel = ctx.require("target")?.to_string();
            ctx.client.msg(&channel, "hello")?;
            Ok(Flow::Continue)
        }));
        let profile = builder.build();

        let (mut session, mut rx) = session(profile, options(&["bot"]));
        session.connect().await;
        drain(&mut rx);

        session.join("lobby").await;
        assert_eq!(drain(&mut rx), vec!["JOIN #lobby", "PRIVMSG #lobby :hello"]);
    }

    #[tokio::test]
    async fn test_quit_before_connect() {
        let (mut session, mut rx) = session(profile(), options(&["bot"]));
        session.quit(None).await;

        assert!(session.disconnect_expected());
        assert!(drain(&mut rx).is_empty());
        assert_eq!(session.disconnected().await, DisconnectOutcome::AlreadyDisconnected);
    }

    #[tokio::test]
    async fn test_candidates_are_tried_once_then_quit() {
        let (mut session, mut rx) = session(profile(), options(&["a", "b", "c"]));
        session.connect().await;
        assert_eq!(drain(&mut rx)[0], "NICK a");

        session.receive_line(":srv 433 * a :Nickname is already in use").await;
        session.receive_line(":srv 433 * b :Nickname is already in use").await;
        assert_eq!(drain(&mut rx), vec!["NICK b", "NICK c"]);

        session.receive_line(":srv 433 * c :Nickname is already in use").await;
        assert_eq!(drain(&mut rx), vec!["QUIT :No available nickname"]);
        assert_eq!(session.state(), SessionState::Disconnecting);
        assert!(session.disconnect_expected());

        // Late collisions do not resurrect candidates
        session.receive_line(":srv 433 * c :Nickname is already in use").await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_join_then_part() {
        let (mut session, mut rx) = session(profile(), options(&["bot"]));
        session.connect().await;
        drain(&mut rx);

        session.join("#x").await;
        assert!(session.is_joined("#x"));
        session.part("#x", None).await;

        assert_eq!(drain(&mut rx), vec!["JOIN #x", "PART #x"]);
        assert!(session.channels().is_empty());
    }

    #[tokio::test]
    async fn test_unexpected_loss_plans_one_reconnect() {
        let mut opts = options(&["bot", "bot_"]);
        opts.channels = vec!["#test".into()];
        let (mut session, _rx) = session(profile(), opts.clone());
        session.connect().await;
        session.receive_line(":srv 433 * bot :in use").await;
        session.receive_line(":srv 001 bot_ :Welcome").await;

        assert_eq!(session.disconnected().await, DisconnectOutcome::Reconnect(opts));
        assert_eq!(session.state(), SessionState::ReconnectPending);
        assert_eq!(session.disconnected().await, DisconnectOutcome::AlreadyDisconnected);
    }

    #[tokio::test]
    async fn test_quit_then_loss_does_not_reconnect() {
        let mut opts = options(&["bot"]);
        opts.channels = vec!["#a".into()];
        let (mut session, mut rx) = session(profile(), opts);
        session.connect().await;
        session.receive_line(":srv 001 bot :Welcome").await;
        drain(&mut rx);

        session.quit(Some("bye")).await;
        assert_eq!(drain(&mut rx), vec!["PART #a :bye", "QUIT :bye"]);

        assert_eq!(
            session.disconnected().await,
            DisconnectOutcome::Closed { registry_empty: true }
        );
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_nick_collision_after_ready_restores_previous() {
        let (mut session, mut rx) = session(profile(), options(&["bot", "spare"]));
        session.connect().await;
        session.receive_line(":srv 001 bot :Welcome").await;
        drain(&mut rx);

        session.nick("taken").await;
        assert_eq!(session.nickname(), Some("taken"));
        session.receive_line(":srv 433 bot taken :Nickname is already in use").await;

        assert_eq!(drain(&mut rx), vec!["NICK taken"]);
        assert_eq!(session.nickname(), Some("bot"));
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn test_halting_handler_never_skips_builtin_pong() {
        let mut builder = ClientProfileBuilder::empty();
        builder
            .register_event("ping", r"^PING :?(.*)$", &["data"])
            .unwrap();
        builder.register_handler(Routes::new("wall").fallback(|_| async { Ok(Flow::Halt) }));
        let (mut session, mut rx) = session(builder.build(), options(&["bot"]));

        session.receive_line("PING :abc123").await;
        assert_eq!(drain(&mut rx), vec!["PONG abc123"]);
    }
}
