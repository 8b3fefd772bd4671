//! Outbound command formatting.
//!
//! Every line the client writes goes through [`OutboundLine`], so there is a
//! single rule for the trailing parameter:
//!
//! - text-carrying parameters (message bodies, PART/QUIT reasons, the USER
//!   realname) are always written as `:trailing`
//! - for everything else, the final argument gets a `:` prefix only when it
//!   is empty, contains a space, or itself starts with `:`
//!
//! The verb is upper-cased and arguments are joined with single spaces. The
//! CRLF terminator is added by the codec, not here.

use std::fmt;

use crate::error::{is_illegal_control_char, ProtocolError, Result};

/// Whether a final argument must be written with a `:` prefix.
pub fn needs_trailing(arg: &str) -> bool {
    arg.is_empty() || arg.contains(' ') || arg.starts_with(':')
}

/// Wrap text in a CTCP ACTION envelope.
pub fn ctcp_action(text: &str) -> String {
    format!("\x01ACTION {}\x01", text.trim())
}

/// A single outbound IRC command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundLine {
    verb: String,
    params: Vec<String>,
    trailing: Option<String>,
}

impl OutboundLine {
    /// Start a command with the given verb.
    pub fn new(verb: &str) -> Self {
        Self {
            verb: verb.to_ascii_uppercase(),
            params: Vec::new(),
            trailing: None,
        }
    }

    /// Build a command from a verb and a plain argument list, applying the
    /// trailing-parameter rule to the last argument.
    pub fn command<I, S>(verb: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut line = Self::new(verb);
        let mut args: Vec<String> = args.into_iter().map(Into::into).collect();
        if let Some(last) = args.pop() {
            line.params = args;
            if needs_trailing(&last) {
                line.trailing = Some(last);
            } else {
                line.params.push(last);
            }
        }
        line
    }

    /// Append a middle parameter.
    #[must_use]
    pub fn param(mut self, param: impl Into<String>) -> Self {
        self.params.push(param.into());
        self
    }

    /// Set the trailing parameter. It is always written with a `:` prefix.
    #[must_use]
    pub fn trailing(mut self, text: impl Into<String>) -> Self {
        self.trailing = Some(text.into());
        self
    }

    /// The upper-cased command verb.
    pub fn verb(&self) -> &str {
        &self.verb
    }

    /// Validate and serialize the command, without the CRLF terminator.
    pub fn render(&self) -> Result<String> {
        if self.verb.is_empty() || !self.verb.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ProtocolError::InvalidVerb(self.verb.clone()));
        }
        for param in &self.params {
            if param.is_empty() || param.contains(' ') || param.starts_with(':') {
                return Err(ProtocolError::InvalidParameter(param.clone()));
            }
        }

        let rendered = self.to_string();
        if let Some(ch) = rendered.chars().find(|c| is_illegal_control_char(*c)) {
            return Err(ProtocolError::IllegalControlChar(ch));
        }
        Ok(rendered)
    }

    // === Constructors for the commands the client sends ===

    /// `PASS <password>`
    pub fn pass(password: &str) -> Self {
        Self::command("PASS", [password])
    }

    /// `NICK <nickname>`
    pub fn nick(nickname: &str) -> Self {
        Self::command("NICK", [nickname])
    }

    /// `USER <user> 0 * :<realname>`
    pub fn user(user: &str, realname: &str) -> Self {
        Self::new("USER")
            .param(user)
            .param("0")
            .param("*")
            .trailing(realname)
    }

    /// `JOIN <channel>`
    pub fn join(channel: &str) -> Self {
        Self::command("JOIN", [channel])
    }

    /// `PART <channel> [:<reason>]`
    pub fn part(channel: &str, reason: Option<&str>) -> Self {
        let line = Self::new("PART").param(channel);
        match reason {
            Some(reason) => line.trailing(reason.trim()),
            None => line,
        }
    }

    /// `QUIT [:<reason>]`
    pub fn quit(reason: Option<&str>) -> Self {
        let line = Self::new("QUIT");
        match reason {
            Some(reason) => line.trailing(reason.trim()),
            None => line,
        }
    }

    /// `PRIVMSG <target> :<text>`
    pub fn privmsg(target: &str, text: &str) -> Self {
        Self::new("PRIVMSG").param(target).trailing(text)
    }

    /// `PRIVMSG <target> :\x01ACTION <text>\x01`
    pub fn action(target: &str, text: &str) -> Self {
        Self::privmsg(target, &ctcp_action(text))
    }

    /// `PONG <data>`
    pub fn pong(data: &str) -> Self {
        Self::command("PONG", [data])
    }

    /// `PING <token>`
    pub fn ping(token: &str) -> Self {
        Self::command("PING", [token])
    }
}

impl fmt::Display for OutboundLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.verb)?;
        for param in &self.params {
            write!(f, " {param}")?;
        }
        if let Some(trailing) = &self.trailing {
            write!(f, " :{trailing}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_is_uppercased() {
        assert_eq!(OutboundLine::command("privmsg", ["bob", "hi"]).to_string(), "PRIVMSG bob hi");
    }

    #[test]
    fn test_last_arg_with_space_is_trailing() {
        let line = OutboundLine::command("notice", ["bob", "hello there"]);
        assert_eq!(line.render().unwrap(), "NOTICE bob :hello there");
    }

    #[test]
    fn test_empty_and_colon_args_are_trailing() {
        assert_eq!(OutboundLine::pong("").render().unwrap(), "PONG :");
        assert_eq!(OutboundLine::pong(":x").render().unwrap(), "PONG ::x");
    }

    #[test]
    fn test_spec_command_shapes() {
        assert_eq!(OutboundLine::join("#rust").render().unwrap(), "JOIN #rust");
        assert_eq!(
            OutboundLine::part("#rust", Some("bye")).render().unwrap(),
            "PART #rust :bye"
        );
        assert_eq!(OutboundLine::part("#rust", None).render().unwrap(), "PART #rust");
        assert_eq!(OutboundLine::quit(None).render().unwrap(), "QUIT");
        assert_eq!(
            OutboundLine::privmsg("#rust", "hi").render().unwrap(),
            "PRIVMSG #rust :hi"
        );
        assert_eq!(
            OutboundLine::action("#rust", " waves ").render().unwrap(),
            "PRIVMSG #rust :\x01ACTION waves\x01"
        );
        assert_eq!(OutboundLine::nick("bot_").render().unwrap(), "NICK bot_");
        assert_eq!(OutboundLine::pong("abc123").render().unwrap(), "PONG abc123");
        assert_eq!(
            OutboundLine::user("slirc", "slirc bot").render().unwrap(),
            "USER slirc 0 * :slirc bot"
        );
    }

    #[test]
    fn test_render_rejects_injection() {
        let line = OutboundLine::privmsg("#rust", "hi\r\nQUIT");
        assert!(matches!(line.render(), Err(ProtocolError::IllegalControlChar('\r'))));

        let line = OutboundLine::new("PRIVMSG").param("#a b").trailing("x");
        assert!(matches!(line.render(), Err(ProtocolError::InvalidParameter(_))));
    }

    #[test]
    fn test_render_rejects_bad_verb() {
        assert!(matches!(
            OutboundLine::new("").render(),
            Err(ProtocolError::InvalidVerb(_))
        ));
        assert!(matches!(
            OutboundLine::new("PRIV MSG").render(),
            Err(ProtocolError::InvalidVerb(_))
        ));
    }
}
