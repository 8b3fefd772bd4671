//! Cloneable handle handlers use to issue commands to their session.

use tokio::sync::mpsc;

use crate::error::ClientError;

/// A command queued for the session that owns the handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    Join(String),
    Part {
        channel: String,
        reason: Option<String>,
    },
    Msg {
        target: String,
        text: String,
    },
    Action {
        target: String,
        text: String,
    },
    Nick(String),
    Quit(Option<String>),
    /// Send a line verbatim. No outgoing event is dispatched.
    Raw(String),
}

/// Back-reference from a handler to the session that dispatched the event.
///
/// Commands are queued and applied by the session in order, after the
/// current handler returns. A detached handle rejects every command.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    tx: Option<mpsc::UnboundedSender<ClientCommand>>,
}

impl ClientHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<ClientCommand>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A handle with no session behind it.
    pub fn detached() -> Self {
        Self { tx: None }
    }

    pub fn is_detached(&self) -> bool {
        self.tx.is_none()
    }

    pub fn join(&self, channel: &str) -> Result<(), ClientError> {
        self.send(ClientCommand::Join(channel.to_string()))
    }

    pub fn part(&self, channel: &str, reason: Option<&str>) -> Result<(), ClientError> {
        self.send(ClientCommand::Part {
            channel: channel.to_string(),
            reason: reason.map(str::to_string),
        })
    }

    pub fn msg(&self, target: &str, text: &str) -> Result<(), ClientError> {
        self.send(ClientCommand::Msg {
            target: target.to_string(),
            text: text.to_string(),
        })
    }

    pub fn action(&self, target: &str, text: &str) -> Result<(), ClientError> {
        self.send(ClientCommand::Action {
            target: target.to_string(),
            text: text.to_string(),
        })
    }

    pub fn nick(&self, nickname: &str) -> Result<(), ClientError> {
        self.send(ClientCommand::Nick(nickname.to_string()))
    }

    pub fn quit(&self, reason: Option<&str>) -> Result<(), ClientError> {
        self.send(ClientCommand::Quit(reason.map(str::to_string)))
    }

    pub fn raw(&self, line: &str) -> Result<(), ClientError> {
        self.send(ClientCommand::Raw(line.to_string()))
    }

    fn send(&self, command: ClientCommand) -> Result<(), ClientError> {
        match &self.tx {
            Some(tx) => tx.send(command).map_err(|_| ClientError::Closed),
            None => Err(ClientError::Detached),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_are_queued_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = ClientHandle::new(tx);

        handle.join("#a").unwrap();
        handle.msg("#a", "hi").unwrap();

        assert_eq!(rx.try_recv().unwrap(), ClientCommand::Join("#a".into()));
        assert_eq!(
            rx.try_recv().unwrap(),
            ClientCommand::Msg {
                target: "#a".into(),
                text: "hi".into()
            }
        );
    }

    #[test]
    fn test_detached_rejects() {
        let handle = ClientHandle::detached();
        assert_eq!(handle.msg("#a", "hi"), Err(ClientError::Detached));
    }

    #[test]
    fn test_closed_session() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let handle = ClientHandle::new(tx);
        assert_eq!(handle.quit(None), Err(ClientError::Closed));
    }
}
