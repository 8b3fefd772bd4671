//! Scripted fake IRC server.
//!
//! Listens on an ephemeral localhost port. Each accepted connection is a
//! [`Peer`] the test drives line by line.

use futures_util::{SinkExt, StreamExt};
use slirc_bot::config::NetworkConfig;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_util::codec::{Framed, LinesCodec};

const WAIT: Duration = Duration::from_secs(5);

/// Longer than the client's post-QUIT grace period.
const CLOSE_WAIT: Duration = Duration::from_secs(10);

pub struct FakeServer {
    listener: TcpListener,
}

#[allow(dead_code)]
impl FakeServer {
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake server");
        Self { listener }
    }

    pub fn port(&self) -> u16 {
        self.listener.local_addr().expect("local addr").port()
    }

    /// Network options pointing at this server.
    pub fn network(&self, nicknames: &[&str]) -> NetworkConfig {
        let mut network = NetworkConfig::new("127.0.0.1");
        network.port = self.port();
        network.nicknames = nicknames.iter().map(|n| n.to_string()).collect();
        network
    }

    pub async fn accept(&self) -> Peer {
        self.try_accept(WAIT).await.expect("client should connect")
    }

    pub async fn try_accept(&self, wait: Duration) -> Option<Peer> {
        let (stream, _) = timeout(wait, self.listener.accept()).await.ok()?.ok()?;
        Some(Peer {
            framed: Framed::new(stream, LinesCodec::new()),
        })
    }
}

pub struct Peer {
    framed: Framed<TcpStream, LinesCodec>,
}

#[allow(dead_code)]
impl Peer {
    pub async fn send(&mut self, line: &str) {
        self.framed.send(line.to_string()).await.expect("send line");
    }

    /// Next line from the client, keepalive PINGs included.
    pub async fn recv_raw(&mut self) -> String {
        timeout(WAIT, self.framed.next())
            .await
            .expect("timed out waiting for a line")
            .expect("client closed the connection")
            .expect("line codec error")
    }

    /// Next line from the client, skipping keepalive PINGs.
    pub async fn recv(&mut self) -> String {
        loop {
            let line = self.recv_raw().await;
            if !line.starts_with("PING ") {
                return line;
            }
        }
    }

    pub async fn expect(&mut self, expected: &str) {
        assert_eq!(self.recv().await, expected);
    }

    /// Read through registration: optional PASS, then NICK and USER.
    pub async fn expect_registration(&mut self, nick: &str) {
        self.expect(&format!("NICK {nick}")).await;
        let user = self.recv().await;
        assert!(user.starts_with("USER "), "expected USER, got {user:?}");
    }

    /// Wait for the client to hang up, collecting what it sent first.
    pub async fn drain_until_closed(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        loop {
            match timeout(CLOSE_WAIT, self.framed.next()).await {
                Ok(Some(Ok(line))) => lines.push(line),
                Ok(Some(Err(_))) | Ok(None) => return lines,
                Err(_) => panic!("client did not close the connection; got {lines:?}"),
            }
        }
    }

    /// Hang up on the client.
    pub fn close(self) {
        drop(self);
    }
}
