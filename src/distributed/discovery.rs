//! Locating the coordination space by UDP broadcast.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, info, trace};

use super::protocol::{Advert, Probe, SERVICE_NAME};
use crate::error::SpaceError;

/// Answers discovery probes with the space's TCP address.
pub struct DiscoveryResponder {
    socket: UdpSocket,
    advertised: SocketAddr,
}

impl DiscoveryResponder {
    pub async fn bind(port: u16, advertised: SocketAddr) -> Result<Self, SpaceError> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, port)).await?;
        Ok(Self { socket, advertised })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, SpaceError> {
        Ok(self.socket.local_addr()?)
    }

    pub async fn run(self) -> Result<(), SpaceError> {
        info!(port = self.local_addr()?.port(), advertised = %self.advertised, "Answering discovery probes");
        let advert = serde_json::to_vec(&Advert {
            service: SERVICE_NAME.to_string(),
            addr: self.advertised,
        })?;

        let mut buf = [0u8; 1024];
        loop {
            let (len, from) = self.socket.recv_from(&mut buf).await?;
            match serde_json::from_slice::<Probe>(&buf[..len]) {
                Ok(probe) if probe.probe == SERVICE_NAME => {
                    debug!(%from, "Discovery probe");
                    self.socket.send_to(&advert, from).await?;
                }
                _ => trace!(%from, "Ignoring stray datagram"),
            }
        }
    }
}

/// Broadcast a probe on `port` and wait up to `wait` for an answer.
pub async fn discover(port: u16, wait: Duration) -> Result<SocketAddr, SpaceError> {
    discover_at(SocketAddr::from((Ipv4Addr::BROADCAST, port)), wait).await
}

/// Send a probe to `target` (broadcast or unicast) and wait for an advert.
pub async fn discover_at(target: SocketAddr, wait: Duration) -> Result<SocketAddr, SpaceError> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
    socket.set_broadcast(true)?;
    socket.send_to(&serde_json::to_vec(&Probe::new())?, target).await?;

    let listen = async {
        let mut buf = [0u8; 1024];
        loop {
            let (len, from) = socket.recv_from(&mut buf).await?;
            let Ok(advert) = serde_json::from_slice::<Advert>(&buf[..len]) else {
                continue;
            };
            if advert.service != SERVICE_NAME {
                continue;
            }
            let addr = if advert.addr.ip().is_unspecified() {
                SocketAddr::new(from.ip(), advert.addr.port())
            } else {
                advert.addr
            };
            return Ok::<_, SpaceError>(addr);
        }
    };

    match tokio::time::timeout(wait, listen).await {
        Ok(result) => {
            let addr = result?;
            info!(%addr, "Discovered coordination space");
            Ok(addr)
        }
        Err(_) => Err(SpaceError::DiscoveryTimeout(wait)),
    }
}
