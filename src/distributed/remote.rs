//! Client side of the space protocol, used by the bridge and by workers.

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LinesCodec};

use super::protocol::{Request, Response, TupleMessage, MAX_FRAME_LEN};
use crate::error::SpaceError;

pub struct SpaceClient {
    framed: Framed<TcpStream, LinesCodec>,
    addr: SocketAddr,
}

impl SpaceClient {
    pub async fn connect(addr: SocketAddr) -> Result<Self, SpaceError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self {
            framed: Framed::new(stream, LinesCodec::new_with_max_length(MAX_FRAME_LEN)),
            addr,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn write(&mut self, tuple: TupleMessage) -> Result<(), SpaceError> {
        match self.call(&Request::Write { tuple }).await? {
            Response::Ok => Ok(()),
            other => Self::unexpected(other, "write"),
        }
    }

    /// Take the oldest tuple, or `None` if nothing arrived within `timeout`.
    pub async fn take(&mut self, timeout: Duration) -> Result<Option<TupleMessage>, SpaceError> {
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        match self.call(&Request::Take { timeout_ms }).await? {
            Response::Tuple { tuple } => Ok(Some(tuple)),
            Response::Empty => Ok(None),
            other => Self::unexpected(other, "take"),
        }
    }

    pub async fn len(&mut self) -> Result<usize, SpaceError> {
        match self.call(&Request::Len).await? {
            Response::Len { len } => Ok(len),
            other => Self::unexpected(other, "len"),
        }
    }

    async fn call(&mut self, request: &Request) -> Result<Response, SpaceError> {
        self.framed.send(serde_json::to_string(request)?).await?;
        let line = self
            .framed
            .next()
            .await
            .ok_or(SpaceError::ConnectionClosed)??;
        Ok(serde_json::from_str(&line)?)
    }

    fn unexpected<T>(response: Response, op: &'static str) -> Result<T, SpaceError> {
        match response {
            Response::Error { message } => Err(SpaceError::Remote(message)),
            _ => Err(SpaceError::UnexpectedResponse(op)),
        }
    }
}
