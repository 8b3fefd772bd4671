//! TCP front end for the tuple store.

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{debug, info, warn, Instrument};

use super::protocol::{Request, Response, TupleMessage, MAX_FRAME_LEN, MAX_TAKE_TIMEOUT_MS};
use super::space::TupleSpace;
use crate::error::SpaceError;

pub struct SpaceServer {
    listener: TcpListener,
    space: Arc<TupleSpace>,
}

impl SpaceServer {
    pub async fn bind(addr: &str) -> Result<Self, SpaceError> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            space: Arc::new(TupleSpace::new()),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, SpaceError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn space(&self) -> Arc<TupleSpace> {
        Arc::clone(&self.space)
    }

    /// Accept peers forever. Each peer gets its own task.
    pub async fn run(self) -> Result<(), SpaceError> {
        info!(addr = %self.local_addr()?, "Coordination space listening");
        loop {
            let (stream, peer) = self.listener.accept().await?;
            let space = Arc::clone(&self.space);
            tokio::spawn(
                async move {
                    debug!("Peer connected");
                    match serve_peer(stream, space).await {
                        Ok(()) => debug!("Peer disconnected"),
                        Err(e) => warn!(error = %e, "Peer connection failed"),
                    }
                }
                .instrument(crate::telemetry::spans::space_peer(&peer)),
            );
        }
    }
}

async fn serve_peer(stream: TcpStream, space: Arc<TupleSpace>) -> Result<(), SpaceError> {
    let mut framed = Framed::new(stream, LinesCodec::new_with_max_length(MAX_FRAME_LEN));

    while let Some(line) = framed.next().await {
        let line = line?;
        let response = match serde_json::from_str::<Request>(&line) {
            Ok(Request::Take { timeout_ms }) => {
                let timeout = Duration::from_millis(timeout_ms.min(MAX_TAKE_TIMEOUT_MS));
                // A take only pops once it wins; a peer that goes away first
                // leaves the space untouched.
                tokio::select! {
                    taken = space.take(timeout) => take_response(taken),
                    frame = framed.next() => match frame {
                        Some(Ok(_)) => Response::Error {
                            message: "request sent while a take was pending".to_string(),
                        },
                        Some(Err(e)) => return Err(e.into()),
                        None => {
                            debug!("Peer left during take");
                            return Ok(());
                        }
                    },
                }
            }
            Ok(request) => handle_request(&space, request),
            Err(e) => Response::Error {
                message: format!("malformed request: {e}"),
            },
        };

        let encoded = serde_json::to_string(&response)?;
        if let Err(e) = framed.send(encoded).await {
            if let Response::Tuple { tuple } = response {
                warn!(id = %tuple.id, "Taker unreachable, tuple restored");
                space.restore(tuple);
            }
            return Err(e.into());
        }
    }

    Ok(())
}

fn take_response(taken: Option<TupleMessage>) -> Response {
    match taken {
        Some(tuple) => {
            debug!(event = %tuple.event, id = %tuple.id, "Tuple taken");
            Response::Tuple { tuple }
        }
        None => Response::Empty,
    }
}

fn handle_request(space: &TupleSpace, request: Request) -> Response {
    match request {
        Request::Write { tuple } => {
            debug!(event = %tuple.event, id = %tuple.id, "Tuple written");
            space.write(tuple);
            Response::Ok
        }
        Request::Take { .. } => take_response(space.try_take()),
        Request::Len => Response::Len { len: space.len() },
    }
}
