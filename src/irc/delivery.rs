//! Delivery engine.
//!
//! Connects to the IRC server and drives a [`DeliverySession`] over a framed
//! socket. The session runs on its own task, raced against a deadline timer;
//! when the timer wins the task is aborted, which drops the socket and stops
//! any further writes.

use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tokio_util::codec::Framed;
use tracing::{Instrument, debug, info, warn};

use super::codec::IrcCodec;
use super::message::Message;
use super::session::{DeliverySession, DeliveryState, Identity, Step};
use crate::config::IrcConfig;
use crate::error::{RelayError, RelayResult};
use crate::route::Destination;
use crate::telemetry::spans;

/// One-shot IRC delivery with connect timeout and overall deadline.
#[derive(Debug, Clone)]
pub struct DeliveryEngine {
    deadline: Duration,
    connect_timeout: Duration,
}

impl DeliveryEngine {
    pub fn new(config: &IrcConfig) -> Self {
        Self {
            deadline: config.deadline(),
            connect_timeout: config.connect_timeout(),
        }
    }

    pub fn with_timeouts(deadline: Duration, connect_timeout: Duration) -> Self {
        Self {
            deadline,
            connect_timeout,
        }
    }

    /// Open the TCP connection to `server` (`host:port`).
    pub async fn connect(&self, server: &str) -> RelayResult<TcpStream> {
        match timeout(self.connect_timeout, TcpStream::connect(server)).await {
            Ok(Ok(stream)) => {
                debug!(server = %server, "Connected");
                Ok(stream)
            }
            Ok(Err(e)) => {
                warn!(server = %server, error = %e, "Connect failed");
                Err(RelayError::ConnectFailed(e.to_string()))
            }
            Err(_) => {
                warn!(server = %server, timeout = ?self.connect_timeout, "Connect timed out");
                Err(RelayError::ConnectFailed("connect timed out".into()))
            }
        }
    }

    /// Connect and deliver `message` to `destination`.
    pub async fn send(
        &self,
        identity: Identity,
        destination: &Destination,
        message: &str,
    ) -> RelayResult<DeliveryState> {
        let stream = self.connect(&destination.server).await?;
        let session = DeliverySession::new(identity, destination.clone(), message);
        self.deliver(stream, session).await
    }

    /// Drive `session` over `stream` until it finishes, fails, or the deadline passes.
    pub async fn deliver(
        &self,
        stream: TcpStream,
        session: DeliverySession,
    ) -> RelayResult<DeliveryState> {
        let span = spans::delivery(session.nick(), session.lines().len());
        let mut task = tokio::spawn(run_session(stream, session).instrument(span));

        tokio::select! {
            joined = &mut task => match joined {
                Ok(result) => result,
                Err(e) => Err(RelayError::IrcProtocolError(format!("delivery task failed: {}", e))),
            },
            _ = sleep(self.deadline) => {
                task.abort();
                warn!(deadline = ?self.deadline, state = ?DeliveryState::TimedOut, "Delivery deadline exceeded");
                Err(RelayError::DeliveryTimeout)
            }
        }
    }
}

async fn run_session(stream: TcpStream, mut session: DeliverySession) -> RelayResult<DeliveryState> {
    let mut framed = Framed::new(stream, IrcCodec::new());

    write_all(&mut framed, session.greeting()).await?;

    while let Some(item) = framed.next().await {
        let msg = match item {
            Ok(msg) => msg,
            Err(e) => return Err(session.fail(e.to_string())),
        };

        match session.step(&msg)? {
            Step::Continue(out) => {
                write_all(&mut framed, out).await?;
            }
            Step::Finish(out) => {
                write_all(&mut framed, out).await?;
                if let Err(e) = framed.close().await {
                    // Everything was flushed; a failed shutdown does not undo delivery.
                    debug!(error = %e, "Shutdown after delivery failed");
                }
                session.close();
                info!(state = ?session.state(), "Delivery complete");
                return Ok(session.state());
            }
        }
    }

    let state = session.state();
    Err(session.fail(format!("connection closed while {:?}", state)))
}

async fn write_all(
    framed: &mut Framed<TcpStream, IrcCodec>,
    messages: Vec<Message>,
) -> RelayResult<()> {
    if messages.is_empty() {
        return Ok(());
    }
    for msg in messages {
        framed.feed(msg).await?;
    }
    framed.flush().await?;
    Ok(())
}
