// src/connection/handler.rs

//! Defines the `ConnectionHandler` which manages the full lifecycle of one
//! served session.
//!
//! The session is a small state machine: await a command line, dispatch it,
//! write the framed response, repeat. It closes on `quitc`, on end-of-stream,
//! on an unrecoverable write failure, or on server shutdown. Handler
//! failures never close the session; they become a text line plus the
//! sentinel.

use crate::core::dispatch::Dispatcher;
use crate::core::protocol::{LineCommandCodec, Reply};
use crate::core::state::ServerState;
use crate::core::{Command, ServeError};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::broadcast;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

/// The next step for the session's main loop to take.
enum NextAction {
    Continue,
    ExitLoop,
}

/// Manages the full lifecycle of a served connection.
///
/// Generic over the byte stream so tests can drive it over an in-memory
/// duplex pipe instead of a TCP socket.
pub struct ConnectionHandler<S> {
    framed: Framed<S, LineCommandCodec>,
    addr: SocketAddr,
    session_id: u64,
    shutdown_rx: broadcast::Receiver<()>,
    dispatcher: Dispatcher,
}

impl<S: AsyncRead + AsyncWrite + Unpin + Send> ConnectionHandler<S> {
    pub fn new(
        socket: S,
        addr: SocketAddr,
        state: Arc<ServerState>,
        session_id: u64,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            framed: Framed::new(socket, LineCommandCodec::default()),
            addr,
            session_id,
            shutdown_rx,
            dispatcher: Dispatcher::new(state),
        }
    }

    /// The main event loop for the session.
    pub async fn run(&mut self) -> Result<(), ServeError> {
        loop {
            tokio::select! {
                // Prioritize the shutdown signal over pending input.
                biased;
                _ = self.shutdown_rx.recv() => {
                    info!("Session {} ({}) received shutdown signal.", self.session_id, self.addr);
                    return Ok(());
                }
                result = self.framed.next() => {
                    match result {
                        Some(Ok(line)) => {
                            match self.process_line(&line).await? {
                                NextAction::Continue => {}
                                NextAction::ExitLoop => return Ok(()),
                            }
                        }
                        Some(Err(e)) => {
                            if is_normal_disconnect(&e) {
                                debug!("Session {} ({}) closed by peer: {}", self.session_id, self.addr, e);
                            } else {
                                warn!("Session {} ({}) transport error: {}", self.session_id, self.addr, e);
                            }
                            return Ok(());
                        }
                        None => {
                            debug!("Session {} ({}) closed by peer.", self.session_id, self.addr);
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Parses one line, dispatches it, and writes the framed response.
    async fn process_line(&mut self, line: &str) -> Result<NextAction, ServeError> {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(e) => {
                // Validation failure: report and keep the session open.
                self.send_error(e).await?;
                return Ok(NextAction::Continue);
            }
        };
        debug!(
            "Session {}: received command '{}'",
            self.session_id,
            command.name()
        );

        // Quit closes the session with no response bytes written.
        if command == Command::Quit {
            info!(
                "Session {} ({}) requested to close the connection.",
                self.session_id, self.addr
            );
            return Ok(NextAction::ExitLoop);
        }

        match self.dispatcher.dispatch(&command).await {
            Ok(reply) => self.framed.send(reply).await?,
            Err(e) if e.is_session_fatal() => return Err(e),
            Err(e) => self.send_error(e).await?,
        }
        Ok(NextAction::Continue)
    }

    /// Reports a non-fatal failure as a normal framed body (one line plus
    /// the sentinel).
    async fn send_error(&mut self, e: ServeError) -> Result<(), ServeError> {
        debug!("Session {}: reporting error: {}", self.session_id, e);
        self.framed.send(Reply::line(e.to_string())).await
    }
}

/// Helper function to check for non-critical disconnection errors.
fn is_normal_disconnect(e: &ServeError) -> bool {
    matches!(e, ServeError::Io(arc_err) if matches!(
        arc_err.kind(),
        std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionAborted
    ))
}
