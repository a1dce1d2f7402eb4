// src/server/connection_loop.rs

//! Contains the main server loop: admission decisions, worker spawning and
//! reaping, and graceful shutdown.

use super::admission::{AdmissionGate, Verdict};
use super::context::ServerContext;
use crate::connection::ConnectionHandler;
use anyhow::anyhow;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::signal::unix::{SignalKind, signal};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// The main server loop that accepts connections and handles graceful
/// shutdown.
///
/// Admission is strictly sequential: the gate is owned by this loop alone
/// and decided before any byte is read from the new connection. Served
/// connections run as isolated tasks sharing only the read-only
/// `ServerState`; finished tasks are reaped without ever blocking accept.
pub async fn run(ctx: ServerContext) {
    let mut gate = AdmissionGate::new(
        ctx.state.config.port,
        ctx.state.config.mirror_a_port,
        ctx.state.config.mirror_b_port,
    );
    let mut client_tasks = JoinSet::new();
    let mut external_shutdown_rx = ctx.shutdown_tx.subscribe();

    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow!("Failed to register SIGINT handler: {}", e))
        .expect("Failed to create SIGINT stream");
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow!("Failed to register SIGTERM handler: {}", e))
        .expect("Failed to create SIGTERM stream");

    loop {
        tokio::select! {
            biased;

            _ = sigint.recv() => {
                info!("SIGINT received, initiating graceful shutdown.");
                break;
            }
            _ = sigterm.recv() => {
                info!("SIGTERM received, initiating graceful shutdown.");
                break;
            }
            _ = external_shutdown_rx.recv() => {
                info!("Shutdown requested, initiating graceful shutdown.");
                break;
            }

            res = ctx.listener.accept() => {
                if let Ok((socket, addr)) = res {
                    let admission = gate.admit();
                    match admission.verdict {
                        Verdict::Redirect(port) => {
                            info!(
                                "Connection {} from {}: redirecting to port {}.",
                                admission.counter, addr, port
                            );
                            // Not a session: write one line and close. Runs
                            // as a task so a slow peer cannot stall accept.
                            client_tasks.spawn(redirect_and_close(socket, port));
                        }
                        Verdict::ServeLocally => {
                            info!(
                                "Connection {} from {}: serving locally.",
                                admission.counter, addr
                            );
                            let state = ctx.state.clone();
                            let shutdown_rx = ctx.shutdown_tx.subscribe();
                            let session_id = admission.counter;
                            client_tasks.spawn(async move {
                                let mut handler = ConnectionHandler::new(
                                    socket, addr, state, session_id, shutdown_rx,
                                );
                                if let Err(e) = handler.run().await {
                                    warn!("Session {} from {} terminated unexpectedly: {}", session_id, addr, e);
                                }
                            });
                        }
                    }
                } else if let Err(e) = res {
                    error!("Failed to accept connection: {}", e);
                }
            },

            Some(res) = client_tasks.join_next() => {
                if let Err(e) = res {
                    if e.is_panic() {
                        error!("A client handler panicked: {e:?}");
                    }
                }
            },
        }
    }

    info!("Shutting down. Sending signal to all sessions.");
    if ctx.shutdown_tx.send(()).is_err() {
        // No live receivers means no sessions to notify.
        info!("No active sessions to notify.");
    }

    client_tasks.shutdown().await;
    info!(
        "All client connections closed. {} connections admitted this run.",
        gate.connections_seen()
    );
    info!("Server shutdown complete.");
}

/// Writes the redirect line and closes the connection. The peer is expected
/// to reconnect to `<port>` and resend its command verbatim.
async fn redirect_and_close(mut socket: TcpStream, port: u16) {
    let message = format!("redirect {port}\n");
    if let Err(e) = socket.write_all(message.as_bytes()).await {
        warn!("Failed to write redirect line: {}", e);
    }
    let _ = socket.shutdown().await;
}
