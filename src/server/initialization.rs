// src/server/initialization.rs

//! Handles server initialization: configuration validation, state setup, and
//! binding the listener.

use super::context::ServerContext;
use crate::config::Config;
use crate::core::state::ServerState;
use anyhow::{Context, Result, anyhow};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::info;

/// Initializes all server components before starting the main loop.
pub async fn setup(config: Config) -> Result<ServerContext> {
    config.validate()?;
    log_startup_info(&config);

    if !config.served_root.is_dir() {
        return Err(anyhow!(
            "served root '{}' is not a directory",
            config.served_root.display()
        ));
    }

    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to bind to {}:{}", config.host, config.port))?;
    info!("Listening on {}", listener.local_addr()?);

    let state = ServerState::new(config);
    let (shutdown_tx, _) = broadcast::channel(1);

    Ok(ServerContext {
        state,
        listener,
        shutdown_tx,
    })
}

fn log_startup_info(config: &Config) {
    info!("homeserve version {}", env!("CARGO_PKG_VERSION"));
    info!(
        "Serving '{}' on port {} (mirrors: {}, {})",
        config.served_root.display(),
        config.port,
        config.mirror_a_port,
        config.mirror_b_port
    );
    info!(
        "Admission policy: counters 1-3 local, 4-6 mirror A, 7-9 mirror B, \
         10+ round-robin. The policy is static; mirror liveness is not checked."
    );
}
