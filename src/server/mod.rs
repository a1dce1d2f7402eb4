// src/server/mod.rs

use crate::config::Config;
use anyhow::Result;

pub mod admission;
mod connection_loop;
pub mod context;
mod initialization;

pub use admission::{Admission, AdmissionGate, Verdict};
pub use context::ServerContext;

/// The main server startup function, orchestrating all setup phases.
pub async fn run(config: Config) -> Result<()> {
    // 1. Validate configuration, bind the listener, build shared state.
    let server_context = initialization::setup(config).await?;

    // 2. Start the main connection acceptance loop. Runs until shutdown.
    connection_loop::run(server_context).await;

    Ok(())
}

/// Runs the accept loop over an already-initialized context. Used by tests
/// that bind an ephemeral port and stop the loop via the shutdown channel.
pub async fn run_with_context(ctx: ServerContext) {
    connection_loop::run(ctx).await;
}
