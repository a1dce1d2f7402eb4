// src/core/mod.rs

pub mod archive;
pub mod commands;
pub mod dispatch;
pub mod errors;
pub mod index;
pub mod protocol;
pub mod state;

// Re-export the types the rest of the crate names constantly.
pub use commands::Command;
pub use errors::ServeError;
