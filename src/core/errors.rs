// src/core/errors.rs

//! Defines the primary error type for the entire application.

use std::sync::Arc;
use thiserror::Error;

/// The main error enum, representing all possible failures within the server.
///
/// The `Display` strings of the non-IO variants are the exact lines reported
/// to clients, so changing them is a protocol change.
#[derive(Error, Debug, Clone)]
pub enum ServeError {
    #[error("IO Error: {0}")]
    Io(Arc<std::io::Error>),

    // --- Protocol errors: the command line itself was not recognized. ---
    #[error("Unsupported operation")]
    UnknownCommand(String),

    // --- Validation errors: recognized command, bad arguments. ---
    #[error("Missing filename")]
    MissingFilename,

    #[error("No extensions given")]
    NoExtensions,

    #[error("Too many extensions (at most 3)")]
    TooManyExtensions,

    #[error("Duplicate extension '{0}'")]
    DuplicateExtension(String),

    #[error("Invalid size range")]
    InvalidSizeRange,

    #[error("Too many arguments")]
    TooManyArguments,

    #[error("Invalid date format '{0}' (expected YYYY-MM-DD)")]
    InvalidDateFormat(String),

    #[error("Date is in the future")]
    DateInFuture,

    // --- Resource errors: the filesystem refused us. ---
    #[error("Resource error: {0}")]
    Resource(String),

    // --- Tooling errors: the external packaging run failed. ---
    #[error("Packaging failed: {0}")]
    Tooling(String),
}

impl From<std::io::Error> for ServeError {
    fn from(err: std::io::Error) -> Self {
        ServeError::Io(Arc::new(err))
    }
}

impl ServeError {
    /// True for errors that terminate the session. Everything else is
    /// reported to the client as a text line and the connection stays open.
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, ServeError::Io(_))
    }
}
