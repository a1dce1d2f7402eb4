// src/connection/mod.rs

//! Manages the lifecycle of a single client connection: command parsing,
//! dispatch, and response framing.

mod handler;

pub use handler::ConnectionHandler;
