// src/core/dispatch.rs

//! Routes a parsed `Command` to the file index or the archive builder and
//! shapes the result into a framed `Reply`.

use crate::core::archive::ArchiveHandle;
use crate::core::commands::{Command, ListOrder};
use crate::core::protocol::Reply;
use crate::core::state::ServerState;
use crate::core::{ServeError, index};
use std::sync::Arc;
use tracing::debug;

/// Body line for an empty pack selection; distinct from a tooling failure.
const NO_FILE_FOUND: &str = "No file found";

pub struct Dispatcher {
    state: Arc<ServerState>,
}

impl Dispatcher {
    pub fn new(state: Arc<ServerState>) -> Self {
        Self { state }
    }

    /// Executes one command. Handler failures come back as `Err` and are
    /// turned into a text line by the session; they never close the
    /// connection.
    pub async fn dispatch(&self, command: &Command) -> Result<Reply, ServeError> {
        debug!("Dispatching command '{}'", command.name());
        match command {
            Command::ListDir { order } => self.list_dir(*order),
            Command::FileInfo { name } => self.file_info(name),
            Command::PackByExtension { extensions } => {
                let outcome = self
                    .state
                    .archive_builder()
                    .pack_by_extension(extensions)
                    .await?;
                Ok(render_pack_outcome(outcome))
            }
            Command::PackBySize { min, max } => {
                let outcome = self.state.archive_builder().pack_by_size(*min, *max).await?;
                Ok(render_pack_outcome(outcome))
            }
            Command::PackByDate { cutoff, direction } => {
                let outcome = self
                    .state
                    .archive_builder()
                    .pack_by_date(*cutoff, *direction)
                    .await?;
                Ok(render_pack_outcome(outcome))
            }
            Command::Invalid { raw } => Err(ServeError::UnknownCommand(raw.clone())),
            // Quit is intercepted by the session handler before dispatch.
            Command::Quit => Ok(Reply::Body(Vec::new())),
        }
    }

    fn list_dir(&self, order: ListOrder) -> Result<Reply, ServeError> {
        let entries = index::list_directories(&self.state.config.served_root, order)?;
        Ok(Reply::Body(index::render_listing(&entries, order)))
    }

    fn file_info(&self, name: &str) -> Result<Reply, ServeError> {
        let record = index::find_file(
            &self.state.config.served_root,
            name,
            self.state.config.max_walk_depth,
        );
        match record {
            Some(record) => Ok(Reply::Body(record.render())),
            None => Ok(Reply::line("File not found")),
        }
    }
}

fn render_pack_outcome(outcome: Option<ArchiveHandle>) -> Reply {
    match outcome {
        Some(handle) => Reply::Body(vec![
            format!("Archive created: {}", handle.path.display()),
            format!("Size: {} bytes", handle.size_bytes),
        ]),
        None => Reply::line(NO_FILE_FOUND),
    }
}
