// src/core/state.rs

//! The shared, immutable server state handed to every session.

use crate::config::Config;
use crate::core::archive::{ArchiveBuilder, PackagingService, TarPackager};
use std::path::PathBuf;
use std::sync::Arc;

/// Read-only state shared between the accept loop and session tasks.
///
/// Sessions share nothing mutable with each other or with the accept loop;
/// this snapshot (and the filesystem itself) is all they see. The admission
/// counter deliberately lives elsewhere and is never reachable from here.
pub struct ServerState {
    pub config: Config,
    pub packager: Arc<dyn PackagingService>,
}

impl ServerState {
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            config,
            packager: Arc::new(TarPackager),
        })
    }

    /// Like `new`, with the packaging capability replaced. Used by tests to
    /// avoid invoking a real external tool.
    pub fn with_packager(config: Config, packager: Arc<dyn PackagingService>) -> Arc<Self> {
        Arc::new(Self { config, packager })
    }

    /// The per-account working directory for archive artifacts.
    pub fn workdir(&self) -> PathBuf {
        self.config.served_root.join(&self.config.workdir_name)
    }

    /// Builds an `ArchiveBuilder` over this state's root and packager.
    pub fn archive_builder(&self) -> ArchiveBuilder {
        ArchiveBuilder::new(
            self.config.served_root.clone(),
            self.workdir(),
            self.config.max_walk_depth,
            self.packager.clone(),
        )
    }
}
