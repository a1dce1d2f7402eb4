// src/core/archive/mod.rs

//! The archive builder: three file-selection strategies and the shared
//! pack-job orchestration around the injected `PackagingService`.

mod packager;

pub use packager::{ArchiveHandle, PackagingService, TarPackager};

use crate::core::ServeError;
use crate::core::commands::DateDirection;
use chrono::{DateTime, NaiveDate, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use walkdir::WalkDir;

/// Fixed artifact names, one per strategy. Concurrent packs of the same kind
/// on the same account race on these; last writer wins (see DESIGN.md).
const EXT_ARTIFACT: &str = "ext.tar.gz";
const SIZE_ARTIFACT: &str = "size.tar.gz";
const DATE_ARTIFACT: &str = "date.tar.gz";

/// File-list manifest consumed by manifest-driven tar runs and left on disk.
const MANIFEST_NAME: &str = "filelist.txt";

/// One packaging request handed to a `PackagingService`.
#[derive(Debug, Clone)]
pub struct ArchiveJob {
    pub selection: Vec<PathBuf>,
    pub destination: PathBuf,
    /// When set, the selection is written here and the packager reads the
    /// list from this file instead of taking paths as arguments.
    pub manifest: Option<PathBuf>,
    /// Strip directory components from archive entry names.
    pub flatten: bool,
}

/// Builds archive artifacts inside the per-account working directory.
pub struct ArchiveBuilder {
    root: PathBuf,
    workdir: PathBuf,
    max_depth: usize,
    packager: Arc<dyn PackagingService>,
}

impl ArchiveBuilder {
    pub fn new(
        root: PathBuf,
        workdir: PathBuf,
        max_depth: usize,
        packager: Arc<dyn PackagingService>,
    ) -> Self {
        Self {
            root,
            workdir,
            max_depth,
            packager,
        }
    }

    /// Packs every file under the root whose extension matches one of the
    /// validated extensions. Entries are flattened. `Ok(None)` means the
    /// selection was empty and no packager run happened.
    pub async fn pack_by_extension(
        &self,
        extensions: &[String],
    ) -> Result<Option<ArchiveHandle>, ServeError> {
        self.run_job(EXT_ARTIFACT, false, true, |entry| {
            entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| extensions.iter().any(|wanted| wanted == ext))
        })
        .await
    }

    /// Packs files with size strictly inside `(min, max)`, both bounds
    /// exclusive.
    pub async fn pack_by_size(
        &self,
        min: u64,
        max: u64,
    ) -> Result<Option<ArchiveHandle>, ServeError> {
        self.run_job(SIZE_ARTIFACT, true, false, |entry| {
            entry
                .metadata()
                .map(|m| m.len() > min && m.len() < max)
                .unwrap_or(false)
        })
        .await
    }

    /// Packs files whose modification date (day granularity, UTC) is on or
    /// before (`Before`) / on or after (`After`) the cutoff date.
    ///
    /// `After` rejects a cutoff in the future before any walk or tooling.
    pub async fn pack_by_date(
        &self,
        cutoff: NaiveDate,
        direction: DateDirection,
    ) -> Result<Option<ArchiveHandle>, ServeError> {
        if direction == DateDirection::After && cutoff > Utc::now().date_naive() {
            return Err(ServeError::DateInFuture);
        }
        self.run_job(DATE_ARTIFACT, true, false, |entry| {
            let Ok(metadata) = entry.metadata() else {
                return false;
            };
            let Ok(modified) = metadata.modified() else {
                return false;
            };
            let file_date = DateTime::<Utc>::from(modified).date_naive();
            match direction {
                DateDirection::Before => file_date <= cutoff,
                DateDirection::After => file_date >= cutoff,
            }
        })
        .await
    }

    /// Walks the served tree collecting regular files that satisfy `keep`.
    /// The working directory itself (prior artifacts, manifests) is pruned.
    fn select(&self, keep: impl Fn(&walkdir::DirEntry) -> bool) -> Vec<PathBuf> {
        WalkDir::new(&self.root)
            .follow_links(false)
            .max_depth(self.max_depth)
            .into_iter()
            .filter_entry(|entry| entry.path() != self.workdir)
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file() && keep(entry))
            .map(|entry| entry.path().to_path_buf())
            .collect()
    }

    /// The shared orchestration: ensure the workdir, drop the stale artifact,
    /// compute the selection, hand it to the packager, report the handle.
    async fn run_job(
        &self,
        artifact_name: &str,
        with_manifest: bool,
        flatten: bool,
        keep: impl Fn(&walkdir::DirEntry) -> bool,
    ) -> Result<Option<ArchiveHandle>, ServeError> {
        self.ensure_workdir().await?;

        let destination = self.workdir.join(artifact_name);
        remove_stale(&destination).await?;

        let selection = self.select(keep);
        if selection.is_empty() {
            debug!("Empty selection for {artifact_name}; packager not invoked.");
            return Ok(None);
        }

        let job = ArchiveJob {
            selection,
            destination,
            manifest: with_manifest.then(|| self.workdir.join(MANIFEST_NAME)),
            flatten,
        };
        let handle = self.packager.create_archive(&job).await?;
        Ok(Some(handle))
    }

    /// Creates the per-account working directory lazily on first use.
    async fn ensure_workdir(&self) -> Result<(), ServeError> {
        tokio::fs::create_dir_all(&self.workdir).await.map_err(|e| {
            ServeError::Resource(format!("cannot create {}: {e}", self.workdir.display()))
        })
    }
}

/// Removes a prior artifact of the same kind. A missing file is fine; any
/// other failure is a resource error.
async fn remove_stale(path: &Path) -> Result<(), ServeError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ServeError::Resource(format!(
            "cannot remove stale {}: {e}",
            path.display()
        ))),
    }
}
