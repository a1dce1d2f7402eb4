// src/core/archive/packager.rs

//! The external packaging capability, modeled as an injected trait so the
//! selection and protocol logic stay host-tool-agnostic and testable.

use crate::core::ServeError;
use crate::core::archive::ArchiveJob;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

/// A successfully produced archive artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveHandle {
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Creates one archive artifact from a computed file selection.
///
/// Implementations are synchronous from the session's point of view: a slow
/// or hung run stalls that one session only, with no timeout.
#[async_trait]
pub trait PackagingService: Send + Sync {
    async fn create_archive(&self, job: &ArchiveJob) -> Result<ArchiveHandle, ServeError>;
}

/// The default `PackagingService`: shells out to `tar -czf`.
#[derive(Debug, Default)]
pub struct TarPackager;

#[async_trait]
impl PackagingService for TarPackager {
    async fn create_archive(&self, job: &ArchiveJob) -> Result<ArchiveHandle, ServeError> {
        let mut command = Command::new("tar");
        command.arg("-czf").arg(&job.destination);
        if job.flatten {
            // Strip directory components from entry names. Basename
            // collisions overwrite within the archive; accepted behavior.
            command.arg("--transform=s,.*/,,");
        }

        if let Some(manifest) = &job.manifest {
            let mut listing = job
                .selection
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("\n");
            listing.push('\n');
            tokio::fs::write(manifest, listing).await.map_err(|e| {
                ServeError::Resource(format!("cannot write {}: {e}", manifest.display()))
            })?;
            command.arg("-T").arg(manifest);
        } else {
            command.args(&job.selection);
        }

        debug!("Invoking packager: {:?}", command);
        let output = command
            .output()
            .await
            .map_err(|e| ServeError::Tooling(format!("failed to spawn tar: {e}")))?;

        if !output.status.success() {
            // tar exits 1 for warnings it could recover from (e.g. a file
            // changed mid-read); anything it reports as fatal comes back 2.
            let stderr = String::from_utf8_lossy(&output.stderr);
            remove_unclaimed(&job.destination).await;
            return Err(ServeError::Tooling(format!(
                "tar exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let metadata = tokio::fs::metadata(&job.destination)
            .await
            .map_err(|_| ServeError::Tooling("archive was not produced".to_string()))?;
        if metadata.len() == 0 {
            remove_unclaimed(&job.destination).await;
            return Err(ServeError::Tooling("archive is empty".to_string()));
        }

        Ok(ArchiveHandle {
            path: job.destination.clone(),
            size_bytes: metadata.len(),
        })
    }
}

/// Removes an artifact the builder will not claim. Failure to remove is
/// ignored; the next job of the same kind overwrites it anyway.
async fn remove_unclaimed(path: &std::path::Path) {
    let _ = tokio::fs::remove_file(path).await;
}
