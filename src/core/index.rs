// src/core/index.rs

//! File index operations: directory listing and recursive file lookup over
//! the served root.

use crate::core::ServeError;
use crate::core::commands::ListOrder;
use chrono::{DateTime, Local};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// Timestamp format used in all client-visible output.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One immediate subdirectory of the served root.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub name: String,
    pub modified: SystemTime,
}

/// Metadata for one file found by a recursive lookup.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub full_path: PathBuf,
    pub size_bytes: u64,
    pub modified: SystemTime,
    /// Permission bits, `mode & 0o7777`.
    pub permission_bits: u32,
}

/// Formats a modification time for client output, in local time.
pub fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

/// Enumerates the immediate subdirectories of `root` (non-recursive) and
/// sorts them per `order`.
///
/// Alphabetical order is case-insensitive and stable for equal keys;
/// recency order is strictly descending by modification time.
pub fn list_directories(root: &Path, order: ListOrder) -> Result<Vec<DirectoryEntry>, ServeError> {
    let read_dir = fs::read_dir(root)
        .map_err(|e| ServeError::Resource(format!("cannot open {}: {e}", root.display())))?;

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = entry
            .map_err(|e| ServeError::Resource(format!("cannot read {}: {e}", root.display())))?;
        let Ok(metadata) = entry.metadata() else {
            // An entry that vanished mid-listing is skipped, not fatal.
            continue;
        };
        if !metadata.is_dir() {
            continue;
        }
        entries.push(DirectoryEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        });
    }

    match order {
        // `sort_by` is stable, so entries that compare equal keep their
        // enumeration order.
        ListOrder::Alphabetical => {
            entries.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        }
        ListOrder::RecencyDescending => {
            entries.sort_by(|a, b| b.modified.cmp(&a.modified));
        }
    }
    Ok(entries)
}

/// Renders a listing as response lines. Recency listings carry the
/// formatted modification time before the name.
pub fn render_listing(entries: &[DirectoryEntry], order: ListOrder) -> Vec<String> {
    entries
        .iter()
        .map(|entry| match order {
            ListOrder::Alphabetical => entry.name.clone(),
            ListOrder::RecencyDescending => {
                format!("{} - {}", format_timestamp(entry.modified), entry.name)
            }
        })
        .collect()
}

/// Searches the tree under `root` (bounded to `max_depth`) for a file whose
/// basename equals `name`, returning the first match in traversal order.
///
/// First-match semantics are deliberate: when several files share a basename,
/// whichever the walk reaches first wins and the rest are never examined.
/// See DESIGN.md.
pub fn find_file(root: &Path, name: &str, max_depth: usize) -> Option<FileRecord> {
    for entry in WalkDir::new(root)
        .follow_links(false)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy() == name {
            let metadata = entry.metadata().ok()?;
            return Some(FileRecord {
                full_path: entry.path().to_path_buf(),
                size_bytes: metadata.len(),
                modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                permission_bits: metadata.permissions().mode() & 0o7777,
            });
        }
    }
    None
}

impl FileRecord {
    /// Renders the record as the `w24fn` response body.
    pub fn render(&self) -> Vec<String> {
        vec![
            format!("Filename: {}", self.full_path.display()),
            format!("Size: {} bytes", self.size_bytes),
            format!("Date modified: {}", format_timestamp(self.modified)),
            format!("Permissions: {:o}", self.permission_bits),
        ]
    }
}
