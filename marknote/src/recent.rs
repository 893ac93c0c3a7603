//! Most-recently-opened notes

use std::fs;
use std::path::{Path, PathBuf};

/// Maximum number of entries kept
pub const MAX_RECENT_FILES: usize = 10;

/// Recently opened notes, newest first, without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentFiles {
    files: Vec<PathBuf>,
}

impl RecentFiles {
    /// Build from a stored list, dropping duplicates and overflow
    pub fn new(stored: Vec<PathBuf>) -> Self {
        let mut files: Vec<PathBuf> = Vec::with_capacity(stored.len().min(MAX_RECENT_FILES));
        for path in stored {
            if !path.as_os_str().is_empty() && !files.contains(&path) {
                files.push(path);
            }
        }
        files.truncate(MAX_RECENT_FILES);
        Self { files }
    }

    /// Record `path` as the most recent entry.
    ///
    /// The path is canonicalized when possible so the same note opened via
    /// different relative paths is stored once. Empty paths are ignored.
    pub fn add(&mut self, path: &Path) {
        if path.as_os_str().is_empty() {
            return;
        }
        let normalized = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

        self.files.retain(|p| p != &normalized);
        self.files.insert(0, normalized);
        self.files.truncate(MAX_RECENT_FILES);
    }

    /// Drop entries whose files no longer exist
    pub fn prune_missing(&mut self) -> usize {
        let before = self.files.len();
        self.files.retain(|p| p.is_file());
        let removed = before - self.files.len();
        if removed > 0 {
            log::info!("Removed {} missing file(s) from recent list", removed);
        }
        removed
    }

    /// Entries, newest first
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn into_vec(self) -> Vec<PathBuf> {
        self.files
    }
}
