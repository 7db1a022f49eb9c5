//! Temporary audio files: the host's temp directory and the list of
//! files waiting to be deleted.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, error};

/// Temp directory shared with the host. Created on first use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmpDir {
    path: PathBuf,
}

impl TmpDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `./tmp`, the directory the host uses for outgoing media.
    pub fn host_default() -> Self {
        Self::new("tmp")
    }

    /// Directory path, creating it if needed.
    pub fn path(&self) -> io::Result<&Path> {
        fs::create_dir_all(&self.path)?;
        Ok(&self.path)
    }
}

/// Files produced by the plugin and owned by it until [`PendingFiles::cleanup`].
#[derive(Debug, Default)]
pub struct PendingFiles {
    paths: Mutex<Vec<PathBuf>>,
}

impl PendingFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, path: PathBuf) {
        self.lock().push(path);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.lock().clone()
    }

    /// Delete every tracked file that still exists and forget all of them.
    ///
    /// Failed deletions are logged and dropped from the list, not retried.
    /// Returns the number of files removed.
    pub fn cleanup(&self) -> usize {
        let paths = std::mem::take(&mut *self.lock());
        let mut removed = 0;
        for path in paths.iter().filter(|p| p.exists()) {
            match fs::remove_file(path) {
                Ok(()) => {
                    removed += 1;
                    debug!("Removed temp file {}", path.display());
                }
                Err(e) => error!("Failed to remove temp file {}: {e}", path.display()),
            }
        }
        removed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PathBuf>> {
        // Push and take never leave the list half-updated, so a poisoned lock is still usable.
        self.paths.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
