//! Transient frame storage.
//!
//! Each run extracts its frames into a fresh directory created with the
//! tempfile crate and then detached from its `TempDir` guard. Removal is
//! done by a `StorageCleaner` once the worker pool has shut down.

use crate::config::TRANSIENT_DIR_PREFIX;
use crate::error::{CoreError, CoreResult};
use log::debug;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::Builder as TempFileBuilder;

/// Creates a uniquely named transient directory inside `base`, creating
/// `base` first if needed. The caller owns removal.
pub fn create_transient_dir(base: &Path) -> CoreResult<PathBuf> {
    std::fs::create_dir_all(base)?;
    let dir = TempFileBuilder::new()
        .prefix(TRANSIENT_DIR_PREFIX)
        .tempdir_in(base)?
        .keep();
    debug!("Created transient storage {}", dir.display());
    Ok(dir)
}

/// Removes a transient storage location and everything in it.
pub trait StorageCleaner {
    fn remove_all(&self, location: &Path) -> CoreResult<()>;
}

/// Filesystem cleaner. A location that no longer exists counts as removed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsCleaner;

impl StorageCleaner for FsCleaner {
    fn remove_all(&self, location: &Path) -> CoreResult<()> {
        match std::fs::remove_dir_all(location) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CoreError::Cleanup {
                path: location.to_path_buf(),
                source,
            }),
        }
    }
}

impl<T: StorageCleaner + ?Sized> StorageCleaner for &T {
    fn remove_all(&self, location: &Path) -> CoreResult<()> {
        (**self).remove_all(location)
    }
}
