//! Single-run lock.
//!
//! Two concurrent updates against one target can interleave their sync and
//! invalidate calls. An exclusive advisory lock on the deployment record file
//! itself prevents that for runs on the same machine; it is released when the
//! guard drops.

use std::fs::File;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::LockError;

/// Held for the lifetime of a pipeline run.
#[derive(Debug)]
pub struct RunLock {
    file: File,
    path: PathBuf,
}

impl RunLock {
    /// Try to take the lock without blocking.
    pub fn acquire(path: &Path) -> Result<Self, LockError> {
        let file = File::open(path).map_err(|source| LockError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        // Trait-qualified: std's inherent File locking methods win over fs2's.
        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => {
                tracing::debug!("acquired run lock on {}", path.display());
                Ok(Self {
                    file,
                    path: path.to_path_buf(),
                })
            }
            Err(err) if err.kind() == fs2::lock_contended_error().kind() => Err(LockError::Held {
                path: path.to_path_buf(),
            }),
            Err(source) => Err(LockError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("deployment-info.json");
        std::fs::write(&path, "{}").unwrap();
        path
    }

    #[test]
    fn second_acquire_is_refused_while_held() {
        let dir = TempDir::new().unwrap();
        let path = record(&dir);
        let first = RunLock::acquire(&path).expect("first lock");
        let err = RunLock::acquire(&path).unwrap_err();
        assert!(matches!(err, LockError::Held { .. }), "got {err:?}");
        drop(first);
    }

    #[test]
    fn lock_is_released_on_drop() {
        let dir = TempDir::new().unwrap();
        let path = record(&dir);
        drop(RunLock::acquire(&path).expect("first lock"));
        let again = RunLock::acquire(&path).expect("relock");
        assert_eq!(again.path(), path.as_path());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = RunLock::acquire(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, LockError::Io { .. }));
    }
}
