//! Exclusive ownership of a data directory
//!
//! Each `Database` keeps its own copy of the tables in memory, so two
//! handles on one data_dir would overwrite each other's commits. Opening a
//! durable store therefore creates `LOCK` with `create_new`, which fails if
//! any other handle (in this process or another) already holds the dir. The
//! file records the owner's pid and is removed when the handle drops.
//!
//! A process that dies without unwinding leaves `LOCK` behind; it must be
//! removed by hand once no server or CLI is using the dir.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::errors::{StoreError, StoreResult};

/// File name of the lock inside the data directory
pub const LOCK_FILE: &str = "LOCK";

/// Path of the lock inside `data_dir`
pub fn lock_path(data_dir: &Path) -> PathBuf {
    data_dir.join(LOCK_FILE)
}

/// Held for the lifetime of a durable `Database`
#[derive(Debug)]
pub struct DirLock {
    path: PathBuf,
}

impl DirLock {
    /// Take the lock on `data_dir`, failing with `Unavailable` if it is held
    pub fn acquire(data_dir: &Path) -> StoreResult<Self> {
        let path = lock_path(data_dir);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let owner = fs::read_to_string(&path).unwrap_or_default();
                return Err(StoreError::Unavailable(format!(
                    "data_dir {} is locked by another handle (pid {}); remove {} if no process owns it",
                    data_dir.display(),
                    owner.trim(),
                    path.display()
                )));
            }
            Err(e) => return Err(StoreError::io_at(&path, e)),
        };

        let lock = Self { path };
        file.write_all(std::process::id().to_string().as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| StoreError::io_at(&lock.path, e))?;
        Ok(lock)
    }
}

impl Drop for DirLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_second_acquire_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let _held = DirLock::acquire(dir.path()).unwrap();
        assert!(lock_path(dir.path()).exists());

        let err = DirLock::acquire(dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(err.to_string().contains(&std::process::id().to_string()));
    }

    #[test]
    fn test_drop_releases_lock() {
        let dir = TempDir::new().unwrap();
        let held = DirLock::acquire(dir.path()).unwrap();
        drop(held);

        assert!(!lock_path(dir.path()).exists());
        assert!(DirLock::acquire(dir.path()).is_ok());
    }
}
