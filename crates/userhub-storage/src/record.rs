//! Whole-file reads and writes under an exclusive lock.

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::time::Duration;

use tracing::debug;

use userhub_core::error::{AppError, ErrorKind};
use userhub_core::result::AppResult;

use crate::lock::{StorageLock, StorageLockGuard};

/// An existing file held under its exclusive lock, so that a read and the
/// following write happen without any other handle in between.
///
/// The lock is released when this value is dropped.
#[derive(Debug)]
pub struct LockedFile {
    lock: StorageLock,
    _guard: StorageLockGuard,
}

impl LockedFile {
    /// Opens the existing file at `path` and waits at most `timeout` for its
    /// lock. Fails when the file is missing or got unlinked while waiting.
    pub fn open(path: &Path, timeout: Duration) -> AppResult<Self> {
        let lock = StorageLock::open_existing(path)?;
        let guard = lock.lock(timeout)?;
        if !path.is_file() {
            return Err(AppError::internal(format!(
                "{} was removed while waiting for its lock",
                path.display()
            )));
        }
        Ok(Self {
            lock,
            _guard: guard,
        })
    }

    /// Path of the held file.
    fn path(&self) -> &Path {
        self.lock.path()
    }

    /// Reads the whole file.
    pub fn read(&self) -> AppResult<String> {
        read_all(self.lock.file(), self.path())
    }

    /// Replaces the whole file with `contents` and syncs it to disk.
    pub fn replace(&self, contents: &str) -> AppResult<()> {
        replace_all(self.lock.file(), self.path(), contents)
    }
}

/// Reads the whole file at `path` while holding its exclusive lock.
pub fn read_locked(path: &Path, timeout: Duration) -> AppResult<String> {
    LockedFile::open(path, timeout)?.read()
}

/// Replaces the contents of the file at `path` while holding its exclusive
/// lock. The file and its parent directories are created when missing.
pub fn write_locked(path: &Path, contents: &str, timeout: Duration) -> AppResult<()> {
    let lock = StorageLock::open(path)?;
    let _guard = lock.lock(timeout)?;
    replace_all(lock.file(), path, contents)
}

fn read_all(mut file: &File, path: &Path) -> AppResult<String> {
    let read_err = |e: std::io::Error| {
        AppError::with_source(
            ErrorKind::Internal,
            format!("Failed to read {}", path.display()),
            e,
        )
    };

    let mut contents = String::new();
    file.seek(SeekFrom::Start(0)).map_err(read_err)?;
    file.read_to_string(&mut contents).map_err(read_err)?;

    debug!(path = %path.display(), bytes = contents.len(), "Read locked file");
    Ok(contents)
}

fn replace_all(mut file: &File, path: &Path, contents: &str) -> AppResult<()> {
    let write_err = |e: std::io::Error| {
        AppError::with_source(
            ErrorKind::Internal,
            format!("Failed to write {}", path.display()),
            e,
        )
    };

    file.set_len(0).map_err(write_err)?;
    file.seek(SeekFrom::Start(0)).map_err(write_err)?;
    file.write_all(contents.as_bytes()).map_err(write_err)?;
    file.sync_all().map_err(write_err)?;

    debug!(path = %path.display(), bytes = contents.len(), "Wrote locked file");
    Ok(())
}

/// Recursively removes `dir` and everything below it.
pub fn remove_tree(dir: &Path) -> AppResult<()> {
    fs::remove_dir_all(dir).map_err(|e| {
        AppError::with_source(
            ErrorKind::Internal,
            format!("Failed to remove {}", dir.display()),
            e,
        )
    })?;
    debug!(path = %dir.display(), "Removed directory tree");
    Ok(())
}
