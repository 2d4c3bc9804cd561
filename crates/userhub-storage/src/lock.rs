//! Exclusive file lock used to serialize access to a single record file.
//!
//! The lock is advisory (`flock` on Unix, `LockFileEx` on Windows) and is
//! held for the lifetime of a [`StorageLockGuard`]. Separate handles on the
//! same path exclude each other, both across threads and across processes.

use std::fs::{self, File, OpenOptions, TryLockError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use userhub_core::error::{AppError, ErrorKind};
use userhub_core::result::AppResult;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A file-backed lock that serializes mutations of one file.
#[derive(Debug, Clone)]
pub struct StorageLock {
    file: Arc<File>,
    path: PathBuf,
}

/// Guard that holds an exclusive lock for its lifetime.
#[derive(Debug)]
pub struct StorageLockGuard {
    file: Arc<File>,
}

impl StorageLock {
    /// Opens or creates the file at `path` for locking.
    ///
    /// Parent directories are created as needed.
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::with_source(
                    ErrorKind::Internal,
                    format!("Failed to create directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| map_open_err(path, e))?;
        Ok(Self::from_file(file, path))
    }

    /// Opens an existing file for reading, writing and locking. Fails if the
    /// file or its parent is missing instead of creating them.
    pub fn open_existing(path: &Path) -> AppResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| map_open_err(path, e))?;
        Ok(Self::from_file(file, path))
    }

    fn from_file(file: File, path: &Path) -> Self {
        Self {
            file: Arc::new(file),
            path: path.to_path_buf(),
        }
    }

    /// The locked file handle.
    pub fn file(&self) -> &File {
        &self.file
    }

    /// Path of the locked file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquires the exclusive lock, waiting at most `timeout`. Fails with an
    /// internal error once the deadline passes.
    pub fn lock(&self, timeout: Duration) -> AppResult<StorageLockGuard> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(guard) = self.try_lock()? {
                return Ok(guard);
            }
            if Instant::now() >= deadline {
                return Err(AppError::internal(format!(
                    "Timed out waiting for lock on {}",
                    self.path.display()
                )));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Attempts to acquire the exclusive lock without blocking.
    ///
    /// Returns `Ok(None)` when another handle holds the lock.
    pub fn try_lock(&self) -> AppResult<Option<StorageLockGuard>> {
        match self.file.try_lock() {
            Ok(()) => Ok(Some(StorageLockGuard {
                file: Arc::clone(&self.file),
            })),
            Err(TryLockError::WouldBlock) => Ok(None),
            Err(TryLockError::Error(e)) => Err(AppError::with_source(
                ErrorKind::Internal,
                format!("Failed to lock {}", self.path.display()),
                e,
            )),
        }
    }
}

impl Drop for StorageLockGuard {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

fn map_open_err(path: &Path, err: std::io::Error) -> AppError {
    AppError::with_source(
        ErrorKind::Internal,
        format!("Failed to open {}", path.display()),
        err,
    )
}
