//! On-disk layout of the users root.
//!
//! ```text
//! <root>/
//!   .lock              serializes admission of new users
//!   <username>/
//!     data.json        the full export of one user record
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use userhub_core::error::{AppError, ErrorKind};
use userhub_core::result::AppResult;

/// File name of a user's record inside their data directory.
pub const DATA_FILE: &str = "data.json";

/// File name of the root-level admission lock.
pub const ROOT_LOCK_FILE: &str = ".lock";

/// Path derivation for the users root. Only [`UserLayout::ensure_root`] and
/// [`UserLayout::scan`] touch the filesystem.
#[derive(Debug, Clone)]
pub struct UserLayout {
    root: PathBuf,
}

impl UserLayout {
    /// Creates a layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The users root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Data directory of the user `name`.
    pub fn user_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Record file of the user `name`.
    pub fn data_file(&self, name: &str) -> PathBuf {
        self.user_dir(name).join(DATA_FILE)
    }

    /// The lock file guarding new-user admission.
    pub fn root_lock_file(&self) -> PathBuf {
        self.root.join(ROOT_LOCK_FILE)
    }

    /// Creates the users root if it doesn't exist yet.
    pub fn ensure_root(&self) -> AppResult<()> {
        fs::create_dir_all(&self.root).map_err(|e| {
            AppError::with_source(
                ErrorKind::Internal,
                format!("Failed to create users root: {}", self.root.display()),
                e,
            )
        })
    }

    /// Lists the names of all subdirectories of the root, sorted.
    ///
    /// Plain files (such as the root lock) and names that aren't valid UTF-8
    /// are skipped. Whether a listed directory holds a loadable user is up
    /// to the caller.
    pub fn scan(&self) -> AppResult<Vec<String>> {
        let scan_err = |e: std::io::Error| {
            AppError::with_source(
                ErrorKind::Internal,
                format!("Failed to scan users root: {}", self.root.display()),
                e,
            )
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(scan_err)? {
            let entry = entry.map_err(scan_err)?;
            if !entry.file_type().map_err(scan_err)?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name != "." && name != ".." {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
