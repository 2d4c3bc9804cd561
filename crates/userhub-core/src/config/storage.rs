//! User data storage configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Location of the on-disk user records and lock behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for all runtime data.
    #[serde(default = "default_data_root")]
    pub data_root: String,
    /// Directory below `data_root` holding one subdirectory per user.
    #[serde(default = "default_users_dir")]
    pub users_dir: String,
    /// How long to wait for an exclusive file lock before giving up.
    #[serde(default = "default_lock_timeout")]
    pub lock_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            users_dir: default_users_dir(),
            lock_timeout_ms: default_lock_timeout(),
        }
    }
}

impl StorageConfig {
    /// The directory containing every user's data directory.
    pub fn users_root(&self) -> PathBuf {
        PathBuf::from(&self.data_root).join(&self.users_dir)
    }

    /// Lock acquisition timeout as a [`Duration`].
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

fn default_data_root() -> String {
    "./data".to_string()
}

fn default_users_dir() -> String {
    "users".to_string()
}

fn default_lock_timeout() -> u64 {
    5_000
}
