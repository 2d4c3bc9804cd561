//! Filesystem-backed catalog of all users.
//!
//! A user exists exactly when its data directory exists below the users
//! root and loads as a valid [`UserRecord`]. There is no separate index:
//! listing and counting scan the root and load each candidate.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use userhub_core::config::{
    AppConfig, CredentialsConfig, LimitsConfig, SessionConfig, StorageConfig,
};
use userhub_core::error::AppError;
use userhub_core::result::AppResult;
use userhub_storage::UserLayout;

use crate::password::{PasswordHasher, PasswordValidator};

use super::record::UserRecord;

/// Shared handle to the users root and the limits applied to every record.
///
/// Cloning is cheap; every [`UserRecord`] keeps a clone so that
/// [`UserRecord::write`] can enforce the global user quota.
#[derive(Debug, Clone)]
pub struct UserDirectory {
    inner: Arc<DirectoryInner>,
}

#[derive(Debug)]
struct DirectoryInner {
    layout: UserLayout,
    limits: LimitsConfig,
    session: SessionConfig,
    lock_timeout: Duration,
    hasher: PasswordHasher,
    validator: PasswordValidator,
}

impl UserDirectory {
    /// Opens the users root described by `storage`, creating it if needed.
    pub fn new(
        storage: &StorageConfig,
        limits: LimitsConfig,
        session: SessionConfig,
        credentials: &CredentialsConfig,
    ) -> AppResult<Self> {
        let hasher = PasswordHasher::new(credentials)?;
        let layout = UserLayout::new(storage.users_root());
        layout.ensure_root()?;
        debug!(root = %layout.root().display(), "Opened user directory");

        let validator = PasswordValidator::new(&limits);
        Ok(Self {
            inner: Arc::new(DirectoryInner {
                layout,
                limits,
                session,
                lock_timeout: storage.lock_timeout(),
                hasher,
                validator,
            }),
        })
    }

    /// Opens the user directory described by the application config.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        Self::new(
            &config.storage,
            config.limits.clone(),
            config.session.clone(),
            &config.credentials,
        )
    }

    /// On-disk layout of the users root.
    pub fn layout(&self) -> &UserLayout {
        &self.inner.layout
    }

    /// Configured limits.
    pub fn limits(&self) -> &LimitsConfig {
        &self.inner.limits
    }

    /// Configured session lifetime.
    pub fn session_config(&self) -> &SessionConfig {
        &self.inner.session
    }

    /// How long record reads and writes wait for a file lock.
    pub fn lock_timeout(&self) -> Duration {
        self.inner.lock_timeout
    }

    pub(crate) fn hasher(&self) -> &PasswordHasher {
        &self.inner.hasher
    }

    pub(crate) fn validator(&self) -> &PasswordValidator {
        &self.inner.validator
    }

    /// Data directory of the user `name`. Pure path derivation.
    pub fn get_data_dir(&self, name: &str) -> PathBuf {
        self.inner.layout.user_dir(name)
    }

    /// An empty, unsaved record bound to this directory.
    pub fn new_user(&self) -> UserRecord {
        UserRecord::new(self)
    }

    /// Loads the existing user `name`.
    pub fn load_user(&self, name: &str) -> AppResult<UserRecord> {
        let mut record = UserRecord::new(self);
        record.load(name)?;
        Ok(record)
    }

    /// Runs `f` on the stored record of `name` while holding the record's
    /// file lock from the read until `f` returns.
    ///
    /// Nothing else can read or write this user in between, so the whole
    /// read-modify-write cycle is atomic. [`UserRecord::write`] calls made by
    /// `f` go through the held lock; nothing is persisted otherwise. Clones
    /// of the record taken inside `f` keep the lock until they are dropped.
    ///
    /// Argument error when the user doesn't exist.
    pub fn update_user<T>(
        &self,
        name: &str,
        f: impl FnOnce(&mut UserRecord) -> AppResult<T>,
    ) -> AppResult<T> {
        let mut record = UserRecord::new(self);
        record.load_held(name)?;
        let result = f(&mut record);
        record.release();
        result
    }

    /// Whether the user `name` exists.
    ///
    /// Argument errors from the load ("no such user", invalid name) mean
    /// `false`; anything else, such as a corrupt record, propagates.
    pub fn user_exists(&self, name: &str) -> AppResult<bool> {
        match self.load_user(name) {
            Ok(_) => Ok(true),
            Err(e) if e.is_argument() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Names of all valid users, sorted.
    ///
    /// Directories that fail to load are left out: missing ones through
    /// [`UserDirectory::user_exists`], corrupt ones with a warning. Only a
    /// failure to scan the root itself is an error.
    pub fn user_names(&self) -> AppResult<Vec<String>> {
        let mut names = Vec::new();
        for name in self.inner.layout.scan()? {
            match self.user_exists(&name) {
                Ok(true) => names.push(name),
                Ok(false) => {}
                Err(e) => warn!(user = %name, error = %e, "Skipping unreadable user data"),
            }
        }
        Ok(names)
    }

    /// Loads every valid user.
    ///
    /// This performs a full load per user and is meant for small user
    /// counts only.
    pub fn users(&self) -> AppResult<Vec<UserRecord>> {
        let mut users = Vec::new();
        for name in self.inner.layout.scan()? {
            match self.load_user(&name) {
                Ok(record) => users.push(record),
                Err(e) if e.is_argument() => {}
                Err(e) => warn!(user = %name, error = %e, "Skipping unreadable user data"),
            }
        }
        Ok(users)
    }

    /// Number of valid users. Counts exactly the names returned by
    /// [`UserDirectory::user_names`].
    pub fn user_count(&self) -> AppResult<usize> {
        Ok(self.user_names()?.len())
    }

    /// Provisions a new user with a password and groups.
    ///
    /// Returns `Ok(None)` when the user quota is full. Fails with an
    /// argument error if the user already exists or any field is invalid.
    pub fn create_user(
        &self,
        name: &str,
        password: &str,
        groups: Vec<String>,
    ) -> AppResult<Option<UserRecord>> {
        let mut record = self.new_user();
        record.set_name(name)?;
        if self.get_data_dir(name).exists() {
            return Err(AppError::argument(format!("User {name} already exists.")));
        }
        record.set_password(password)?;
        record.set_groups(groups)?;

        if record.write()? {
            Ok(Some(record))
        } else {
            Ok(None)
        }
    }
}
