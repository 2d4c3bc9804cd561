//! A single user: identity, password hash, groups and sessions.
//!
//! Every mutation is in-memory until [`UserRecord::write`], which is the
//! only persistence point and the only place the global user quota is
//! checked.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, warn};

use userhub_core::error::{AppError, ErrorKind};
use userhub_core::result::AppResult;
use userhub_storage::{LockedFile, StorageLock, remove_tree, write_locked};

use crate::session::{Session, SessionRegistry};

use super::directory::UserDirectory;
use super::export::{PublicUser, UserExport};

/// A freshly created session and its bearer token.
///
/// The token is only available here; afterwards just its digest remains.
#[derive(Debug, Clone)]
pub struct NewSession {
    /// The session as stored in the registry.
    pub session: Session,
    /// The bearer token.
    pub token: String,
}

/// One user aggregate bound to the directory it is stored in.
#[derive(Debug, Clone)]
pub struct UserRecord {
    directory: UserDirectory,
    name: String,
    hash: String,
    groups: Vec<String>,
    sessions: SessionRegistry,
    /// Loaded from or written to disk under the current name.
    stored: bool,
    /// Record file lock held by [`UserDirectory::update_user`].
    held: Option<Arc<LockedFile>>,
}

impl UserRecord {
    /// An empty record. Nothing is written until [`UserRecord::write`].
    pub fn new(directory: &UserDirectory) -> Self {
        Self {
            directory: directory.clone(),
            name: String::new(),
            hash: String::new(),
            groups: Vec::new(),
            sessions: SessionRegistry::new(),
            stored: false,
            held: None,
        }
    }

    // ── Persistence ──────────────────────────────────────────────

    /// Replaces this record with the stored data of `username`.
    ///
    /// Argument error for an empty or invalid name and for a user without
    /// a data directory. Internal error when the record can't be read,
    /// doesn't decode, or holds invalid values. On error `self` is left
    /// untouched.
    pub fn load(&mut self, username: &str) -> AppResult<()> {
        let json = self.open_record(username)?.read()?;
        *self = self.decode(username, &json)?;

        debug!(user = %username, "Loaded user");
        Ok(())
    }

    /// Like [`UserRecord::load`], but keeps the record file locked until
    /// [`UserRecord::release`].
    pub(crate) fn load_held(&mut self, username: &str) -> AppResult<()> {
        let file = self.open_record(username)?;
        let mut record = self.decode(username, &file.read()?)?;
        record.held = Some(Arc::new(file));
        *self = record;

        debug!(user = %username, "Loaded user for update");
        Ok(())
    }

    pub(crate) fn release(&mut self) {
        self.held = None;
    }

    /// Locks the record file of `username`. A user removed before or while
    /// waiting for the lock is an argument error, like one that never
    /// existed.
    fn open_record(&self, username: &str) -> AppResult<LockedFile> {
        if username.is_empty() {
            return Err(AppError::argument("Invalid username."));
        }
        let missing = || AppError::argument(format!("No user named {username}."));
        let dir = self.get_data_dir(Some(username));
        if !is_path_safe(username) || !dir.is_dir() {
            return Err(missing());
        }

        let data_file = self.directory.layout().data_file(username);
        match LockedFile::open(&data_file, self.directory.lock_timeout()) {
            Ok(file) => Ok(file),
            Err(_) if !dir.is_dir() => Err(missing()),
            Err(e) => Err(e),
        }
    }

    fn decode(&self, username: &str, json: &str) -> AppResult<UserRecord> {
        let data: UserExport = serde_json::from_str(json).map_err(|e| {
            AppError::with_source(ErrorKind::Internal, "User data decode error.", e)
        })?;
        if data.user != username {
            return Err(AppError::internal(format!(
                "User data in {username} belongs to {}.",
                data.user
            )));
        }

        let mut record = UserRecord::new(&self.directory);
        record.import(data).map_err(|e| {
            AppError::internal(format!("Invalid user data for {username}: {}", e.message))
        })?;
        record.stored = true;
        Ok(record)
    }

    /// Persists the full export of this record.
    ///
    /// A record that was loaded or already written only ever overwrites its
    /// existing file: if the user was removed in the meantime this fails
    /// with an internal error and nothing is recreated. Any other record is
    /// a new user and is admitted behind the root lock, so concurrent
    /// creations can't overshoot the quota. Returns `Ok(false)` without
    /// touching the disk when the quota is already full.
    pub fn write(&mut self) -> AppResult<bool> {
        if self.name.is_empty() {
            return Err(AppError::argument("Invalid username."));
        }

        let json = serde_json::to_string(&self.export()).map_err(|e| {
            AppError::with_source(ErrorKind::Internal, "Failed to JSON encode user data.", e)
        })?;
        let layout = self.directory.layout();
        let timeout = self.directory.lock_timeout();
        let data_file = layout.data_file(&self.name);

        if let Some(file) = &self.held {
            file.replace(&json)?;
            return Ok(true);
        }

        if self.stored {
            if !data_file.is_file() {
                return Err(AppError::internal("User data doesn't exist."));
            }
            LockedFile::open(&data_file, timeout)?.replace(&json)?;
            return Ok(true);
        }

        let root_lock = StorageLock::open(&layout.root_lock_file())?;
        let _admission = root_lock.lock(timeout)?;
        if self.get_data_dir(None).exists() {
            return Err(AppError::argument(format!("User {} already exists.", self.name)));
        }
        let max_users = self.directory.limits().max_users;
        let count = self.directory.user_count()?;
        if count + 1 > max_users {
            warn!(user = %self.name, count, max_users, "User quota reached, not creating user");
            return Ok(false);
        }

        info!(user = %self.name, "Creating user");
        write_locked(&data_file, &json, timeout)?;
        self.stored = true;
        Ok(true)
    }

    /// Deletes all stored data of this user, sessions included.
    ///
    /// Waits for in-flight updates of this user to finish first.
    pub fn remove(&self) -> AppResult<()> {
        let dir = self.get_data_dir(None);
        if self.name.is_empty() || !dir.is_dir() {
            return Err(AppError::internal("User data doesn't exist."));
        }

        let timeout = self.directory.lock_timeout();
        let layout = self.directory.layout();
        let root_lock = StorageLock::open(&layout.root_lock_file())?;
        let _guard = root_lock.lock(timeout)?;

        let data_file = layout.data_file(&self.name);
        let _record = match &self.held {
            None if data_file.is_file() => Some(LockedFile::open(&data_file, timeout)?),
            _ => None,
        };
        remove_tree(&dir).map_err(|e| {
            AppError::internal(format!("Failed to remove user data: {}", e.message))
        })?;

        info!(user = %self.name, "Removed user");
        Ok(())
    }

    /// Data directory of `name`, or of this user when `None`.
    pub fn get_data_dir(&self, name: Option<&str>) -> PathBuf {
        self.directory.get_data_dir(name.unwrap_or(&self.name))
    }

    /// Full export: everything that is persisted.
    pub fn export(&self) -> UserExport {
        UserExport {
            user: self.name.clone(),
            hash: self.hash.clone(),
            groups: self.groups.clone(),
            sessions: self.sessions.as_slice().to_vec(),
        }
    }

    /// Public export: no password hash, no token digests.
    pub fn export_public(&self) -> PublicUser {
        PublicUser {
            user: self.name.clone(),
            groups: self.groups.clone(),
            sessions: self.sessions.iter().map(Session::info).collect(),
        }
    }

    fn import(&mut self, data: UserExport) -> AppResult<()> {
        self.set_name(&data.user)?;
        self.hash = data.hash;
        self.set_groups(data.groups)?;
        self.set_sessions(data.sessions)?;
        Ok(())
    }

    // ── Identity ─────────────────────────────────────────────────

    /// Sets the username.
    pub fn set_name(&mut self, name: &str) -> AppResult<()> {
        if name.is_empty() || !is_path_safe(name) {
            return Err(AppError::argument("Invalid username."));
        }
        if name.len() > self.directory.limits().username_max_len {
            return Err(AppError::argument("Username too long."));
        }
        if name != self.name {
            self.stored = false;
            self.held = None;
        }
        self.name = name.to_string();
        Ok(())
    }

    /// The username.
    pub fn name(&self) -> &str {
        &self.name
    }

    // ── Credentials ──────────────────────────────────────────────

    /// Hashes and stores a new password.
    pub fn set_password(&mut self, password: &str) -> AppResult<()> {
        self.directory.validator().validate(password)?;
        self.hash = self.directory.hasher().hash_password(password)?;
        Ok(())
    }

    /// Whether `password` matches the stored hash. A missing or corrupt hash
    /// never matches.
    pub fn verify_password(&self, password: &str) -> bool {
        self.directory.hasher().verify_password(password, &self.hash)
    }

    /// Stores an already computed password hash.
    pub fn set_hash(&mut self, hash: &str) -> AppResult<()> {
        if hash.is_empty() {
            return Err(AppError::argument("Invalid password hash."));
        }
        self.hash = hash.to_string();
        Ok(())
    }

    /// The stored password hash.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    // ── Groups ───────────────────────────────────────────────────

    /// Replaces the group memberships. Prior groups are kept on error.
    pub fn set_groups(&mut self, groups: Vec<String>) -> AppResult<()> {
        if groups.len() > self.directory.limits().max_user_groups {
            return Err(AppError::argument("Too many user groups."));
        }
        self.groups = groups;
        Ok(())
    }

    /// Group memberships.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Whether the user is a member of `group`.
    pub fn is_in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }

    // ── Sessions ─────────────────────────────────────────────────

    /// Creates a session for this user and appends it to the registry.
    pub fn session_new(&mut self, who: &str, from: &str, permanent: bool) -> AppResult<NewSession> {
        let max_age = Duration::try_seconds(
            i64::try_from(self.directory.session_config().max_age_seconds).unwrap_or(i64::MAX),
        )
        .unwrap_or(Duration::MAX);
        let (session, token) = Session::new(&self.name, who, from, permanent, max_age);
        self.sessions.push(session.clone())?;
        debug!(user = %self.name, session_id = %session.id, permanent, "Created session");
        Ok(NewSession { session, token })
    }

    /// Removes the session `id`. Argument error if there is none.
    pub fn session_rm(&mut self, id: &str) -> AppResult<()> {
        self.sessions.remove(id)?;
        Ok(())
    }

    /// Removes every session except `id`; removes all of them when `id`
    /// doesn't exist. Returns the number removed.
    pub fn session_n_rm(&mut self, id: &str) -> usize {
        self.sessions.retain_only(id)
    }

    /// Finds the session accepting `token`.
    ///
    /// Expired sessions are purged during the same pass, and the record is
    /// then written back unconditionally so the purge is committed even when
    /// nothing matched. Verifying a token therefore always costs a write.
    /// Internal error when that write is refused.
    pub fn session_token_verify(&mut self, token: &str) -> AppResult<Option<Session>> {
        let check = self.sessions.verify_token(token);
        if check.purged > 0 {
            debug!(user = %self.name, purged = check.purged, "Purged expired sessions");
        }
        if !self.write()? {
            warn!(user = %self.name, "Session state not persisted, user quota reached");
            return Err(AppError::internal("Session state not persisted."));
        }
        Ok(check.session)
    }

    /// Looks up a session by id.
    pub fn session_get(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    /// Replaces all sessions. Argument error on duplicate ids.
    pub fn set_sessions(&mut self, sessions: Vec<Session>) -> AppResult<()> {
        self.sessions = SessionRegistry::from_sessions(sessions)?;
        Ok(())
    }

    /// All sessions in registry order.
    pub fn sessions(&self) -> &[Session] {
        self.sessions.as_slice()
    }
}

/// A username must be a single, non-hidden path component.
fn is_path_safe(name: &str) -> bool {
    !name.starts_with('.') && !name.contains(['/', '\\', '\0'])
}
