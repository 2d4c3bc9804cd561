//! Session lifecycle manager: login, token authentication and logout flows.
//!
//! The user directory does blocking, lock-guarded file I/O, so every flow
//! runs on the blocking thread pool.

use tracing::{debug, info, warn};

use userhub_core::config::AuthConfig;
use userhub_core::error::AppError;
use userhub_core::result::AppResult;

use crate::user::{PublicUser, UserDirectory, UserRecord};

use super::model::{Session, SessionInfo};

/// Message of the authentication error returned for a rejected login.
pub const INCORRECT_CREDENTIALS: &str = "Incorrect credentials.";

/// Message of the authentication error returned for an unknown or expired
/// bearer token.
pub const INVALID_TOKEN: &str = "Invalid or expired session token.";

/// Result of a successful login.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LoginResult {
    /// Bearer token of the new session. Only ever returned here.
    pub token: String,
    /// The created session.
    pub session: SessionInfo,
    /// Where the frontend should go next.
    pub landing: String,
}

/// The owner of a verified bearer token.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Authenticated {
    /// Username of the session owner.
    pub username: String,
    /// The matched session.
    pub session: SessionInfo,
}

/// Manages the session lifecycle on top of a [`UserDirectory`].
#[derive(Debug, Clone)]
pub struct SessionManager {
    /// Users and their persisted sessions.
    directory: UserDirectory,
    /// Landing routes.
    auth_config: AuthConfig,
}

impl SessionManager {
    /// Creates a new session manager.
    pub fn new(directory: UserDirectory, auth_config: AuthConfig) -> Self {
        Self {
            directory,
            auth_config,
        }
    }

    /// The underlying user directory.
    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    /// Performs the login flow:
    ///
    /// 1. Load the user and verify the password
    /// 2. Under the record lock, create the session and persist the record
    ///
    /// Hashing runs before the lock is taken; the session is only added if
    /// the hash is still the one that was verified. An unknown user and a
    /// wrong password are indistinguishable to the caller.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        permanent: bool,
        who: &str,
        from: &str,
    ) -> AppResult<LoginResult> {
        let directory = self.directory.clone();
        let landing = self.auth_config.landing_for(permanent).to_string();
        let (username, password) = (username.to_string(), password.to_string());
        let (who, from) = (who.to_string(), from.to_string());

        run_blocking(move || {
            let verified_hash = match directory.load_user(&username) {
                Ok(user) if user.verify_password(&password) => user.hash().to_string(),
                Ok(_) => {
                    warn!(user = %username, from = %from, "Login rejected");
                    return Err(AppError::authentication(INCORRECT_CREDENTIALS));
                }
                Err(e) if e.is_argument() => {
                    debug!(user = %username, "Login for unknown user");
                    return Err(AppError::authentication(INCORRECT_CREDENTIALS));
                }
                Err(e) => return Err(e),
            };

            let created = directory.update_user(&username, |user| {
                if user.hash() != verified_hash {
                    return Ok(None);
                }
                let created = user.session_new(&who, &from, permanent)?;
                user.write()?;
                Ok(Some(created))
            });
            let created = match created {
                Ok(Some(created)) => created,
                Ok(None) => {
                    warn!(user = %username, "Password changed during login");
                    return Err(AppError::authentication(INCORRECT_CREDENTIALS));
                }
                Err(e) if e.is_argument() => {
                    debug!(user = %username, "User removed during login");
                    return Err(AppError::authentication(INCORRECT_CREDENTIALS));
                }
                Err(e) => return Err(e),
            };

            info!(
                user = %username,
                session_id = %created.session.id,
                permanent,
                "Login successful"
            );
            Ok(LoginResult {
                token: created.token,
                session: created.session.info(),
                landing,
            })
        })
        .await
    }

    /// Resolves a bearer token to its owner.
    ///
    /// Users are tried in directory order and the first match wins. Every
    /// user visited has its expired sessions purged and written back.
    pub async fn authenticate(&self, token: &str) -> AppResult<Authenticated> {
        let directory = self.directory.clone();
        let token = token.to_string();

        run_blocking(move || {
            with_session(&directory, &token, |user, session| {
                Ok(Authenticated {
                    username: user.name().to_string(),
                    session: session.info(),
                })
            })
        })
        .await
    }

    /// Ends the session identified by `token`.
    pub async fn logout(&self, token: &str) -> AppResult<()> {
        let directory = self.directory.clone();
        let token = token.to_string();

        run_blocking(move || {
            with_session(&directory, &token, |user, session| {
                user.session_rm(&session.id)?;
                user.write()?;
                info!(user = %user.name(), session_id = %session.id, "Logout completed");
                Ok(())
            })
        })
        .await
    }

    /// Ends every session of the token's owner except the token's own.
    /// Returns how many sessions were ended.
    pub async fn logout_other(&self, token: &str) -> AppResult<usize> {
        let directory = self.directory.clone();
        let token = token.to_string();

        run_blocking(move || {
            with_session(&directory, &token, |user, session| {
                let removed = user.session_n_rm(&session.id);
                user.write()?;
                info!(
                    user = %user.name(),
                    session_id = %session.id,
                    removed,
                    "Other sessions terminated"
                );
                Ok(removed)
            })
        })
        .await
    }

    /// Public view of the token owner, including all of their sessions.
    pub async fn sessions(&self, token: &str) -> AppResult<PublicUser> {
        let directory = self.directory.clone();
        let token = token.to_string();

        run_blocking(move || {
            with_session(&directory, &token, |user, _| Ok(user.export_public()))
        })
        .await
    }
}

/// Finds the owner of `token` and runs `f` on their record while it is
/// still locked.
///
/// Each user is loaded fresh under its own lock, so the write-back that
/// comes with every token check never replaces newer data.
fn with_session<T>(
    directory: &UserDirectory,
    token: &str,
    f: impl FnOnce(&mut UserRecord, &Session) -> AppResult<T>,
) -> AppResult<T> {
    let mut f = Some(f);
    for name in directory.user_names()? {
        let visited = directory.update_user(&name, |user| {
            let Some(session) = user.session_token_verify(token)? else {
                return Ok(None);
            };
            Ok(f.take().map(|f| f(user, &session)))
        });
        match visited {
            Ok(Some(result)) => return result,
            Ok(None) => {}
            Err(e) if e.is_argument() => {
                debug!(user = %name, "User removed during token lookup");
            }
            Err(e) => return Err(e),
        }
    }
    Err(AppError::authentication(INVALID_TOKEN))
}

async fn run_blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::internal(format!("Blocking task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::directory::testing::directory;

    fn manager(max_users: usize) -> (tempfile::TempDir, SessionManager) {
        let (tmp, users) = directory(max_users);
        users
            .create_user("alice", "pw", vec!["admin".into()])
            .unwrap()
            .unwrap();
        users.create_user("bob", "pw2", vec![]).unwrap().unwrap();
        (tmp, SessionManager::new(users, AuthConfig::default()))
    }

    #[tokio::test]
    async fn test_login_and_authenticate() {
        let (_tmp, manager) = manager(10);
        let result = manager
            .login("alice", "pw", false, "curl", "127.0.0.1")
            .await
            .unwrap();
        assert_eq!(result.landing, "/control");
        assert_eq!(result.session.user, "alice");
        assert!(result.session.expires_at.is_some());

        let auth = manager.authenticate(&result.token).await.unwrap();
        assert_eq!(auth.username, "alice");
        assert_eq!(auth.session.id, result.session.id);
    }

    #[tokio::test]
    async fn test_permanent_login_landing() {
        let (_tmp, manager) = manager(10);
        let result = manager
            .login("bob", "pw2", true, "curl", "127.0.0.1")
            .await
            .unwrap();
        assert_eq!(result.landing, "/app");
        assert!(result.session.expires_at.is_none());
    }

    #[tokio::test]
    async fn test_bad_credentials_are_indistinguishable() {
        let (_tmp, manager) = manager(10);
        let wrong = manager.login("alice", "nope", false, "", "").await.unwrap_err();
        let unknown = manager.login("zed", "pw", false, "", "").await.unwrap_err();

        assert!(wrong.is_authentication());
        assert_eq!(wrong.message, INCORRECT_CREDENTIALS);
        assert_eq!(unknown.message, wrong.message);
        assert!(manager.directory().load_user("alice").unwrap().sessions().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_token_rejected() {
        let (_tmp, manager) = manager(10);
        let err = manager.authenticate("deadbeef").await.unwrap_err();
        assert!(err.is_authentication());
        assert_eq!(err.message, INVALID_TOKEN);
    }

    #[tokio::test]
    async fn test_logout_ends_only_that_session() {
        let (_tmp, manager) = manager(10);
        let first = manager.login("alice", "pw", false, "a", "x").await.unwrap();
        let second = manager.login("alice", "pw", false, "b", "x").await.unwrap();

        manager.logout(&first.token).await.unwrap();
        assert!(manager.authenticate(&first.token).await.is_err());
        assert!(manager.authenticate(&second.token).await.is_ok());
    }

    #[tokio::test]
    async fn test_logout_other() {
        let (_tmp, manager) = manager(10);
        let keep = manager.login("alice", "pw", false, "a", "x").await.unwrap();
        let drop1 = manager.login("alice", "pw", false, "b", "x").await.unwrap();
        manager.login("alice", "pw", true, "c", "x").await.unwrap();
        let other_user = manager.login("bob", "pw2", false, "d", "x").await.unwrap();

        assert_eq!(manager.logout_other(&keep.token).await.unwrap(), 2);
        assert!(manager.authenticate(&drop1.token).await.is_err());
        assert!(manager.authenticate(&other_user.token).await.is_ok());

        let public = manager.sessions(&keep.token).await.unwrap();
        assert_eq!(public.user, "alice");
        assert_eq!(public.sessions.len(), 1);
        assert_eq!(public.sessions[0].id, keep.session.id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_logins_keep_every_session() {
        let (_tmp, manager) = manager(10);

        let logins: Vec<_> = (0..8)
            .map(|i| {
                let manager = manager.clone();
                tokio::spawn(async move {
                    manager
                        .login("alice", "pw", false, &format!("client-{i}"), "x")
                        .await
                })
            })
            .collect();

        let mut tokens = Vec::new();
        for login in logins {
            tokens.push(login.await.unwrap().unwrap().token);
        }

        let alice = manager.directory().load_user("alice").unwrap();
        assert_eq!(alice.sessions().len(), 8);
        for token in &tokens {
            assert_eq!(manager.authenticate(token).await.unwrap().username, "alice");
        }
    }

    #[tokio::test]
    async fn test_login_refused_after_password_change() {
        let (_tmp, manager) = manager(10);
        manager
            .directory()
            .update_user("alice", |alice| {
                alice.set_password("new")?;
                alice.write()
            })
            .unwrap();

        let err = manager.login("alice", "pw", false, "", "").await.unwrap_err();
        assert!(err.is_authentication());
        assert!(manager.login("alice", "new", false, "", "").await.is_ok());
    }
}
