//! Ordered collection of one user's sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use userhub_core::error::AppError;
use userhub_core::result::AppResult;

use super::model::Session;

/// The sessions owned by a single user, in insertion order.
///
/// Session ids are unique within a registry. Order only matters for
/// deterministic iteration and for picking the first match when verifying
/// a token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionRegistry {
    sessions: Vec<Session>,
}

/// Outcome of [`SessionRegistry::verify_token`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCheck {
    /// The first non-expired session accepting the token.
    pub session: Option<Session>,
    /// Number of expired sessions dropped during the pass.
    pub purged: usize,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from a list, rejecting duplicate ids.
    pub fn from_sessions(sessions: Vec<Session>) -> AppResult<Self> {
        let mut registry = Self::new();
        for session in sessions {
            registry.push(session)?;
        }
        Ok(registry)
    }

    /// Appends a session.
    pub fn push(&mut self, session: Session) -> AppResult<()> {
        if self.get(&session.id).is_some() {
            return Err(AppError::argument(format!(
                "Duplicate session id {}.",
                session.id
            )));
        }
        self.sessions.push(session);
        Ok(())
    }

    /// Removes the session `id`, keeping the order of the rest.
    pub fn remove(&mut self, id: &str) -> AppResult<Session> {
        let index = self
            .sessions
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| AppError::argument("No such session."))?;
        Ok(self.sessions.remove(index))
    }

    /// Removes every session except `id`. When `id` isn't present the
    /// registry ends up empty. Returns how many sessions were removed.
    pub fn retain_only(&mut self, id: &str) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id == id);
        before - self.sessions.len()
    }

    /// Verifies `token` against every session at the current time.
    pub fn verify_token(&mut self, token: &str) -> TokenCheck {
        self.verify_token_at(token, Utc::now())
    }

    /// Single pass over the registry: expired sessions are dropped whether or
    /// not they match, and the first remaining session accepting `token` is
    /// returned.
    pub fn verify_token_at(&mut self, token: &str, now: DateTime<Utc>) -> TokenCheck {
        let before = self.sessions.len();
        let mut matched = None;
        self.sessions.retain(|s| {
            if s.is_expired_at(now) {
                return false;
            }
            if matched.is_none() && s.verify(token) {
                matched = Some(s.clone());
            }
            true
        });
        TokenCheck {
            session: matched,
            purged: before - self.sessions.len(),
        }
    }

    /// Looks up a session by id.
    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// All sessions in registry order.
    pub fn as_slice(&self) -> &[Session] {
        &self.sessions
    }

    /// Number of sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the registry holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Iterates sessions in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter()
    }
}
