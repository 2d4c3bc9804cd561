//! Session entity model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::token;

/// A bearer-token session bound to one user.
///
/// The token itself is handed out once by [`Session::new`]; only its
/// SHA-256 digest is kept here and persisted with the owning user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Session {
    /// Unique session identifier.
    pub id: String,
    /// Username of the owning user.
    pub user: String,
    /// Who created the session, e.g. the client's user agent.
    pub who: String,
    /// Where the session was created from, e.g. the client address.
    pub from: String,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session stops being valid. `None` never expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether this is a "remember me" session.
    pub permanent: bool,
    /// SHA-256 digest of the bearer token.
    pub token_hash: String,
}

/// Public projection of a [`Session`] without its token digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Unique session identifier.
    pub id: String,
    /// Username of the owning user.
    pub user: String,
    /// Who created the session.
    pub who: String,
    /// Where the session was created from.
    pub from: String,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session expires, if ever.
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether this is a "remember me" session.
    pub permanent: bool,
}

impl Session {
    /// Creates a session for `owner` and returns it together with its bearer
    /// token.
    ///
    /// Non-permanent sessions expire `max_age` after creation; permanent ones
    /// never do.
    pub fn new(
        owner: &str,
        who: &str,
        from: &str,
        permanent: bool,
        max_age: Duration,
    ) -> (Self, String) {
        let now = Utc::now();
        let token = token::generate_token();
        let expires_at = if permanent {
            None
        } else {
            now.checked_add_signed(max_age)
        };

        let session = Self {
            id: Uuid::new_v4().to_string(),
            user: owner.to_string(),
            who: who.to_string(),
            from: from.to_string(),
            created_at: now,
            expires_at,
            permanent,
            token_hash: token::hash_token(&token),
        };
        (session, token)
    }

    /// Check whether the session has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Check whether the session is expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at <= now)
    }

    /// Whether `token` is the bearer token of this session.
    pub fn verify(&self, token: &str) -> bool {
        token::digests_match(&token::hash_token(token), &self.token_hash)
    }

    /// The public projection of this session.
    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id.clone(),
            user: self.user.clone(),
            who: self.who.clone(),
            from: self.from.clone(),
            created_at: self.created_at,
            expires_at: self.expires_at,
            permanent: self.permanent,
        }
    }
}
