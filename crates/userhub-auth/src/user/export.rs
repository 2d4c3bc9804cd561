//! Storable projections of a user record.
//!
//! [`UserExport`] is the full document written to `data.json`; it is the
//! only shape accepted on load. [`PublicUser`] withholds the password hash
//! and session token digests for display.

use serde::{Deserialize, Serialize};

use crate::session::{Session, SessionInfo};

/// Full export of a user record, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserExport {
    /// Username.
    pub user: String,
    /// Argon2 PHC hash of the password.
    pub hash: String,
    /// Group memberships.
    pub groups: Vec<String>,
    /// Sessions in registry order.
    pub sessions: Vec<Session>,
}

/// Public export of a user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    /// Username.
    pub user: String,
    /// Group memberships.
    pub groups: Vec<String>,
    /// Sessions without token digests.
    pub sessions: Vec<SessionInfo>,
}
