//! Capacity and length limits for users and credentials.

use serde::{Deserialize, Serialize};

/// Limits enforced by the user record and the user directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum number of users that may exist at once.
    #[serde(default = "default_max_users")]
    pub max_users: usize,
    /// Maximum number of groups a single user may belong to.
    #[serde(default = "default_max_user_groups")]
    pub max_user_groups: usize,
    /// Maximum username length in bytes.
    #[serde(default = "default_username_max_len")]
    pub username_max_len: usize,
    /// Maximum plaintext password length in bytes.
    #[serde(default = "default_password_max_len")]
    pub password_max_len: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_users: default_max_users(),
            max_user_groups: default_max_user_groups(),
            username_max_len: default_username_max_len(),
            password_max_len: default_password_max_len(),
        }
    }
}

fn default_max_users() -> usize {
    64
}

fn default_max_user_groups() -> usize {
    32
}

fn default_username_max_len() -> usize {
    64
}

fn default_password_max_len() -> usize {
    256
}
