//! Session lifetime configuration.

use serde::{Deserialize, Serialize};

/// Session management configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Lifetime of a non-permanent session in seconds. Permanent sessions
    /// never expire.
    #[serde(default = "default_max_age")]
    pub max_age_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_age_seconds: default_max_age(),
        }
    }
}

fn default_max_age() -> u64 {
    3600
}
