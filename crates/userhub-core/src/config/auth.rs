//! Login landing configuration.

use serde::{Deserialize, Serialize};

/// Where the login frontend sends the browser after a login attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Landing route after a successful, non-permanent login.
    #[serde(default = "default_landing")]
    pub landing: String,
    /// Landing route after a successful login with "remember me" set.
    #[serde(default = "default_permanent_landing")]
    pub permanent_landing: String,
    /// Route the frontend returns to after rejected credentials.
    #[serde(default = "default_failed_landing")]
    pub failed_landing: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            landing: default_landing(),
            permanent_landing: default_permanent_landing(),
            failed_landing: default_failed_landing(),
        }
    }
}

impl AuthConfig {
    /// Picks the landing route for a successful login.
    pub fn landing_for(&self, permanent: bool) -> &str {
        if permanent {
            &self.permanent_landing
        } else {
            &self.landing
        }
    }
}

fn default_landing() -> String {
    "/control".to_string()
}

fn default_permanent_landing() -> String {
    "/app".to_string()
}

fn default_failed_landing() -> String {
    "/login?failed=1".to_string()
}
