//! Password length policy.

use userhub_core::config::LimitsConfig;
use userhub_core::error::AppError;

/// Validates plaintext passwords against the configured limits.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Maximum password length in bytes.
    max_length: usize,
}

impl PasswordValidator {
    /// Creates a new validator from the limits configuration.
    pub fn new(limits: &LimitsConfig) -> Self {
        Self {
            max_length: limits.password_max_len,
        }
    }

    /// Returns `Ok(())` if the password may be hashed and stored.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.len() > self.max_length {
            return Err(AppError::argument("Password too long."));
        }
        Ok(())
    }
}
