//! Password hashing with a configurable Argon2id cost.
//!
//! Only new hashes use the configured cost; verification reads the
//! parameters embedded in the stored PHC string.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use tracing::debug;

use userhub_core::config::CredentialsConfig;
use userhub_core::error::AppError;
use userhub_core::result::AppResult;

/// Hashes and checks user passwords.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Builds a hasher from the configured cost. Configuration error when
    /// the parameters are out of Argon2's accepted range.
    pub fn new(config: &CredentialsConfig) -> AppResult<Self> {
        let params = Params::new(
            config.argon2_memory_kib,
            config.argon2_iterations,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| AppError::configuration(format!("Invalid Argon2 parameters: {e}")))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes `password` with a fresh random salt into a PHC string.
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    /// Whether `password` matches `hash`.
    ///
    /// An empty or unparsable hash never matches; there is no error case.
    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        if hash.is_empty() {
            return false;
        }
        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "Unusable password hash");
                return false;
            }
        };
        self.argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
