//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field carries a default so a missing file is valid.

pub mod app;
pub mod auth;
pub mod credentials;
pub mod limits;
pub mod logging;
pub mod session;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::auth::AuthConfig;
pub use self::credentials::CredentialsConfig;
pub use self::limits::LimitsConfig;
pub use self::logging::LoggingConfig;
pub use self::session::SessionConfig;
pub use self::storage::StorageConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// User data location and locking.
    #[serde(default)]
    pub storage: StorageConfig,
    /// User, group and credential limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Password hashing cost.
    #[serde(default)]
    pub credentials: CredentialsConfig,
    /// Session lifetime settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Login landing routes.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config_path` with an environment-specific overlay
    /// (`config/{env}`) and environment variables prefixed with `USERHUB_`.
    /// Both files are optional.
    pub fn load(config_path: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("USERHUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
