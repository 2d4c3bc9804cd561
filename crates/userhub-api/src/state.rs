//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use userhub_auth::{SessionManager, UserDirectory};
use userhub_core::config::AppConfig;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Session lifecycle manager
    pub session_manager: Arc<SessionManager>,
}

impl AppState {
    /// Wires the session manager over `directory`.
    pub fn new(config: AppConfig, directory: UserDirectory) -> Self {
        let session_manager = SessionManager::new(directory, config.auth.clone());
        Self {
            config: Arc::new(config),
            session_manager: Arc::new(session_manager),
        }
    }
}
