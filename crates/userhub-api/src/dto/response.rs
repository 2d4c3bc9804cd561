//! Response DTOs.

use serde::{Deserialize, Serialize};

use userhub_auth::SessionInfo;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Login response. `error` is always `"OK"`; failures use
/// [`crate::error::ApiErrorResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Result code.
    pub error: String,
    /// Bearer token. Returned only here.
    pub token: String,
    /// The created session.
    pub session: SessionInfo,
    /// Where the frontend should go next.
    pub landing: String,
}

/// The session a bearer token belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    /// Session owner.
    pub username: String,
    /// The session.
    pub session: SessionInfo,
}

/// Result of ending other sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutOtherResponse {
    /// Number of sessions ended.
    pub removed: usize,
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
}
