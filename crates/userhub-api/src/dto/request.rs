//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// "Remember me": the session never expires.
    #[serde(default)]
    pub permanent: bool,
}
