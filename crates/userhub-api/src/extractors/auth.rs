//! Bearer-token extractors.
//!
//! [`BearerToken`] only parses the `Authorization` header; [`AuthSession`]
//! also resolves the token to its session through the session manager.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use userhub_auth::SessionInfo;
use userhub_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// The raw bearer token of the request.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))?;

        Ok(BearerToken(token.to_string()))
    }
}

/// An authenticated request: the token and the session it belongs to.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The bearer token.
    pub token: String,
    /// Session owner.
    pub username: String,
    /// The matched session.
    pub session: SessionInfo,
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let auth = state.session_manager.authenticate(&token).await?;

        Ok(AuthSession {
            token,
            username: auth.username,
            session: auth.session,
        })
    }
}
