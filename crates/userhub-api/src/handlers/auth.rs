//! Auth handlers: login, logout, current session and session listing.

use axum::Json;
use axum::extract::State;
use validator::Validate;

use userhub_auth::PublicUser;
use userhub_core::error::AppError;

use crate::dto::request::LoginRequest;
use crate::dto::response::{
    ApiResponse, LoginResponse, LogoutOtherResponse, MessageResponse, SessionResponse,
};
use crate::error::ApiError;
use crate::extractors::{AuthSession, BearerToken, ClientInfo};
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    req.validate()
        .map_err(|e| AppError::argument(format!("Validation failed: {e}")))?;

    let result = state
        .session_manager
        .login(
            &req.username,
            &req.password,
            req.permanent,
            &client.who,
            &client.from,
        )
        .await
        .map_err(|e| {
            let failed = e.is_authentication();
            let err = ApiError::from(e);
            if failed {
                err.with_redirect(state.config.auth.failed_landing.clone())
            } else {
                err
            }
        })?;

    Ok(Json(LoginResponse {
        error: "OK".to_string(),
        token: result.token,
        session: result.session,
        landing: result.landing,
    }))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.session_manager.logout(&token).await?;

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Logged out successfully".to_string(),
    })))
}

/// POST /api/auth/logout_other
pub async fn logout_other(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<ApiResponse<LogoutOtherResponse>>, ApiError> {
    let removed = state.session_manager.logout_other(&token).await?;
    Ok(Json(ApiResponse::ok(LogoutOtherResponse { removed })))
}

/// GET /api/auth/session
pub async fn session(auth: AuthSession) -> Json<ApiResponse<SessionResponse>> {
    Json(ApiResponse::ok(SessionResponse {
        username: auth.username,
        session: auth.session,
    }))
}

/// GET /api/auth/sessions
pub async fn sessions(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<ApiResponse<PublicUser>>, ApiError> {
    let user = state.session_manager.sessions(&token).await?;
    Ok(Json(ApiResponse::ok(user)))
}
