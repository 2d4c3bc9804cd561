//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use userhub_auth::session::INCORRECT_CREDENTIALS;
use userhub_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Where the frontend should go next, if anywhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

/// An [`AppError`] on its way out of a handler.
#[derive(Debug)]
pub struct ApiError {
    /// The domain error.
    pub error: AppError,
    /// Redirect hint for the frontend.
    pub redirect: Option<String>,
}

impl ApiError {
    /// Attaches a redirect hint to the response body.
    pub fn with_redirect(mut self, redirect: impl Into<String>) -> Self {
        self.redirect = Some(redirect.into());
        self
    }

    /// Status code and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self.error.kind {
            ErrorKind::Argument => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ErrorKind::Authentication if self.error.message == INCORRECT_CREDENTIALS => {
                (StatusCode::UNAUTHORIZED, "INCORRECT_CREDENTIALS")
            }
            ErrorKind::Authentication => (StatusCode::UNAUTHORIZED, "NOT_AUTHORIZED"),
            ErrorKind::Internal | ErrorKind::Configuration => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self {
            error,
            redirect: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.error, "Internal server error");
        }

        let body = ApiErrorResponse {
            error: error_code.to_string(),
            message: self.error.message,
            redirect: self.redirect,
        };

        (status, Json(body)).into_response()
    }
}
