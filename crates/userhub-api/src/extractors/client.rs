//! Client description recorded on new sessions.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Who is logging in and from where.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    /// The client's user agent, or `"unknown"`.
    pub who: String,
    /// The first `X-Forwarded-For` address, or `"unknown"`.
    pub from: String,
}

impl<S: Send + Sync> FromRequestParts<S> for ClientInfo {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        let who = header("user-agent").unwrap_or_else(|| "unknown".to_string());
        let from = header("x-forwarded-for")
            .and_then(|v| v.split(',').next().map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "unknown".to_string());

        Ok(ClientInfo { who, from })
    }
}
