//! Route definitions for the UserHub HTTP API.
//!
//! All routes are mounted under `/api`.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new().merge(auth_routes()).merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Auth endpoints: login, logout, current session
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/logout_other", post(handlers::auth::logout_other))
        .route("/auth/session", get(handlers::auth::session))
        .route("/auth/sessions", get(handlers::auth::sessions))
}

/// Liveness
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
