//! # userhub-api
//!
//! HTTP API layer for UserHub built on Axum.
//!
//! Exposes the login wire contract and the bearer-token session routes on
//! top of [`userhub_auth::SessionManager`], together with extractors, DTOs,
//! request logging and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
