//! Custom Axum extractors.

pub mod auth;
pub mod client;

pub use auth::{AuthSession, BearerToken};
pub use client::ClientInfo;
