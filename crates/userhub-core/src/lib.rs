//! # userhub-core
//!
//! Core crate for UserHub. Contains configuration schemas and the unified
//! error system shared by the storage, auth, API and CLI crates.
//!
//! This crate has **no** internal dependencies on other UserHub crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
