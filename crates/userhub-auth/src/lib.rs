//! # userhub-auth
//!
//! Credentials, sessions and user records for UserHub.
//!
//! ## Modules
//!
//! - `password` - Argon2id password hashing and length policy
//! - `session` - Bearer-token sessions, the per-user registry, and the login manager
//! - `user` - User records and the filesystem-backed user directory

pub mod password;
pub mod session;
pub mod user;

pub use password::{PasswordHasher, PasswordValidator};
pub use session::{Authenticated, LoginResult, Session, SessionInfo, SessionManager, SessionRegistry};
pub use user::{NewSession, PublicUser, UserDirectory, UserExport, UserRecord};
