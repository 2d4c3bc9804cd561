//! Sessions: the bearer-token model, the per-user registry, and the async
//! login manager built on top of the user directory.

pub mod manager;
pub mod model;
pub mod registry;
pub mod token;

pub use manager::{Authenticated, INCORRECT_CREDENTIALS, INVALID_TOKEN, LoginResult, SessionManager};
pub use model::{Session, SessionInfo};
pub use registry::{SessionRegistry, TokenCheck};
