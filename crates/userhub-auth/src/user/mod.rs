//! User records and the filesystem-backed directory of all users.

pub mod directory;
pub mod export;
pub mod record;

pub use directory::UserDirectory;
pub use export::{PublicUser, UserExport};
pub use record::{NewSession, UserRecord};
