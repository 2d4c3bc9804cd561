//! # userhub-storage
//!
//! Filesystem primitives backing the user store: the layout of the users
//! root, an exclusive advisory file lock with a bounded wait, and whole-file
//! reads and writes performed while that lock is held.

pub mod layout;
pub mod lock;
pub mod record;

pub use layout::UserLayout;
pub use lock::{StorageLock, StorageLockGuard};
pub use record::{LockedFile, read_locked, remove_tree, write_locked};
