//! # storage-adapters
//!
//! In-memory implementations of the domains ports: the post repository, the
//! user directory, the session store, and a key-value store usable as a
//! write-behind journal for any of them. All adapters are safe for one
//! logical worker per request; exclusion is scoped per post, per user, or
//! per token via DashMap sharding.

pub mod kv;
pub mod posts;
pub mod sessions;
pub mod users;

pub use kv::MemoryKv;
pub use posts::MemoryPostRepo;
pub use sessions::MemorySessionStore;
pub use users::MemoryUserDirectory;
