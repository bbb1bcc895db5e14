//! # services
//!
//! Orchestration between the ports: the post service keeps the repository
//! and the user directory's vote mirror in agreement, and the account
//! service ties credentials to sessions. No storage or transport concerns
//! live here.

pub mod accounts;
pub mod posts;

pub use accounts::AccountService;
pub use posts::PostService;
