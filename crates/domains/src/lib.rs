//! ferrit/crates/domains/src/lib.rs
//!
//! The central domain logic and interface definitions for Ferrit:
//! models, the vote ledger arithmetic, port traits, and the error taxonomy.

pub mod error;
pub mod ledger;
pub mod models;
pub mod ports;

// Re-exporting for easier access in other crates
pub use error::*;
pub use ledger::*;
pub use models::*;
pub use ports::*;
