//! # AppError
//!
//! Centralized error handling for the Ferrit core.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;
use uuid::Uuid;

/// The primary error type for all core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Post, Comment, Session)
    #[error("{0} not found with ID {1}")]
    NotFound(&'static str, String),

    /// Validation failure (e.g., missing title, vote value outside {-1,+1})
    #[error("validation error: {0}")]
    Validation(String),

    /// Authenticated but not allowed (e.g., deleting another user's post)
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Missing, expired, or invalid session / bad credentials
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Directory write referencing a user that was never registered
    #[error("unknown user {0}")]
    UnknownUser(Uuid),

    /// Resource already exists (e.g., duplicate login)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Pluggable storage backend failure; retryable at the caller's discretion
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Infrastructure failure (e.g., RNG exhaustion, serialization)
    #[error("internal service error: {0}")]
    Internal(String),
}

/// A specialized Result type for Ferrit core logic.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Shortcut for the most common not-found case.
    pub fn post_not_found(id: Uuid) -> Self {
        AppError::NotFound("post", id.to_string())
    }
}
