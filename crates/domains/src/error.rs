//! # DomainError
//!
//! Centralized error handling for the Dishboard ecosystem.
//! Every port and service in the workspace reports failures through this
//! one taxonomy; the web layer decides how each variant faces the browser.

use thiserror::Error;

/// The primary error type for all domain operations.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Resource not found (post, user, image blob).
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// A capability check failed; the payload is shown to the requester.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Input failed validation; nothing was mutated.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The resource already exists (duplicate registration email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A signed token failed verification: expired, tampered or malformed.
    #[error("invalid or expired token")]
    TokenInvalid,

    /// The request carried no authenticated principal.
    #[error("authentication required")]
    Unauthenticated,

    /// Infrastructure failure (database, blob I/O, mail transport).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for Dishboard domain operations.
pub type DomainResult<T> = std::result::Result<T, DomainError>;
