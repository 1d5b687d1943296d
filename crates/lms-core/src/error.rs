//! Core error types for lms-rs.
//!
//! [`LmsError`] covers the failures that can surface from criterion parsing,
//! the interaction and opt-out stores, configuration loading and startup.
//! Each variant maps to an HTTP status code so the web layer can turn any
//! error into a response without inspecting its message.

use thiserror::Error;

/// The primary error type for lms-rs.
#[derive(Error, Debug)]
pub enum LmsError {
    // ── Request errors ───────────────────────────────────────────────

    /// A query criterion names an unknown scope or inclusion mode, or is
    /// otherwise malformed.
    #[error("Invalid criterion: {0}")]
    InvalidCriterion(String),

    /// HTTP 400 Bad Request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// HTTP 404 Not Found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP 500 Internal Server Error.
    #[error("Internal server error: {0}")]
    InternalServerError(String),

    // ── Store errors ─────────────────────────────────────────────────

    /// A generic database error (bad SQL, type mismatch in a row).
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// An operational database error (connection failure, etc.).
    #[error("Operational error: {0}")]
    OperationalError(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The application is improperly configured (e.g. a theme directory
    /// that does not exist).
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl LmsError {
    /// Returns the HTTP status code associated with this error.
    ///
    /// - `InvalidCriterion`, `BadRequest` -> 400
    /// - `NotFound` -> 404
    /// - Everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidCriterion(_) | Self::BadRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::InternalServerError(_)
            | Self::DatabaseError(_)
            | Self::OperationalError(_)
            | Self::ConfigurationError(_)
            | Self::ImproperlyConfigured(_)
            | Self::SerializationError(_)
            | Self::IoError(_) => 500,
        }
    }
}

impl From<serde_json::Error> for LmsError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// A convenience type alias for `Result<T, LmsError>`.
pub type LmsResult<T> = Result<T, LmsError>;
