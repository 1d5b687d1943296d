//! # lms-rs
//!
//! Instructor student queries and process startup for a learning-management
//! web application.
//!
//! This is the meta-crate that re-exports the workspace crates. Depend on it
//! to get everything, or on individual crates for finer-grained control.
//!
//! ```
//! use lms_rs::core::{startup, Settings};
//! use lms_rs::instructor::{Criterion, Inclusion};
//!
//! let context = startup::run(Settings::default()).unwrap();
//! assert!(context.services().is_ready());
//!
//! let criterion = Criterion::section("chapter-1", Inclusion::Or);
//! assert_eq!(criterion.target_id(), "chapter-1");
//! ```

/// Errors, settings, logging and startup wiring.
pub use lms_core as core;

/// Database backends.
pub use lms_db as db;

/// Instructor student queries and the HTTP API.
pub use lms_instructor as instructor;

/// Management commands (CLI).
#[cfg(feature = "cli")]
pub use lms_cli as cli;

// Third-party re-exports
pub use axum;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;

/// Commonly used items.
pub mod prelude {
    pub use lms_core::{startup, LmsError, LmsResult, Settings, StartupContext};
    pub use lms_instructor::store::{MemoryStore, SqlStore, StudentStore};
    pub use lms_instructor::{
        get_users, Criterion, FilterKind, Inclusion, LmsApp, QueryResults, Scope, StudentRef,
    };
}
