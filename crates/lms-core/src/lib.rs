//! # lms-core
//!
//! Core types for lms-rs: the error type, settings and their loader, logging
//! setup, and the one-time startup wiring that turns settings into a shared
//! [`StartupContext`](startup::StartupContext).
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Application settings with defaults
//! - [`settings_loader`] - TOML/JSON loading and `LMS_*` environment overrides
//! - [`logging`] - Tracing-based logging integration
//! - [`theming`] - Comprehensive and custom theme search paths
//! - [`microsite`] - Microsite template and static paths
//! - [`locale`] - XBlock translation discovery
//! - [`runtime`] - XBlock handler and resource URL templates
//! - [`services`] - Runtime service registry
//! - [`startup`] - Process startup and the resulting context

pub mod error;
pub mod locale;
pub mod logging;
pub mod microsite;
pub mod runtime;
pub mod services;
pub mod settings;
pub mod settings_loader;
pub mod startup;
pub mod theming;

// Re-export the most commonly used types at the crate root.
pub use error::{LmsError, LmsResult};
pub use settings::Settings;
pub use startup::StartupContext;
