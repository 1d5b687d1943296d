//! # lms-cli
//!
//! Management commands for lms-rs.
//!
//! - `runserver` - run startup and serve the instructor API
//! - `migrate` - create the database tables
//! - `check` - run startup and system checks
//! - `students` - evaluate a students query from the command line
//!
//! ```rust
//! use lms_cli::command::CommandRegistry;
//! use lms_cli::commands::register_builtin_commands;
//!
//! let mut registry = CommandRegistry::new();
//! register_builtin_commands(&mut registry);
//!
//! let names = registry.list_commands();
//! assert_eq!(names, vec!["check", "migrate", "runserver", "students"]);
//! ```

// - result_large_err: LmsError is the workspace-wide error type
// - unused_async: command handlers keep a uniform async signature
#![allow(clippy::result_large_err)]
#![allow(clippy::unused_async)]

pub mod command;
pub mod commands;

pub use command::{CommandRegistry, ManagementCommand};
