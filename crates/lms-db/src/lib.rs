//! # lms-db
//!
//! Database access for lms-rs: a backend-agnostic [`Value`](value::Value) and
//! [`Row`](row::Row), the async [`DatabaseBackend`](base::DatabaseBackend)
//! trait, and a SQLite implementation.

// result_large_err: LmsError is the workspace-wide error type
#![allow(clippy::result_large_err)]
// significant_drop_tightening: false positives with blocking Mutex guards
#![allow(clippy::significant_drop_tightening)]

pub mod base;
pub mod row;
pub mod sqlite;
pub mod value;

pub use base::{connect, DatabaseBackend};
pub use row::Row;
pub use sqlite::SqliteBackend;
pub use value::{FromValue, Value};
