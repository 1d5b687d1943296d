//! Base database backend trait.
//!
//! [`DatabaseBackend`] is the seam between the stores in `lms-instructor` and
//! a concrete driver. [`connect`] opens the backend named by the settings.

use std::sync::Arc;

use lms_core::settings::DatabaseSettings;
use lms_core::{LmsError, LmsResult};

use crate::row::Row;
use crate::value::Value;

/// The core trait for database backends.
///
/// All methods are async because database operations are I/O-bound. Backends
/// built on synchronous drivers (like `rusqlite`) run each call inside
/// `spawn_blocking`.
#[async_trait::async_trait]
pub trait DatabaseBackend: Send + Sync {
    /// Returns the vendor name (e.g. "sqlite").
    fn vendor(&self) -> &str;

    /// Executes one SQL statement that does not return rows.
    ///
    /// Returns the number of rows affected.
    async fn execute(&self, sql: &str, params: &[Value]) -> LmsResult<u64>;

    /// Executes several `;`-separated statements without parameters.
    async fn execute_batch(&self, sql: &str) -> LmsResult<()>;

    /// Executes a SQL query and returns all result rows.
    async fn query(&self, sql: &str, params: &[Value]) -> LmsResult<Vec<Row>>;

    /// Executes a SQL query and returns exactly one row.
    ///
    /// Returns [`LmsError::NotFound`] if no rows are returned and
    /// [`LmsError::DatabaseError`] if more than one row is returned.
    async fn query_one(&self, sql: &str, params: &[Value]) -> LmsResult<Row> {
        let mut rows = self.query(sql, params).await?;
        match rows.len() {
            0 => Err(LmsError::NotFound("No rows returned".to_string())),
            1 => Ok(rows.remove(0)),
            n => Err(LmsError::DatabaseError(format!("Expected 1 row, got {n}"))),
        }
    }
}

/// Opens the backend described by `settings`.
///
/// # Errors
///
/// Returns [`LmsError::ImproperlyConfigured`] for an unknown engine, or the
/// backend's own error if the connection cannot be opened.
pub fn connect(settings: &DatabaseSettings) -> LmsResult<Arc<dyn DatabaseBackend>> {
    match settings.engine.as_str() {
        "sqlite3" | "sqlite" => {
            let backend = crate::sqlite::SqliteBackend::open(&settings.name)?;
            tracing::info!(path = %settings.name, "opened sqlite database");
            Ok(Arc::new(backend))
        }
        other => Err(LmsError::ImproperlyConfigured(format!(
            "unsupported database engine '{other}'"
        ))),
    }
}
