//! SQLite database backend using `rusqlite`.
//!
//! [`SqliteBackend`] implements [`DatabaseBackend`](crate::base::DatabaseBackend)
//! with a single connection behind an async mutex. Every call runs inside
//! `tokio::task::spawn_blocking` so the runtime is never blocked on disk I/O.
//!
//! - WAL mode for file databases
//! - `:memory:` databases for tests

use std::path::PathBuf;
use std::sync::Arc;

use lms_core::{LmsError, LmsResult};
use tokio::sync::Mutex;

use crate::base::DatabaseBackend;
use crate::row::Row;
use crate::value::Value;

/// A SQLite database backend.
pub struct SqliteBackend {
    /// The path to the database file (or ":memory:").
    path: PathBuf,
    /// The connection, guarded by an async mutex.
    conn: Arc<Mutex<rusqlite::Connection>>,
}

impl SqliteBackend {
    /// Opens a SQLite database at the given path.
    ///
    /// `:memory:` creates an in-memory database. WAL journal mode is enabled
    /// for file databases.
    ///
    /// # Errors
    ///
    /// Returns [`LmsError::OperationalError`] if the database cannot be opened.
    pub fn open(path: impl Into<PathBuf>) -> LmsResult<Self> {
        let path = path.into();
        let in_memory = path.to_str() == Some(":memory:");
        let conn = if in_memory {
            rusqlite::Connection::open_in_memory()
        } else {
            rusqlite::Connection::open(&path)
        }
        .map_err(|e| LmsError::OperationalError(format!("SQLite open failed: {e}")))?;

        let pragmas = if in_memory {
            "PRAGMA foreign_keys=ON;"
        } else {
            "PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;"
        };
        conn.execute_batch(pragmas)
            .map_err(|e| LmsError::OperationalError(format!("Failed to set pragmas: {e}")))?;

        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an in-memory database.
    pub fn memory() -> LmsResult<Self> {
        Self::open(":memory:")
    }

    /// Returns the database file path.
    pub const fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Binds values to a prepared statement, 1-indexed.
    fn bind_params(stmt: &mut rusqlite::Statement<'_>, params: &[Value]) -> LmsResult<()> {
        for (i, param) in params.iter().enumerate() {
            let idx = i + 1;
            match param {
                Value::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null),
                Value::Bool(b) => stmt.raw_bind_parameter(idx, b),
                Value::Int(v) => stmt.raw_bind_parameter(idx, v),
                Value::Float(v) => stmt.raw_bind_parameter(idx, v),
                Value::String(s) => stmt.raw_bind_parameter(idx, s.as_str()),
            }
            .map_err(|e| LmsError::DatabaseError(format!("Bind error: {e}")))?;
        }
        Ok(())
    }

    /// Converts a `rusqlite::Row` to a [`Row`].
    fn convert_row(sqlite_row: &rusqlite::Row<'_>, column_names: &[String]) -> LmsResult<Row> {
        use rusqlite::types::ValueRef;

        let mut values = Vec::with_capacity(column_names.len());
        for idx in 0..column_names.len() {
            let value = match sqlite_row
                .get_ref(idx)
                .map_err(|e| LmsError::DatabaseError(format!("{e}")))?
            {
                ValueRef::Null => Value::Null,
                ValueRef::Integer(v) => Value::Int(v),
                ValueRef::Real(v) => Value::Float(v),
                ValueRef::Text(b) => Value::String(String::from_utf8_lossy(b).into_owned()),
                ValueRef::Blob(_) => {
                    return Err(LmsError::DatabaseError(format!(
                        "BLOB column '{}' is not supported",
                        column_names[idx]
                    )))
                }
            };
            values.push(value);
        }

        Ok(Row::new(column_names.to_vec(), values))
    }
}

fn join_error(e: &tokio::task::JoinError) -> LmsError {
    LmsError::DatabaseError(format!("Task join error: {e}"))
}

#[async_trait::async_trait]
impl DatabaseBackend for SqliteBackend {
    fn vendor(&self) -> &str {
        "sqlite"
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> LmsResult<u64> {
        let conn = self.conn.clone();
        let sql = sql.to_string();
        let params = params.to_vec();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| LmsError::DatabaseError(format!("{e}")))?;
            Self::bind_params(&mut stmt, &params)?;
            let count = stmt
                .raw_execute()
                .map_err(|e| LmsError::DatabaseError(format!("{e}")))?;
            Ok(count as u64)
        })
        .await
        .map_err(|e| join_error(&e))?
    }

    async fn execute_batch(&self, sql: &str) -> LmsResult<()> {
        let conn = self.conn.clone();
        let sql = sql.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let result = conn.execute_batch(&sql);
            result.map_err(|e| LmsError::DatabaseError(format!("{e}")))
        })
        .await
        .map_err(|e| join_error(&e))?
    }

    async fn query(&self, sql: &str, params: &[Value]) -> LmsResult<Vec<Row>> {
        let conn = self.conn.clone();
        let sql = sql.to_string();
        let params = params.to_vec();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| LmsError::DatabaseError(format!("{e}")))?;

            let column_names: Vec<String> = stmt
                .column_names()
                .into_iter()
                .map(String::from)
                .collect();

            Self::bind_params(&mut stmt, &params)?;

            let mut raw_rows = stmt.raw_query();
            let mut rows = Vec::new();
            while let Some(row) = raw_rows
                .next()
                .map_err(|e| LmsError::DatabaseError(format!("{e}")))?
            {
                rows.push(Self::convert_row(row, &column_names)?);
            }

            Ok(rows)
        })
        .await
        .map_err(|e| join_error(&e))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_memory_open() {
        let backend = SqliteBackend::memory().unwrap();
        assert_eq!(backend.vendor(), "sqlite");
        assert_eq!(backend.path(), &PathBuf::from(":memory:"));
    }

    #[tokio::test]
    async fn test_sqlite_insert_and_query() {
        let backend = SqliteBackend::memory().unwrap();
        backend
            .execute_batch("CREATE TABLE auth_user (id INTEGER PRIMARY KEY, email TEXT NOT NULL)")
            .await
            .unwrap();

        let inserted = backend
            .execute(
                "INSERT INTO auth_user (id, email) VALUES (?, ?)",
                &[Value::from(1), Value::from("ada@example.com")],
            )
            .await
            .unwrap();
        assert_eq!(inserted, 1);

        let rows = backend
            .query("SELECT id, email FROM auth_user", &[])
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get::<i64>("id").unwrap(), 1);
        assert_eq!(rows[0].get::<String>("email").unwrap(), "ada@example.com");
    }

    #[tokio::test]
    async fn test_sqlite_null_and_real() {
        let backend = SqliteBackend::memory().unwrap();
        backend
            .execute_batch("CREATE TABLE t (grade REAL)")
            .await
            .unwrap();
        backend
            .execute("INSERT INTO t (grade) VALUES (?), (?)", &[Value::Null, Value::from(0.75)])
            .await
            .unwrap();

        let rows = backend
            .query("SELECT grade FROM t ORDER BY grade IS NULL DESC", &[])
            .await
            .unwrap();
        assert_eq!(rows[0].get::<Option<f64>>("grade").unwrap(), None);
        assert_eq!(rows[1].get::<Option<f64>>("grade").unwrap(), Some(0.75));
    }

    #[tokio::test]
    async fn test_sqlite_query_one() {
        let backend = SqliteBackend::memory().unwrap();
        backend
            .execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, val TEXT); INSERT INTO t (val) VALUES ('a'), ('b');")
            .await
            .unwrap();

        let row = backend
            .query_one("SELECT val FROM t WHERE id = ?", &[Value::from(1)])
            .await
            .unwrap();
        assert_eq!(row.get::<String>("val").unwrap(), "a");

        let missing = backend
            .query_one("SELECT val FROM t WHERE id = ?", &[Value::from(99)])
            .await;
        assert!(matches!(missing, Err(LmsError::NotFound(_))));

        let many = backend.query_one("SELECT val FROM t", &[]).await;
        assert!(matches!(many, Err(LmsError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn test_sqlite_bad_sql() {
        let backend = SqliteBackend::memory().unwrap();
        let result = backend.query("SELECT * FROM missing_table", &[]).await;
        assert!(matches!(result, Err(LmsError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn test_sqlite_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lms.sqlite3");
        let backend = SqliteBackend::open(&path).unwrap();
        backend
            .execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY)")
            .await
            .unwrap();
        assert!(path.exists());
    }
}
