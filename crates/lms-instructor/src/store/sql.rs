//! Store backed by the LMS database tables.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use lms_core::{LmsError, LmsResult};
use lms_db::{DatabaseBackend, Value};

use super::{InteractionRecord, InteractionStore, OptOutStore};

/// DDL for the tables the store reads. Safe to run repeatedly.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS auth_user (
    id INTEGER PRIMARY KEY,
    email TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS courseware_studentmodule (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id INTEGER NOT NULL REFERENCES auth_user (id),
    course_id TEXT NOT NULL,
    module_state_key TEXT NOT NULL,
    grade REAL NULL
);
CREATE INDEX IF NOT EXISTS courseware_studentmodule_course_module
    ON courseware_studentmodule (course_id, module_state_key);
CREATE TABLE IF NOT EXISTS bulk_email_optout (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES auth_user (id),
    course_id TEXT NOT NULL,
    UNIQUE (user_id, course_id)
);
";

const INTERACTIONS_SQL: &str = "SELECT sm.student_id AS student_id, u.email AS email, \
     sm.module_state_key AS target_id, sm.course_id AS course_id, sm.grade AS grade \
     FROM courseware_studentmodule sm \
     INNER JOIN auth_user u ON u.id = sm.student_id \
     WHERE sm.course_id = ? AND sm.module_state_key = ?";

/// A store reading interaction and opt-out rows through a database backend.
pub struct SqlStore {
    db: Arc<dyn DatabaseBackend>,
}

impl SqlStore {
    /// Wraps a database backend.
    pub fn new(db: Arc<dyn DatabaseBackend>) -> Self {
        Self { db }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &Arc<dyn DatabaseBackend> {
        &self.db
    }

    /// Creates the tables if they do not exist yet.
    ///
    /// # Errors
    ///
    /// Propagates database errors.
    pub async fn create_tables(&self) -> LmsResult<()> {
        self.db.execute_batch(SCHEMA).await
    }

    /// Inserts a user.
    ///
    /// # Errors
    ///
    /// Propagates database errors, including duplicate ids.
    pub async fn add_user(&self, id: i64, email: &str) -> LmsResult<()> {
        self.db
            .execute(
                "INSERT INTO auth_user (id, email) VALUES (?, ?)",
                &[Value::from(id), Value::from(email)],
            )
            .await?;
        Ok(())
    }

    /// Records a student's interaction with a course target.
    ///
    /// # Errors
    ///
    /// Propagates database errors.
    pub async fn add_interaction(
        &self,
        student_id: i64,
        course_id: &str,
        target_id: &str,
        grade: Option<f64>,
    ) -> LmsResult<()> {
        self.db
            .execute(
                "INSERT INTO courseware_studentmodule (student_id, course_id, module_state_key, grade) \
                 VALUES (?, ?, ?, ?)",
                &[
                    Value::from(student_id),
                    Value::from(course_id),
                    Value::from(target_id),
                    Value::from(grade),
                ],
            )
            .await?;
        Ok(())
    }

    /// Opts a student out of a course.
    ///
    /// # Errors
    ///
    /// Propagates database errors.
    pub async fn add_opt_out(&self, course_id: &str, student_id: i64) -> LmsResult<()> {
        self.db
            .execute(
                "INSERT OR IGNORE INTO bulk_email_optout (user_id, course_id) VALUES (?, ?)",
                &[Value::from(student_id), Value::from(course_id)],
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl InteractionStore for SqlStore {
    async fn interactions(
        &self,
        course_id: &str,
        target_id: &str,
        completed_only: bool,
    ) -> LmsResult<Vec<InteractionRecord>> {
        let sql = if completed_only {
            format!("{INTERACTIONS_SQL} AND sm.grade IS NOT NULL")
        } else {
            INTERACTIONS_SQL.to_string()
        };
        let rows = self
            .db
            .query(&sql, &[Value::from(course_id), Value::from(target_id)])
            .await?;

        rows.iter()
            .map(|row| {
                Ok::<_, LmsError>(InteractionRecord {
                    student_id: row.get("student_id")?,
                    email: row.get("email")?,
                    target_id: row.get("target_id")?,
                    course_id: row.get("course_id")?,
                    grade: row.get("grade")?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl OptOutStore for SqlStore {
    async fn opted_out(&self, course_id: &str) -> LmsResult<HashSet<i64>> {
        let rows = self
            .db
            .query(
                "SELECT user_id FROM bulk_email_optout WHERE course_id = ?",
                &[Value::from(course_id)],
            )
            .await?;
        rows.iter().map(|row| row.get::<i64>("user_id")).collect()
    }
}
