//! Read-only access to student interaction and opt-out data.
//!
//! The query core only needs two reads, each behind its own trait:
//!
//! - [`InteractionStore`]: interaction records for a course target
//! - [`OptOutStore`]: the students opted out of a course
//!
//! [`MemoryStore`] keeps everything in process and is used by tests and the
//! CLI fixtures; [`SqlStore`] reads the `courseware_studentmodule`,
//! `auth_user` and `bulk_email_optout` tables through a
//! [`DatabaseBackend`](lms_db::DatabaseBackend).

use std::collections::HashSet;

use async_trait::async_trait;
use lms_core::LmsResult;
use serde::{Deserialize, Serialize};

mod memory;
mod sql;

pub use memory::MemoryStore;
pub use sql::{SqlStore, SCHEMA};

/// One student's recorded interaction with a section or problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// The student's user id.
    pub student_id: i64,
    /// The student's contact address.
    pub email: String,
    /// The section or problem identifier.
    pub target_id: String,
    /// The course identifier.
    pub course_id: String,
    /// Present only when the student finished (was graded on) the target.
    pub grade: Option<f64>,
}

impl InteractionRecord {
    /// Returns `true` if the record carries a completion marker.
    pub const fn is_completed(&self) -> bool {
        self.grade.is_some()
    }
}

/// A student who must never appear in results for a course.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptOutEntry {
    /// The course identifier.
    pub course_id: String,
    /// The student's user id.
    pub student_id: i64,
}

/// Source of interaction records.
#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// Returns every record for `(course_id, target_id)`.
    ///
    /// With `completed_only` set, records without a completion marker are
    /// left out.
    async fn interactions(
        &self,
        course_id: &str,
        target_id: &str,
        completed_only: bool,
    ) -> LmsResult<Vec<InteractionRecord>>;
}

/// Source of course opt-outs.
#[async_trait]
pub trait OptOutStore: Send + Sync {
    /// Returns the ids of the students opted out of `course_id`.
    async fn opted_out(&self, course_id: &str) -> LmsResult<HashSet<i64>>;
}

/// A store that answers both reads. Implemented for every type that
/// implements the two halves.
pub trait StudentStore: InteractionStore + OptOutStore {}

impl<T: InteractionStore + OptOutStore> StudentStore for T {}
