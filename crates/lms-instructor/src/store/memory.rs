//! In-process store.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use lms_core::{LmsError, LmsResult};

use super::{InteractionRecord, InteractionStore, OptOutEntry, OptOutStore};

/// A store holding records in memory.
///
/// Every read increments a counter so callers can check how often the store
/// was consulted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    interactions: RwLock<Vec<InteractionRecord>>,
    opt_outs: RwLock<HashSet<OptOutEntry>>,
    reads: AtomicUsize,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an interaction.
    ///
    /// # Errors
    ///
    /// Returns [`LmsError::InternalServerError`] if the lock is poisoned.
    pub fn add_interaction(&self, record: InteractionRecord) -> LmsResult<()> {
        self.interactions
            .write()
            .map_err(|e| LmsError::InternalServerError(format!("store lock poisoned: {e}")))?
            .push(record);
        Ok(())
    }

    /// Opts a student out of a course.
    ///
    /// # Errors
    ///
    /// Returns [`LmsError::InternalServerError`] if the lock is poisoned.
    pub fn add_opt_out(&self, course_id: &str, student_id: i64) -> LmsResult<()> {
        self.opt_outs
            .write()
            .map_err(|e| LmsError::InternalServerError(format!("store lock poisoned: {e}")))?
            .insert(OptOutEntry {
                course_id: course_id.to_string(),
                student_id,
            });
        Ok(())
    }

    /// Number of reads served so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InteractionStore for MemoryStore {
    async fn interactions(
        &self,
        course_id: &str,
        target_id: &str,
        completed_only: bool,
    ) -> LmsResult<Vec<InteractionRecord>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let records = self
            .interactions
            .read()
            .map_err(|e| LmsError::InternalServerError(format!("store lock poisoned: {e}")))?;
        Ok(records
            .iter()
            .filter(|r| r.course_id == course_id && r.target_id == target_id)
            .filter(|r| !completed_only || r.is_completed())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OptOutStore for MemoryStore {
    async fn opted_out(&self, course_id: &str) -> LmsResult<HashSet<i64>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let opt_outs = self
            .opt_outs
            .read()
            .map_err(|e| LmsError::InternalServerError(format!("store lock poisoned: {e}")))?;
        Ok(opt_outs
            .iter()
            .filter(|entry| entry.course_id == course_id)
            .map(|entry| entry.student_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(student_id: i64, target: &str, grade: Option<f64>) -> InteractionRecord {
        InteractionRecord {
            student_id,
            email: format!("s{student_id}@example.com"),
            target_id: target.to_string(),
            course_id: "C".to_string(),
            grade,
        }
    }

    #[tokio::test]
    async fn test_interactions_filter_by_target_and_completion() {
        let store = MemoryStore::new();
        store.add_interaction(record(1, "p1", None)).unwrap();
        store.add_interaction(record(2, "p1", Some(1.0))).unwrap();
        store.add_interaction(record(3, "p2", Some(1.0))).unwrap();

        let opened = store.interactions("C", "p1", false).await.unwrap();
        assert_eq!(opened.len(), 2);

        let completed = store.interactions("C", "p1", true).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].student_id, 2);

        assert!(store.interactions("other", "p1", false).await.unwrap().is_empty());
        assert_eq!(store.reads(), 3);
    }

    #[tokio::test]
    async fn test_opt_outs_are_per_course() {
        let store = MemoryStore::new();
        store.add_opt_out("C", 1).unwrap();
        store.add_opt_out("D", 2).unwrap();

        let opted = store.opted_out("C").await.unwrap();
        assert_eq!(opted, HashSet::from([1]));
    }
}
