//! Student sets and their aggregation.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::criterion::Inclusion;

/// A student in a query result.
///
/// Equality, hashing and ordering use the id only; the email is carried along
/// for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRef {
    /// The student's user id.
    pub id: i64,
    /// The student's contact address.
    pub email: String,
}

impl StudentRef {
    /// Creates a new student reference.
    pub fn new(id: i64, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }
}

impl PartialEq for StudentRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for StudentRef {}

impl Hash for StudentRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for StudentRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StudentRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

/// Accumulates per-criterion student sets by inclusion mode.
///
/// One instance is created per top-level query, filled by successive
/// `add_*`/[`merge_in`](Self::merge_in) calls and finally reduced with
/// [`results`](Self::results).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResults {
    can_include: BTreeSet<StudentRef>,
    must_include: BTreeSet<StudentRef>,
    dont_include: BTreeSet<StudentRef>,
}

impl QueryResults {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an accumulator holding `students` under the given mode.
    pub fn for_inclusion(
        inclusion: Inclusion,
        students: impl IntoIterator<Item = StudentRef>,
    ) -> Self {
        let mut results = Self::new();
        match inclusion {
            Inclusion::Or => results.add_can_include(students),
            Inclusion::And => results.add_must_include(students),
            Inclusion::Not => results.add_dont_include(students),
        }
        results
    }

    /// Adds OR-contributed students.
    pub fn add_can_include(&mut self, students: impl IntoIterator<Item = StudentRef>) {
        self.can_include.extend(students);
    }

    /// Adds AND-contributed students.
    pub fn add_must_include(&mut self, students: impl IntoIterator<Item = StudentRef>) {
        self.must_include.extend(students);
    }

    /// Adds NOT-contributed students.
    pub fn add_dont_include(&mut self, students: impl IntoIterator<Item = StudentRef>) {
        self.dont_include.extend(students);
    }

    /// Unions each of `other`'s sets into the matching set of `self`.
    pub fn merge_in(&mut self, other: Self) {
        self.can_include.extend(other.can_include);
        self.must_include.extend(other.must_include);
        self.dont_include.extend(other.dont_include);
    }

    /// OR-contributed students.
    pub const fn can_include(&self) -> &BTreeSet<StudentRef> {
        &self.can_include
    }

    /// AND-contributed students.
    pub const fn must_include(&self) -> &BTreeSet<StudentRef> {
        &self.must_include
    }

    /// NOT-contributed students.
    pub const fn dont_include(&self) -> &BTreeSet<StudentRef> {
        &self.dont_include
    }

    /// Returns `true` if no criterion contributed any student.
    pub fn is_empty(&self) -> bool {
        self.can_include.is_empty() && self.must_include.is_empty() && self.dont_include.is_empty()
    }

    /// Reduces the accumulator to the final student set.
    ///
    /// The result is `(can_include ∪ must_include) − dont_include`.
    ///
    /// AND-mode students are *unioned* with the OR-mode ones, not intersected,
    /// so an AND criterion currently behaves like an OR criterion. This is
    /// likely a defect; it stays until the intended AND semantics are
    /// confirmed.
    pub fn results(&self) -> BTreeSet<StudentRef> {
        self.can_include
            .union(&self.must_include)
            .filter(|student| !self.dont_include.contains(*student))
            .cloned()
            .collect()
    }
}
