//! Student queries for the instructor dashboard.
//!
//! [`get_users`] turns a list of [`Criterion`] into the set of students that
//! satisfy them:
//!
//! 1. criteria are split by scope ([`split_queries`]),
//! 2. each criterion is evaluated against the store and stripped of
//!    opted-out students,
//! 3. its students land in a fresh [`QueryResults`] under its inclusion mode
//!    and are merged into the running total,
//! 4. the total is reduced with [`QueryResults::results`].
//!
//! The opt-out list is read once per [`get_users`] call and reused for every
//! criterion.

use std::collections::{BTreeSet, HashSet};

use lms_core::logging::query_span;
use lms_core::{LmsError, LmsResult};
use tracing::Instrument;

use crate::criterion::{Criterion, FilterKind, Scope};
use crate::results::{QueryResults, StudentRef};
use crate::store::{InteractionRecord, InteractionStore, OptOutStore, StudentStore};

/// Criteria partitioned by scope, each group in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitQueries {
    /// Section-scoped criteria.
    pub section: Vec<Criterion>,
    /// Problem-scoped criteria.
    pub problem: Vec<Criterion>,
}

impl SplitQueries {
    /// Total number of criteria across both groups.
    pub fn len(&self) -> usize {
        self.section.len() + self.problem.len()
    }

    /// Returns `true` if both groups are empty.
    pub fn is_empty(&self) -> bool {
        self.section.is_empty() && self.problem.is_empty()
    }
}

/// Partitions criteria into section and problem groups.
pub fn split_queries(queries: &[Criterion]) -> SplitQueries {
    let mut split = SplitQueries::default();
    for query in queries {
        match query.scope() {
            Scope::Section => split.section.push(query.clone()),
            Scope::Problem => split.problem.push(query.clone()),
        }
    }
    split
}

/// Returns the ids of students opted out of `course_id`.
///
/// # Errors
///
/// Propagates store errors.
pub async fn filter_out_students<S: OptOutStore + ?Sized>(
    store: &S,
    course_id: &str,
) -> LmsResult<HashSet<i64>> {
    store.opted_out(course_id).await
}

/// Drops opted-out records and files the rest under the criterion's
/// inclusion mode.
pub fn process_results(
    query: &Criterion,
    records: Vec<InteractionRecord>,
    opted_out: &HashSet<i64>,
) -> QueryResults {
    let students = records
        .into_iter()
        .filter(|record| !opted_out.contains(&record.student_id))
        .map(|record| StudentRef::new(record.student_id, record.email));
    QueryResults::for_inclusion(query.inclusion(), students)
}

/// Students who have any interaction with the criterion's target.
///
/// # Errors
///
/// Propagates store errors.
pub async fn open_query<S: InteractionStore + ?Sized>(
    store: &S,
    course_id: &str,
    query: &Criterion,
    opted_out: &HashSet<i64>,
) -> LmsResult<QueryResults> {
    let records = store
        .interactions(course_id, query.target_id(), false)
        .await?;
    Ok(process_results(query, records, opted_out))
}

/// Students with a graded interaction with the criterion's target.
///
/// # Errors
///
/// Propagates store errors.
pub async fn completed_query<S: InteractionStore + ?Sized>(
    store: &S,
    course_id: &str,
    query: &Criterion,
    opted_out: &HashSet<i64>,
) -> LmsResult<QueryResults> {
    let records = store
        .interactions(course_id, query.target_id(), true)
        .await?;
    Ok(process_results(query, records, opted_out))
}

/// Evaluates section criteria. Sections only support "opened", so the
/// criterion's filter kind is not consulted.
///
/// # Errors
///
/// Propagates store errors.
pub async fn get_section_users<S: InteractionStore + ?Sized>(
    store: &S,
    course_id: &str,
    queries: &[Criterion],
    opted_out: &HashSet<i64>,
) -> LmsResult<QueryResults> {
    let mut results = QueryResults::new();
    for query in queries {
        results.merge_in(open_query(store, course_id, query, opted_out).await?);
    }
    Ok(results)
}

/// Evaluates problem criteria by filter kind.
///
/// An unrecognized filter kind contributes nothing and does not reach the
/// store.
///
/// # Errors
///
/// Propagates store errors.
pub async fn get_problem_users<S: InteractionStore + ?Sized>(
    store: &S,
    course_id: &str,
    queries: &[Criterion],
    opted_out: &HashSet<i64>,
) -> LmsResult<QueryResults> {
    let mut results = QueryResults::new();
    for query in queries {
        let contribution = match query.filter() {
            FilterKind::Opened => open_query(store, course_id, query, opted_out).await?,
            FilterKind::Completed => completed_query(store, course_id, query, opted_out).await?,
            FilterKind::Unrecognized(kind) => {
                tracing::debug!(target_id = query.target_id(), kind = %kind, "ignoring unrecognized problem filter");
                continue;
            }
        };
        results.merge_in(contribution);
    }
    Ok(results)
}

/// Returns the students of `course_id` matching `queries`.
///
/// An empty query list returns an empty set without touching the store.
///
/// # Errors
///
/// Store errors are propagated unchanged; no partial result is returned.
pub async fn get_users<S: StudentStore + ?Sized>(
    store: &S,
    course_id: &str,
    queries: &[Criterion],
) -> LmsResult<BTreeSet<StudentRef>> {
    if queries.is_empty() {
        return Ok(BTreeSet::new());
    }

    let span = query_span(course_id, queries.len());
    async move {
        let split = split_queries(queries);
        let opted_out = filter_out_students(store, course_id).await?;

        let mut results = get_section_users(store, course_id, &split.section, &opted_out).await?;
        results.merge_in(get_problem_users(store, course_id, &split.problem, &opted_out).await?);

        let students = results.results();
        tracing::debug!(
            sections = split.section.len(),
            problems = split.problem.len(),
            opted_out = opted_out.len(),
            matched = students.len(),
            "students query evaluated"
        );
        Ok::<_, LmsError>(students)
    }
    .instrument(span)
    .await
}
