//! Query criteria.
//!
//! A [`Criterion`] is one filter an instructor adds on the dashboard: "students
//! who opened section S", "students who completed problem P", each tagged with
//! how its matches combine with the others ([`Inclusion`]).
//!
//! Scope and inclusion are closed sets; unknown strings are rejected with
//! [`LmsError::InvalidCriterion`] when the criterion is built. The filter kind
//! is lenient: an unknown kind is kept as [`FilterKind::Unrecognized`] and
//! later contributes no students.

use std::fmt;
use std::str::FromStr;

use lms_core::{LmsError, LmsResult};
use serde::{Deserialize, Serialize};

/// What a criterion targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// A course section (chapter or sequential).
    Section,
    /// A single problem.
    Problem,
}

impl Scope {
    /// The wire name of this scope.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Section => "section",
            Self::Problem => "problem",
        }
    }
}

impl FromStr for Scope {
    type Err = LmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "section" => Ok(Self::Section),
            "problem" => Ok(Self::Problem),
            other => Err(LmsError::InvalidCriterion(format!("unknown scope '{other}'"))),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which interactions with the target count as a match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// The student has any recorded interaction with the target.
    Opened,
    /// The student has a graded interaction with the target.
    Completed,
    /// A kind this version does not know; matches nobody.
    Unrecognized(String),
}

impl FilterKind {
    /// Parses a filter kind, keeping unknown names instead of failing.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "opened" => Self::Opened,
            "completed" => Self::Completed,
            _ => Self::Unrecognized(s.to_string()),
        }
    }

    /// The wire name of this filter kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Opened => "opened",
            Self::Completed => "completed",
            Self::Unrecognized(kind) => kind,
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a criterion's matches combine with the other criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Inclusion {
    /// Matches may be included.
    Or,
    /// Matches must be included.
    And,
    /// Matches are excluded from the final result.
    Not,
}

impl Inclusion {
    /// The wire name of this inclusion mode.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Or => "OR",
            Self::And => "AND",
            Self::Not => "NOT",
        }
    }
}

impl FromStr for Inclusion {
    type Err = LmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OR" => Ok(Self::Or),
            "AND" => Ok(Self::And),
            "NOT" => Ok(Self::Not),
            other => Err(LmsError::InvalidCriterion(format!(
                "unknown inclusion mode '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Inclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A criterion as it appears on the wire.
///
/// ```json
/// {"type": "problem", "id": "i4x://Org/CS101/problem/p1", "filter": "completed", "inclusion": "AND"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCriterion {
    /// `"section"` or `"problem"`.
    #[serde(rename = "type")]
    pub scope: String,
    /// The target section or problem identifier.
    pub id: String,
    /// `"opened"` or `"completed"`; defaults to opened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// `"OR"`, `"AND"` or `"NOT"`; defaults to OR.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusion: Option<String>,
}

/// One validated filter condition.
///
/// # Examples
///
/// ```
/// use lms_instructor::criterion::{Criterion, FilterKind, Inclusion, Scope};
///
/// let c = Criterion::problem("p1", FilterKind::Completed, Inclusion::Or);
/// assert_eq!(c.scope(), Scope::Problem);
/// assert_eq!(c.target_id(), "p1");
///
/// let err = Criterion::parse("chapter", "c1", None, None).unwrap_err();
/// assert_eq!(err.status_code(), 400);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCriterion", into = "RawCriterion")]
pub struct Criterion {
    scope: Scope,
    target_id: String,
    filter: FilterKind,
    inclusion: Inclusion,
}

impl Criterion {
    /// Creates a criterion from already-typed parts.
    pub fn new(
        scope: Scope,
        target_id: impl Into<String>,
        filter: FilterKind,
        inclusion: Inclusion,
    ) -> Self {
        Self {
            scope,
            target_id: target_id.into(),
            filter,
            inclusion,
        }
    }

    /// A section criterion. Sections only know the "opened" filter.
    pub fn section(target_id: impl Into<String>, inclusion: Inclusion) -> Self {
        Self::new(Scope::Section, target_id, FilterKind::Opened, inclusion)
    }

    /// A problem criterion.
    pub fn problem(target_id: impl Into<String>, filter: FilterKind, inclusion: Inclusion) -> Self {
        Self::new(Scope::Problem, target_id, filter, inclusion)
    }

    /// Parses a criterion from its wire strings.
    ///
    /// # Errors
    ///
    /// Returns [`LmsError::InvalidCriterion`] for an unknown scope or
    /// inclusion mode, or an empty target id.
    pub fn parse(
        scope: &str,
        target_id: &str,
        filter: Option<&str>,
        inclusion: Option<&str>,
    ) -> LmsResult<Self> {
        let scope: Scope = scope.parse()?;
        if target_id.trim().is_empty() {
            return Err(LmsError::InvalidCriterion(format!(
                "{scope} criterion has an empty id"
            )));
        }
        let filter = filter.map_or(FilterKind::Opened, FilterKind::parse);
        let inclusion = inclusion.map_or(Ok(Inclusion::Or), str::parse)?;

        Ok(Self::new(scope, target_id, filter, inclusion))
    }

    /// Whether this criterion targets a section or a problem.
    pub const fn scope(&self) -> Scope {
        self.scope
    }

    /// The section or problem identifier.
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// The filter kind.
    pub const fn filter(&self) -> &FilterKind {
        &self.filter
    }

    /// The inclusion mode.
    pub const fn inclusion(&self) -> Inclusion {
        self.inclusion
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} [{}]",
            self.inclusion, self.scope, self.target_id, self.filter
        )
    }
}

impl TryFrom<RawCriterion> for Criterion {
    type Error = LmsError;

    fn try_from(raw: RawCriterion) -> Result<Self, Self::Error> {
        Self::parse(
            &raw.scope,
            &raw.id,
            raw.filter.as_deref(),
            raw.inclusion.as_deref(),
        )
    }
}

impl From<Criterion> for RawCriterion {
    fn from(criterion: Criterion) -> Self {
        Self {
            scope: criterion.scope.as_str().to_string(),
            filter: Some(criterion.filter.as_str().to_string()),
            inclusion: Some(criterion.inclusion.as_str().to_string()),
            id: criterion.target_id,
        }
    }
}

/// Parses a list of wire criteria, failing on the first invalid one.
pub fn parse_all(raw: Vec<RawCriterion>) -> LmsResult<Vec<Criterion>> {
    raw.into_iter()
        .enumerate()
        .map(|(idx, raw)| {
            Criterion::try_from(raw).map_err(|e| match e {
                LmsError::InvalidCriterion(msg) => {
                    LmsError::InvalidCriterion(format!("query {idx}: {msg}"))
                }
                other => other,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_parse() {
        assert_eq!("section".parse::<Scope>().unwrap(), Scope::Section);
        assert_eq!(" Problem ".parse::<Scope>().unwrap(), Scope::Problem);
        let err = "chapter".parse::<Scope>().unwrap_err();
        assert!(matches!(err, LmsError::InvalidCriterion(_)));
    }

    #[test]
    fn test_inclusion_parse() {
        assert_eq!("or".parse::<Inclusion>().unwrap(), Inclusion::Or);
        assert_eq!("AND".parse::<Inclusion>().unwrap(), Inclusion::And);
        assert_eq!("Not".parse::<Inclusion>().unwrap(), Inclusion::Not);
        assert!("XOR".parse::<Inclusion>().is_err());
    }

    #[test]
    fn test_filter_kind_is_lenient() {
        assert_eq!(FilterKind::parse("OPENED"), FilterKind::Opened);
        assert_eq!(FilterKind::parse("completed"), FilterKind::Completed);
        assert_eq!(
            FilterKind::parse("attempted"),
            FilterKind::Unrecognized("attempted".to_string())
        );
        assert_eq!(FilterKind::parse("attempted").as_str(), "attempted");
    }

    #[test]
    fn test_parse_defaults() {
        let c = Criterion::parse("section", "s1", None, None).unwrap();
        assert_eq!(c.scope(), Scope::Section);
        assert_eq!(c.filter(), &FilterKind::Opened);
        assert_eq!(c.inclusion(), Inclusion::Or);
    }

    #[test]
    fn test_parse_rejects_empty_id() {
        let err = Criterion::parse("problem", "  ", Some("opened"), Some("OR")).unwrap_err();
        assert!(matches!(err, LmsError::InvalidCriterion(_)));
    }

    #[test]
    fn test_deserialize_wire_format() {
        let c: Criterion = serde_json::from_str(
            r#"{"type": "problem", "id": "p1", "filter": "completed", "inclusion": "AND"}"#,
        )
        .unwrap();
        assert_eq!(
            c,
            Criterion::problem("p1", FilterKind::Completed, Inclusion::And)
        );
    }

    #[test]
    fn test_deserialize_unknown_scope_fails() {
        let result: Result<Criterion, _> =
            serde_json::from_str(r#"{"type": "chapter", "id": "c1"}"#);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("unknown scope"));
    }

    #[test]
    fn test_serialize_wire_format() {
        let c = Criterion::section("s1", Inclusion::Not);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "section", "id": "s1", "filter": "opened", "inclusion": "NOT"})
        );
    }

    #[test]
    fn test_parse_all_reports_index() {
        let raw = vec![
            RawCriterion {
                scope: "section".to_string(),
                id: "s1".to_string(),
                filter: None,
                inclusion: None,
            },
            RawCriterion {
                scope: "problem".to_string(),
                id: "p1".to_string(),
                filter: None,
                inclusion: Some("MAYBE".to_string()),
            },
        ];
        let err = parse_all(raw).unwrap_err();
        assert!(err.to_string().contains("query 1"));
    }

    #[test]
    fn test_display() {
        let c = Criterion::problem("p1", FilterKind::Opened, Inclusion::Or);
        assert_eq!(c.to_string(), "OR problem p1 [opened]");
    }
}
