//! The `students` management command.
//!
//! Evaluates a students query against the configured database and prints the
//! result as JSON, in the same shape the HTTP endpoint returns.
//!
//! ```text
//! lms students --course Org/CS101/2024 --queries '[{"type": "problem", "id": "p1"}]'
//! lms students --course Org/CS101/2024 --queries queries.json
//! ```

use std::path::Path;

use async_trait::async_trait;
use lms_core::{LmsError, LmsResult, Settings};
use lms_instructor::criterion::{parse_all, Criterion, RawCriterion};
use lms_instructor::data_access::get_users;
use lms_instructor::views::StudentsQueryResponse;

use crate::command::ManagementCommand;
use crate::commands::open_store;

/// Prints the students matching a list of criteria.
pub struct StudentsCommand;

/// Reads criteria from inline JSON or from a JSON file.
///
/// The input is either a JSON array of criteria or an object with a
/// `queries` array.
pub fn load_queries(input: &str) -> LmsResult<Vec<Criterion>> {
    let text = if Path::new(input).is_file() {
        std::fs::read_to_string(input)?
    } else {
        input.to_string()
    };

    let value: serde_json::Value = serde_json::from_str(&text)?;
    let list = match value {
        serde_json::Value::Object(mut map) => map
            .remove("queries")
            .ok_or_else(|| LmsError::BadRequest("missing 'queries' array".to_string()))?,
        other => other,
    };
    let raw: Vec<RawCriterion> = serde_json::from_value(list)?;
    parse_all(raw)
}

#[async_trait]
impl ManagementCommand for StudentsCommand {
    fn name(&self) -> &'static str {
        "students"
    }

    fn help(&self) -> &'static str {
        "Print the students of a course matching a list of criteria"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("course")
                .long("course")
                .required(true)
                .help("Course identifier"),
        )
        .arg(
            clap::Arg::new("queries")
                .long("queries")
                .required(true)
                .help("JSON criteria, inline or as a file path"),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), LmsError> {
        let course_id = matches
            .get_one::<String>("course")
            .ok_or_else(|| LmsError::BadRequest("--course is required".to_string()))?;
        let input = matches
            .get_one::<String>("queries")
            .ok_or_else(|| LmsError::BadRequest("--queries is required".to_string()))?;

        let queries = load_queries(input)?;
        let store = open_store(&settings.database)?;
        let students: Vec<_> = get_users(&store, course_id, &queries)
            .await?
            .into_iter()
            .collect();

        let response = StudentsQueryResponse {
            course_id: course_id.clone(),
            count: students.len(),
            students,
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_core::settings::DatabaseSettings;
    use lms_instructor::{FilterKind, Inclusion};

    #[test]
    fn test_load_inline_array() {
        let queries =
            load_queries(r#"[{"type": "problem", "id": "p1", "filter": "completed"}]"#).unwrap();
        assert_eq!(
            queries,
            vec![Criterion::problem("p1", FilterKind::Completed, Inclusion::Or)]
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queries.json");
        std::fs::write(
            &path,
            r#"{"queries": [{"type": "section", "id": "s1", "inclusion": "NOT"}]}"#,
        )
        .unwrap();

        let queries = load_queries(path.to_str().unwrap()).unwrap();
        assert_eq!(queries, vec![Criterion::section("s1", Inclusion::Not)]);
    }

    #[test]
    fn test_load_invalid() {
        assert!(matches!(
            load_queries("not json"),
            Err(LmsError::SerializationError(_))
        ));
        assert!(matches!(
            load_queries(r#"{"criteria": []}"#),
            Err(LmsError::BadRequest(_))
        ));
        assert!(matches!(
            load_queries(r#"[{"type": "unit", "id": "u1"}]"#),
            Err(LmsError::InvalidCriterion(_))
        ));
    }

    #[tokio::test]
    async fn test_students_against_database() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            database: DatabaseSettings {
                engine: "sqlite3".to_string(),
                name: dir.path().join("lms.sqlite3").to_string_lossy().into_owned(),
            },
            ..Settings::default()
        };

        let store = open_store(&settings.database).unwrap();
        store.create_tables().await.unwrap();
        store.add_user(1, "ada@example.com").await.unwrap();
        store.add_interaction(1, "C", "p1", Some(1.0)).await.unwrap();

        let matches = StudentsCommand
            .add_arguments(clap::Command::new("students"))
            .try_get_matches_from([
                "students",
                "--course",
                "C",
                "--queries",
                r#"[{"type": "problem", "id": "p1"}]"#,
            ])
            .unwrap();
        StudentsCommand.handle(&matches, &settings).await.unwrap();
    }
}
