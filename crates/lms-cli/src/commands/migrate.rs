//! The `migrate` management command.
//!
//! Creates the user, courseware interaction and opt-out tables in the
//! configured database. Existing tables are left untouched.

use async_trait::async_trait;
use lms_core::{LmsError, Settings};

use crate::command::ManagementCommand;
use crate::commands::open_store;

/// Creates the database tables.
pub struct MigrateCommand;

#[async_trait]
impl ManagementCommand for MigrateCommand {
    fn name(&self) -> &'static str {
        "migrate"
    }

    fn help(&self) -> &'static str {
        "Create the database tables"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("database")
                .long("database")
                .help("Database file, overriding the configured one"),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), LmsError> {
        let mut database = settings.database.clone();
        if let Some(name) = matches.get_one::<String>("database") {
            database.name.clone_from(name);
        }

        tracing::info!("Running migrations on database '{}'", database.name);
        let store = open_store(&database)?;
        store.create_tables().await?;
        tracing::info!("Database tables are up to date");

        Ok(())
    }
}
