//! Built-in management commands.
//!
//! Each command implements the
//! [`ManagementCommand`](crate::command::ManagementCommand) trait.

pub mod check;
pub mod migrate;
pub mod runserver;
pub mod students;

pub use check::CheckCommand;
pub use migrate::MigrateCommand;
pub use runserver::RunserverCommand;
pub use students::StudentsCommand;

use lms_core::settings::DatabaseSettings;
use lms_core::LmsResult;
use lms_instructor::store::SqlStore;

use crate::command::CommandRegistry;

/// Registers all built-in management commands into the given registry.
pub fn register_builtin_commands(registry: &mut CommandRegistry) {
    registry.register(Box::new(RunserverCommand));
    registry.register(Box::new(MigrateCommand));
    registry.register(Box::new(CheckCommand));
    registry.register(Box::new(StudentsCommand));
}

/// Opens the configured database as a student store.
pub(crate) fn open_store(database: &DatabaseSettings) -> LmsResult<SqlStore> {
    Ok(SqlStore::new(lms_db::connect(database)?))
}
