//! The `lms` management binary.
//!
//! ```bash
//! lms --settings lms.toml migrate
//! lms --settings lms.toml runserver --port 8000
//! ```

use std::process::ExitCode;

use lms_cli::command::{CommandRegistry, SETTINGS_ARG};
use lms_cli::commands::register_builtin_commands;
use lms_core::logging::setup_logging;
use lms_core::{settings_loader, LmsResult, Settings};

fn load_settings(path: Option<&String>) -> LmsResult<Settings> {
    match path {
        Some(path) => settings_loader::from_file_with_env(path),
        None => Ok(settings_loader::from_env()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let mut registry = CommandRegistry::new();
    register_builtin_commands(&mut registry);
    let matches = registry.build_cli().get_matches();

    let settings = match load_settings(matches.get_one::<String>(SETTINGS_ARG)) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("lms: {e}");
            return ExitCode::FAILURE;
        }
    };
    setup_logging(&settings);

    match registry.execute(&matches, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("lms: {e}");
            ExitCode::FAILURE
        }
    }
}
