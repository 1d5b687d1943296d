//! The `runserver` management command.
//!
//! Runs startup, opens the configured database and serves the instructor API
//! on a configurable host and port.

use async_trait::async_trait;
use lms_core::{startup, LmsError, Settings};
use lms_instructor::LmsApp;

use crate::command::ManagementCommand;
use crate::commands::open_store;

/// Starts the HTTP server.
///
/// By default, the server binds to `127.0.0.1:8000`. The address and port
/// can be configured via the `--host` and `--port` options.
pub struct RunserverCommand;

impl RunserverCommand {
    /// Builds the bind address from the parsed arguments.
    fn address(matches: &clap::ArgMatches) -> String {
        let host = matches
            .get_one::<String>("host")
            .map_or("127.0.0.1", String::as_str);
        let port = matches.get_one::<u16>("port").copied().unwrap_or(8000);
        format!("{host}:{port}")
    }
}

#[async_trait]
impl ManagementCommand for RunserverCommand {
    fn name(&self) -> &'static str {
        "runserver"
    }

    fn help(&self) -> &'static str {
        "Starts the HTTP server"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("host")
                .long("host")
                .default_value("127.0.0.1")
                .help("Host to bind to"),
        )
        .arg(
            clap::Arg::new("port")
                .long("port")
                .default_value("8000")
                .value_parser(clap::value_parser!(u16))
                .help("Port to bind to"),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), LmsError> {
        let addr = Self::address(matches);

        let context = startup::run(settings.clone())?.shared();
        let store = open_store(&context.settings().database)?;
        store.create_tables().await?;

        LmsApp::new(context, std::sync::Arc::new(store))
            .run(&addr)
            .await
    }
}
