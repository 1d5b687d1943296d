//! Management command framework.
//!
//! [`ManagementCommand`] defines one `lms` subcommand; [`CommandRegistry`]
//! registers them, builds the clap CLI and dispatches to the selected one.
//!
//! ## Defining a Custom Command
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use lms_cli::command::ManagementCommand;
//! use lms_core::{LmsError, Settings};
//!
//! struct GreetCommand;
//!
//! #[async_trait]
//! impl ManagementCommand for GreetCommand {
//!     fn name(&self) -> &str { "greet" }
//!     fn help(&self) -> &str { "Say hello" }
//!
//!     async fn handle(
//!         &self,
//!         _matches: &clap::ArgMatches,
//!         _settings: &Settings,
//!     ) -> Result<(), LmsError> {
//!         println!("Hello from lms!");
//!         Ok(())
//!     }
//! }
//! ```

use std::collections::BTreeMap;

use async_trait::async_trait;
use lms_core::{LmsError, Settings};

/// Name of the global option pointing at a settings file.
pub const SETTINGS_ARG: &str = "settings";

/// A management command that can be registered and invoked through the CLI.
#[async_trait]
pub trait ManagementCommand: Send + Sync {
    /// Returns the name of this command (used to invoke it from the CLI).
    fn name(&self) -> &str;

    /// Returns a short help description for this command.
    fn help(&self) -> &str;

    /// Adds custom arguments to the clap command.
    ///
    /// The default implementation returns the command unchanged.
    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd
    }

    /// Executes the command with the given argument matches and settings.
    ///
    /// `settings` are the loaded settings before startup wiring; commands that
    /// need the wired context run [`lms_core::startup::run`] themselves.
    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings)
        -> Result<(), LmsError>;
}

/// A registry of management commands, kept in name order.
pub struct CommandRegistry {
    commands: BTreeMap<String, Box<dyn ManagementCommand>>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    /// Creates a new empty command registry.
    pub fn new() -> Self {
        Self {
            commands: BTreeMap::new(),
        }
    }

    /// Registers a management command.
    ///
    /// If a command with the same name already exists, it is replaced.
    pub fn register(&mut self, command: Box<dyn ManagementCommand>) {
        let name = command.name().to_string();
        self.commands.insert(name, command);
    }

    /// Returns a reference to the command with the given name, if registered.
    pub fn get(&self, name: &str) -> Option<&dyn ManagementCommand> {
        self.commands.get(name).map(AsRef::as_ref)
    }

    /// Returns the registered command names in sorted order.
    pub fn list_commands(&self) -> Vec<&str> {
        self.commands.keys().map(String::as_str).collect()
    }

    /// Returns the number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if no commands are registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Builds the top-level `lms` command with every registered subcommand
    /// and the global `--settings` option.
    pub fn build_cli(&self) -> clap::Command {
        let mut app = clap::Command::new("lms")
            .about("LMS management utility")
            .version(env!("CARGO_PKG_VERSION"))
            .subcommand_required(true)
            .arg(
                clap::Arg::new(SETTINGS_ARG)
                    .long(SETTINGS_ARG)
                    .global(true)
                    .value_name("PATH")
                    .help("Settings file (TOML, or JSON by extension)"),
            );

        for (name, cmd) in &self.commands {
            // clap wants &'static str names; commands are registered once per
            // process so the leak is bounded.
            let static_name: &'static str = Box::leak(name.clone().into_boxed_str());
            let subcmd = clap::Command::new(static_name).about(cmd.help().to_string());
            let subcmd = cmd.add_arguments(subcmd);
            app = app.subcommand(subcmd);
        }

        app
    }

    /// Executes the command identified by the given argument matches.
    pub async fn execute(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), LmsError> {
        let (name, sub_matches) = matches.subcommand().ok_or_else(|| {
            LmsError::ConfigurationError("No subcommand specified".to_string())
        })?;

        let cmd = self.get(name).ok_or_else(|| {
            LmsError::ConfigurationError(format!("Unknown command: {name}"))
        })?;

        tracing::debug!(command = name, "running management command");
        cmd.handle(sub_matches, settings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestCommand {
        cmd_name: String,
    }

    impl TestCommand {
        fn new(name: &str) -> Self {
            Self {
                cmd_name: name.to_string(),
            }
        }
    }

    #[async_trait]
    impl ManagementCommand for TestCommand {
        fn name(&self) -> &str {
            &self.cmd_name
        }

        fn help(&self) -> &'static str {
            "A test command"
        }

        fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
            cmd.arg(
                clap::Arg::new("verbose")
                    .long("verbose")
                    .action(clap::ArgAction::SetTrue),
            )
        }

        async fn handle(
            &self,
            _matches: &clap::ArgMatches,
            _settings: &Settings,
        ) -> Result<(), LmsError> {
            Ok(())
        }
    }

    struct FailingCommand;

    #[async_trait]
    impl ManagementCommand for FailingCommand {
        fn name(&self) -> &'static str {
            "fail"
        }

        fn help(&self) -> &'static str {
            "A command that always fails"
        }

        async fn handle(
            &self,
            _matches: &clap::ArgMatches,
            _settings: &Settings,
        ) -> Result<(), LmsError> {
            Err(LmsError::ConfigurationError("deliberate failure".to_string()))
        }
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry = CommandRegistry::default();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(TestCommand::new("test")));
        registry.register(Box::new(TestCommand::new("test")));
        assert_eq!(registry.len(), 1);

        let cmd = registry.get("test").unwrap();
        assert_eq!(cmd.name(), "test");
        assert_eq!(cmd.help(), "A test command");
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn test_list_commands_sorted() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(TestCommand::new("students")));
        registry.register(Box::new(TestCommand::new("check")));
        registry.register(Box::new(TestCommand::new("migrate")));

        assert_eq!(registry.list_commands(), vec!["check", "migrate", "students"]);
    }

    #[test]
    fn test_build_cli_with_arguments() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(TestCommand::new("test")));

        let matches = registry
            .build_cli()
            .try_get_matches_from(["lms", "test", "--verbose"])
            .unwrap();
        let (name, sub_matches) = matches.subcommand().unwrap();
        assert_eq!(name, "test");
        assert!(sub_matches.get_flag("verbose"));
    }

    #[test]
    fn test_global_settings_arg() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(TestCommand::new("test")));

        let matches = registry
            .build_cli()
            .try_get_matches_from(["lms", "test", "--settings", "lms.toml"])
            .unwrap();
        assert_eq!(
            matches.get_one::<String>(SETTINGS_ARG).map(String::as_str),
            Some("lms.toml")
        );
    }

    #[test]
    fn test_build_cli_requires_subcommand() {
        let registry = CommandRegistry::new();
        assert!(registry.build_cli().try_get_matches_from(["lms"]).is_err());
    }

    #[tokio::test]
    async fn test_execute() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(TestCommand::new("test")));
        registry.register(Box::new(FailingCommand));
        let settings = Settings::default();

        let cli = registry.build_cli();
        let ok = cli.clone().try_get_matches_from(["lms", "test"]).unwrap();
        assert!(registry.execute(&ok, &settings).await.is_ok());

        let fail = cli.try_get_matches_from(["lms", "fail"]).unwrap();
        assert!(registry.execute(&fail, &settings).await.is_err());
    }
}
