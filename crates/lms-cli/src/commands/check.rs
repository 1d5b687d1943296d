//! The `check` management command.
//!
//! Runs startup and a set of system checks against the resulting context,
//! then reports the wired search paths and runtime URLs.

use async_trait::async_trait;
use lms_core::{startup, LmsError, Settings, StartupContext};

use crate::command::ManagementCommand;

/// Runs startup and system checks.
pub struct CheckCommand;

/// The result of a single system check.
#[derive(Debug, Clone)]
pub struct CheckMessage {
    /// The severity level of this check result.
    pub level: CheckLevel,
    /// A human-readable description of the issue.
    pub msg: String,
    /// An optional hint for how to resolve the issue.
    pub hint: Option<String>,
    /// A unique identifier for this check (e.g. "security.W001").
    pub id: String,
}

impl CheckMessage {
    fn new(level: CheckLevel, id: &str, msg: impl Into<String>, hint: Option<&str>) -> Self {
        Self {
            level,
            msg: msg.into(),
            hint: hint.map(str::to_string),
            id: id.to_string(),
        }
    }
}

/// Severity levels for system check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckLevel {
    /// Informational message.
    Info,
    /// A warning that may indicate a problem.
    Warning,
    /// An error that must be resolved.
    Error,
    /// A critical error that prevents the application from running.
    Critical,
}

impl std::fmt::Display for CheckLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Runs system checks against a started context.
pub fn run_checks(context: &StartupContext) -> Vec<CheckMessage> {
    let settings = context.settings();
    let mut messages = Vec::new();

    if settings.secret_key.is_empty() {
        let level = if settings.debug {
            CheckLevel::Warning
        } else {
            CheckLevel::Error
        };
        messages.push(CheckMessage::new(
            level,
            "security.W001",
            "SECRET_KEY is empty",
            Some("Set LMS_SECRET_KEY or secret_key in the settings file"),
        ));
    }

    if !matches!(settings.database.engine.as_str(), "sqlite3" | "sqlite") {
        messages.push(CheckMessage::new(
            CheckLevel::Error,
            "database.E001",
            format!("Unsupported database engine '{}'", settings.database.engine),
            Some("Use the 'sqlite3' engine"),
        ));
    }

    if settings.theme_name.is_some() && !settings.features.use_custom_theme {
        messages.push(CheckMessage::new(
            CheckLevel::Warning,
            "theming.W001",
            "theme_name is set but use_custom_theme is disabled",
            Some("Enable features.use_custom_theme to apply the theme"),
        ));
    }

    if let Some(root) = context.theme_root() {
        if !root.is_dir() {
            messages.push(CheckMessage::new(
                CheckLevel::Warning,
                "theming.W002",
                format!("Custom theme directory '{}' does not exist", root.display()),
                None,
            ));
        }
    }

    if settings.features.use_microsites && !context.microsites_enabled() {
        let root = lms_core::microsite::microsite_root(settings);
        messages.push(CheckMessage::new(
            CheckLevel::Warning,
            "microsite.W001",
            match root {
                Some(root) => format!("Microsite root '{}' does not exist", root.display()),
                None => "use_microsites is enabled but microsite_root_dir is unset".to_string(),
            },
            Some("Set microsite_root_dir to an existing directory"),
        ));
    }

    if context.analytics().is_none() {
        messages.push(CheckMessage::new(
            CheckLevel::Info,
            "analytics.I001",
            "No analytics write key configured",
            None,
        ));
    }

    if !settings.features.enable_instructor_queries {
        messages.push(CheckMessage::new(
            CheckLevel::Info,
            "instructor.I001",
            "The students query endpoint is disabled",
            None,
        ));
    }

    messages
}

#[async_trait]
impl ManagementCommand for CheckCommand {
    fn name(&self) -> &'static str {
        "check"
    }

    fn help(&self) -> &'static str {
        "Run startup and system checks"
    }

    async fn handle(
        &self,
        _matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), LmsError> {
        let context = startup::run(settings.clone())?;

        for dir in context.template_lookup().dirs() {
            println!("template dir: {}", dir.display());
        }
        for dir in &context.settings().locale_paths {
            println!("locale path:  {}", dir.display());
        }
        for name in context.services().names() {
            println!("service:      {name}");
        }
        let urls = context.runtime_urls();
        println!("handler url:  {}", urls.handler_url_template());
        println!("resource url: {}", urls.local_resource_url_template());

        let messages = run_checks(&context);
        if messages.is_empty() {
            tracing::info!("System check identified no issues");
            return Ok(());
        }

        let errors = messages.iter().filter(|m| m.level >= CheckLevel::Error).count();
        let warnings = messages.iter().filter(|m| m.level == CheckLevel::Warning).count();

        for msg in &messages {
            let hint_text = msg
                .hint
                .as_ref()
                .map_or(String::new(), |h| format!("\n\tHINT: {h}"));
            println!("{} ({}): {}{}", msg.level, msg.id, msg.msg, hint_text);
        }

        tracing::info!(
            "System check identified {} issue(s) ({} error(s), {} warning(s))",
            messages.len(),
            errors,
            warnings
        );

        if errors > 0 {
            return Err(LmsError::ConfigurationError(format!(
                "System check found {errors} error(s)"
            )));
        }

        Ok(())
    }
}
