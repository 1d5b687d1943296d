//! Settings for the lms-rs application.
//!
//! [`Settings`] holds every configuration value read at process start. There
//! is no global instance: startup consumes a `Settings`, applies
//! theming and locale wiring, and hands the result to the rest of the process
//! inside a [`StartupContext`](crate::startup::StartupContext).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Database connection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// The database engine. Only `sqlite3` is shipped.
    pub engine: String,
    /// The database file path, or `:memory:`.
    pub name: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            engine: "sqlite3".to_string(),
            name: "lms.sqlite3".to_string(),
        }
    }
}

/// Feature switches, mirroring the `FEATURES` dictionary of the deployment
/// configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct FeatureFlags {
    /// Allow sign-in through external identity providers.
    pub enable_third_party_auth: bool,
    /// Serve templates and static files from `ENV_ROOT/themes/<theme_name>`.
    pub use_custom_theme: bool,
    /// Register the runtime services required by proctored exams.
    pub enable_special_exams: bool,
    /// Expose the instructor student-query endpoint.
    pub enable_instructor_queries: bool,
    /// Add `microsite_root_dir` to the template and static search paths.
    pub use_microsites: bool,
}

/// A static files directory, optionally namespaced under a URL prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticDir {
    /// The prefix files are served under (e.g. `themes/stanford`).
    pub prefix: Option<String>,
    /// The directory on disk.
    pub path: PathBuf,
}

impl StaticDir {
    /// A static directory served without a prefix.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            prefix: None,
            path: path.into(),
        }
    }

    /// A static directory namespaced under `prefix`.
    pub fn prefixed(prefix: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            path: path.into(),
        }
    }
}

/// The complete set of application settings.
///
/// # Examples
///
/// ```
/// use lms_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert!(settings.microsite_root_dir.is_none());
/// assert!(settings.theme_name.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled.
    pub debug: bool,
    /// The secret key used for cryptographic signing.
    pub secret_key: String,
    /// The root of the deployment; themes live under `<env_root>/themes`.
    pub env_root: PathBuf,
    /// Feature switches.
    pub features: FeatureFlags,

    // ── Database ─────────────────────────────────────────────────────

    /// The database holding interaction records and opt-outs.
    pub database: DatabaseSettings,

    // ── Templates and static files ───────────────────────────────────

    /// Directories searched for templates, highest priority first.
    pub template_dirs: Vec<PathBuf>,
    /// Directories searched for static files.
    pub staticfiles_dirs: Vec<StaticDir>,
    /// Path of the favicon, relative to the static root.
    pub favicon_path: String,

    // ── Theming ──────────────────────────────────────────────────────

    /// Name of the custom theme under `<env_root>/themes`.
    pub theme_name: Option<String>,
    /// Root of a comprehensive theme; must exist when set.
    pub comprehensive_theme_dir: Option<PathBuf>,
    /// Directory holding per-microsite templates and static files.
    pub microsite_root_dir: Option<PathBuf>,

    // ── Internationalization ─────────────────────────────────────────

    /// Directories searched for translation catalogs, highest priority first.
    pub locale_paths: Vec<PathBuf>,
    /// Install directories of XBlock packages scanned for `translations/`.
    pub xblock_dirs: Vec<PathBuf>,

    // ── Auth ─────────────────────────────────────────────────────────

    /// Authentication backend paths, in order.
    pub authentication_backends: Vec<String>,
    /// Ordered list of middleware paths.
    pub middleware: Vec<String>,

    // ── Integrations ─────────────────────────────────────────────────

    /// Segment write key; analytics are disabled when absent or empty.
    pub lms_segment_key: Option<String>,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log level filter (e.g. "info", "lms_instructor=debug").
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Core
            debug: true,
            secret_key: String::new(),
            env_root: PathBuf::from("."),
            features: FeatureFlags {
                enable_instructor_queries: true,
                ..FeatureFlags::default()
            },

            // Database
            database: DatabaseSettings::default(),

            // Templates and static files
            template_dirs: vec![PathBuf::from("lms/templates")],
            staticfiles_dirs: vec![StaticDir::new("lms/static")],
            favicon_path: "images/favicon.ico".to_string(),

            // Theming
            theme_name: None,
            comprehensive_theme_dir: None,
            microsite_root_dir: None,

            // Internationalization
            locale_paths: vec![PathBuf::from("conf/locale")],
            xblock_dirs: Vec::new(),

            // Auth
            authentication_backends: vec!["lms.auth.backends.ModelBackend".to_string()],
            middleware: vec![
                "lms.middleware.RequestIdMiddleware".to_string(),
                "lms.middleware.SessionMiddleware".to_string(),
            ],

            // Integrations
            lms_segment_key: None,

            // Logging
            log_level: "info".to_string(),
        }
    }
}
