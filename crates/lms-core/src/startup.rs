//! Process startup.
//!
//! [`run`] takes the loaded [`Settings`], applies every one-time wiring step
//! (third-party auth, theming, microsites, mime types, locale discovery,
//! analytics, runtime services, runtime URLs) and returns an immutable
//! [`StartupContext`]. The context
//! is built exactly once and shared by reference, typically behind an `Arc`.
//!
//! ```
//! use lms_core::settings::Settings;
//! use lms_core::startup;
//!
//! let ctx = startup::run(Settings::default()).unwrap();
//! assert!(ctx.analytics().is_none());
//! assert_eq!(ctx.mime_types().get("woff"), Some("application/font-woff"));
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::LmsResult;
use crate::locale;
use crate::microsite;
use crate::runtime::RuntimeUrls;
use crate::services::{CreditService, InstructorService, ServiceRegistry};
use crate::settings::Settings;
use crate::theming::{self, TemplateLookup};

/// Authentication backend added when third-party auth is enabled.
pub const THIRD_PARTY_AUTH_BACKEND: &str = "lms.third_party_auth.backends.OAuth2Backend";

/// Middleware added when third-party auth is enabled.
pub const THIRD_PARTY_AUTH_MIDDLEWARE: &str =
    "lms.third_party_auth.middleware.ExceptionMiddleware";

/// Extension-to-type mappings registered at startup, without the leading dot.
const EXTRA_MIME_TYPES: &[(&str, &str)] = &[
    ("eot", "application/vnd.ms-fontobject"),
    ("otf", "application/x-font-opentype"),
    ("ttf", "application/x-font-ttf"),
    ("woff", "application/font-woff"),
    ("svg", "image/svg+xml"),
    ("vtt", "text/vtt"),
    ("srt", "application/x-subrip"),
];

/// Analytics client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsConfig {
    /// The Segment write key.
    pub write_key: String,
}

/// Mime types served by the application beyond the platform defaults.
#[derive(Debug, Clone, Default)]
pub struct MimeTypes {
    types: BTreeMap<String, String>,
}

impl MimeTypes {
    /// Registers `mime` for files ending in `.extension`.
    pub fn add_type(&mut self, mime: &str, extension: &str) {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        self.types.insert(extension, mime.to_string());
    }

    /// Looks up the mime type for an extension, with or without the dot.
    pub fn get(&self, extension: &str) -> Option<&str> {
        self.types
            .get(&extension.trim_start_matches('.').to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns the number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no type is registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// The result of process startup.
#[derive(Debug)]
pub struct StartupContext {
    settings: Settings,
    services: ServiceRegistry,
    analytics: Option<AnalyticsConfig>,
    mime_types: MimeTypes,
    theme_root: Option<PathBuf>,
    discovered_locales: Vec<PathBuf>,
    template_lookup: TemplateLookup,
    microsites_enabled: bool,
    runtime_urls: RuntimeUrls,
}

impl StartupContext {
    /// The settings after all startup wiring was applied.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The registered runtime services.
    pub const fn services(&self) -> &ServiceRegistry {
        &self.services
    }

    /// The analytics configuration, if a write key was configured.
    pub const fn analytics(&self) -> Option<&AnalyticsConfig> {
        self.analytics.as_ref()
    }

    /// The extra mime types registered at startup.
    pub const fn mime_types(&self) -> &MimeTypes {
        &self.mime_types
    }

    /// The custom theme root, if a custom theme was enabled.
    pub fn theme_root(&self) -> Option<&PathBuf> {
        self.theme_root.as_ref()
    }

    /// XBlock translation folders added to the locale paths.
    pub fn discovered_locales(&self) -> &[PathBuf] {
        &self.discovered_locales
    }

    /// Template directories searched by the page renderer.
    pub const fn template_lookup(&self) -> &TemplateLookup {
        &self.template_lookup
    }

    /// Returns `true` if the microsite root was wired into the lookup.
    pub const fn microsites_enabled(&self) -> bool {
        self.microsites_enabled
    }

    /// The XBlock handler and resource URL templates.
    pub const fn runtime_urls(&self) -> &RuntimeUrls {
        &self.runtime_urls
    }

    /// Wraps the context in an `Arc` for sharing across request handlers.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

/// Adds the third-party auth backend and middleware to the settings.
pub fn enable_third_party_auth(settings: &mut Settings) {
    if !settings
        .authentication_backends
        .iter()
        .any(|b| b == THIRD_PARTY_AUTH_BACKEND)
    {
        settings
            .authentication_backends
            .push(THIRD_PARTY_AUTH_BACKEND.to_string());
    }
    if !settings
        .middleware
        .iter()
        .any(|m| m == THIRD_PARTY_AUTH_MIDDLEWARE)
    {
        settings
            .middleware
            .push(THIRD_PARTY_AUTH_MIDDLEWARE.to_string());
    }
}

/// Builds the mime table registered at startup.
pub fn add_mimetypes() -> MimeTypes {
    let mut mime_types = MimeTypes::default();
    for (extension, mime) in EXTRA_MIME_TYPES {
        mime_types.add_type(mime, extension);
    }
    mime_types
}

/// Runs every startup step against `settings` and freezes the result.
///
/// # Errors
///
/// Fails if a configured comprehensive theme directory does not exist or an
/// XBlock translations folder cannot be read.
pub fn run(mut settings: Settings) -> LmsResult<StartupContext> {
    if settings.features.enable_third_party_auth {
        enable_third_party_auth(&mut settings);
    }

    // Theme paths must be in place before anything resolves templates.
    if let Some(theme_dir) = settings.comprehensive_theme_dir.clone() {
        theming::enable_comprehensive_theme(&mut settings, &theme_dir)?;
    }

    microsite::enable_microsites_pre_startup(&mut settings);

    // The template dirs are frozen here; later steps extend the lookup.
    let mut template_lookup = TemplateLookup::new(settings.template_dirs.clone());

    let mime_types = add_mimetypes();

    let discovered_locales = locale::enable_locale_discovery(&mut settings)?;

    let microsites_enabled = microsite::enable_microsites(&mut settings, &mut template_lookup);

    let theme_root = if settings.features.use_custom_theme {
        theming::enable_custom_theme(&mut settings, &mut template_lookup)
    } else {
        None
    };

    let analytics = settings
        .lms_segment_key
        .as_deref()
        .filter(|key| !key.is_empty())
        .map(|key| AnalyticsConfig {
            write_key: key.to_string(),
        });

    let mut services = ServiceRegistry::new();
    if settings.features.enable_special_exams {
        services.register(Arc::new(CreditService));
        services.register(Arc::new(InstructorService));
    }
    services.populate();

    let runtime_urls = RuntimeUrls::default();

    tracing::info!(
        debug = settings.debug,
        theme = settings.theme_name.as_deref().unwrap_or("-"),
        locale_paths = settings.locale_paths.len(),
        services = ?services.names(),
        analytics = analytics.is_some(),
        microsites = microsites_enabled,
        "startup complete"
    );

    Ok(StartupContext {
        settings,
        services,
        analytics,
        mime_types,
        theme_root,
        discovered_locales,
        template_lookup,
        microsites_enabled,
        runtime_urls,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LmsError;

    #[test]
    fn test_run_defaults() {
        let ctx = run(Settings::default()).unwrap();
        assert!(ctx.analytics().is_none());
        assert!(ctx.services().is_empty());
        assert!(ctx.services().is_ready());
        assert!(ctx.theme_root().is_none());
        assert!(ctx.discovered_locales().is_empty());
        assert!(!ctx.microsites_enabled());
        assert_eq!(ctx.settings().template_dirs, Settings::default().template_dirs);
        assert_eq!(ctx.template_lookup().dirs(), Settings::default().template_dirs);
    }

    #[test]
    fn test_mime_types() {
        let mime_types = add_mimetypes();
        assert_eq!(mime_types.len(), EXTRA_MIME_TYPES.len());
        assert_eq!(mime_types.get(".ttf"), Some("application/x-font-ttf"));
        assert_eq!(mime_types.get("EOT"), Some("application/vnd.ms-fontobject"));
        assert!(mime_types.get("exe").is_none());
    }

    #[test]
    fn test_third_party_auth() {
        let mut settings = Settings::default();
        settings.features.enable_third_party_auth = true;
        let ctx = run(settings).unwrap();

        let backends = &ctx.settings().authentication_backends;
        assert_eq!(backends.last().unwrap(), THIRD_PARTY_AUTH_BACKEND);
        assert!(ctx
            .settings()
            .middleware
            .contains(&THIRD_PARTY_AUTH_MIDDLEWARE.to_string()));
    }

    #[test]
    fn test_third_party_auth_idempotent() {
        let mut settings = Settings::default();
        enable_third_party_auth(&mut settings);
        enable_third_party_auth(&mut settings);
        let count = settings
            .authentication_backends
            .iter()
            .filter(|b| *b == THIRD_PARTY_AUTH_BACKEND)
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_analytics_key() {
        let settings = Settings {
            lms_segment_key: Some("write-key".to_string()),
            ..Settings::default()
        };
        let ctx = run(settings).unwrap();
        assert_eq!(ctx.analytics().unwrap().write_key, "write-key");

        let settings = Settings {
            lms_segment_key: Some(String::new()),
            ..Settings::default()
        };
        assert!(run(settings).unwrap().analytics().is_none());
    }

    #[test]
    fn test_special_exams_register_services() {
        let mut settings = Settings::default();
        settings.features.enable_special_exams = true;
        let ctx = run(settings).unwrap();
        assert_eq!(ctx.services().names(), vec!["credit", "instructor"]);
    }

    #[test]
    fn test_custom_theme_requires_feature() {
        let settings = Settings {
            theme_name: Some("stanford".to_string()),
            ..Settings::default()
        };
        let ctx = run(settings).unwrap();
        assert!(ctx.theme_root().is_none());
        assert_eq!(ctx.settings().favicon_path, "images/favicon.ico");
    }

    #[test]
    fn test_missing_comprehensive_theme_fails() {
        let settings = Settings {
            comprehensive_theme_dir: Some(PathBuf::from("/nonexistent/comprehensive")),
            ..Settings::default()
        };
        assert!(matches!(run(settings), Err(LmsError::ImproperlyConfigured(_))));
    }

    #[test]
    fn test_microsites_wired_before_and_after_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings {
            microsite_root_dir: Some(dir.path().to_path_buf()),
            ..Settings::default()
        };
        settings.features.use_microsites = true;

        let ctx = run(settings).unwrap();
        assert!(ctx.microsites_enabled());
        assert_eq!(ctx.settings().template_dirs.last().unwrap(), dir.path());
        assert_eq!(ctx.settings().staticfiles_dirs[0].path, dir.path());
        let occurrences = ctx
            .template_lookup()
            .dirs()
            .iter()
            .filter(|d| d.as_path() == dir.path())
            .count();
        assert_eq!(occurrences, 1);
    }

    #[test]
    fn test_missing_microsite_root_keeps_template_dir() {
        let mut settings = Settings {
            microsite_root_dir: Some(PathBuf::from("/nonexistent/microsites")),
            ..Settings::default()
        };
        settings.features.use_microsites = true;

        let ctx = run(settings).unwrap();
        assert!(!ctx.microsites_enabled());
        assert_eq!(
            ctx.template_lookup().dirs().last().unwrap(),
            &PathBuf::from("/nonexistent/microsites")
        );
        assert_eq!(ctx.settings().staticfiles_dirs, Settings::default().staticfiles_dirs);
    }

    #[test]
    fn test_custom_theme_leads_template_lookup() {
        let mut settings = Settings {
            env_root: PathBuf::from("/env"),
            theme_name: Some("red".to_string()),
            ..Settings::default()
        };
        settings.features.use_custom_theme = true;

        let ctx = run(settings).unwrap();
        assert_eq!(
            ctx.template_lookup().dirs()[0],
            PathBuf::from("/env/themes/red/templates")
        );
    }

    #[test]
    fn test_runtime_urls_installed() {
        let ctx = run(Settings::default()).unwrap();
        let urls = ctx.runtime_urls();
        assert_eq!(urls.handler_url_template(), crate::runtime::HANDLER_URL_TEMPLATE);
        assert_eq!(
            urls.handler_url("C", "b", "submit", None, false),
            "/courses/C/xblock/b/handler/submit"
        );
        assert_eq!(
            urls.local_resource_url("poll", "public/poll.css"),
            "/xblock/resource/poll/public/poll.css"
        );
    }
}
