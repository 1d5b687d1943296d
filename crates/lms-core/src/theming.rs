//! Theme path wiring.
//!
//! Two kinds of theme exist. A *comprehensive* theme is a directory mirroring
//! the application layout (`lms/templates`, `lms/static`, `lms/conf/locale`).
//! A *custom* theme lives under `<env_root>/themes/<theme_name>` and is
//! enabled by the `use_custom_theme` feature. Both rewrite search paths on
//! the [`Settings`] being assembled at startup; the custom theme also updates
//! the [`TemplateLookup`] built once the template dirs are frozen.

use std::path::{Path, PathBuf};

use crate::error::{LmsError, LmsResult};
use crate::settings::{Settings, StaticDir};

/// Inserts `path` at the front of `paths` unless it is already present.
pub(crate) fn prepend_unique(paths: &mut Vec<PathBuf>, path: PathBuf) -> bool {
    if paths.contains(&path) {
        return false;
    }
    paths.insert(0, path);
    true
}

/// Template directories searched by the page renderer, highest priority
/// first.
///
/// The lookup is seeded from `settings.template_dirs` once the early wiring
/// steps are done; later steps add to it directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateLookup {
    dirs: Vec<PathBuf>,
}

impl TemplateLookup {
    /// Creates a lookup over `dirs`.
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Adds `dir` at the front, or at the back unless `prepend` is set.
    /// A directory already present is moved rather than duplicated.
    pub fn add(&mut self, dir: PathBuf, prepend: bool) {
        self.dirs.retain(|d| d != &dir);
        if prepend {
            self.dirs.insert(0, dir);
        } else {
            self.dirs.push(dir);
        }
    }

    /// The directories in search order.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

/// Adds the search paths of a comprehensive theme.
///
/// Templates and locales from the theme take priority over the defaults;
/// static files are appended.
///
/// # Errors
///
/// Returns [`LmsError::ImproperlyConfigured`] if `theme_dir` is not a
/// directory.
pub fn enable_comprehensive_theme(settings: &mut Settings, theme_dir: &Path) -> LmsResult<()> {
    if !theme_dir.is_dir() {
        return Err(LmsError::ImproperlyConfigured(format!(
            "comprehensive theme directory '{}' does not exist",
            theme_dir.display()
        )));
    }

    let lms_dir = theme_dir.join("lms");
    prepend_unique(&mut settings.template_dirs, lms_dir.join("templates"));
    settings
        .staticfiles_dirs
        .push(StaticDir::new(lms_dir.join("static")));
    prepend_unique(&mut settings.locale_paths, lms_dir.join("conf").join("locale"));

    tracing::info!(theme_dir = %theme_dir.display(), "enabled comprehensive theme");
    Ok(())
}

/// Enables the custom theme named by `settings.theme_name`.
///
/// Only an exactly empty name counts as unset: it is normalized to `None` and
/// nothing else changes. Otherwise the favicon is pointed into the theme, the
/// theme's templates and locale directory are inserted first (even if already
/// listed further down), and its static files are namespaced under
/// `themes/<name>`. Returns the theme root when a theme was enabled.
pub fn enable_custom_theme(
    settings: &mut Settings,
    lookup: &mut TemplateLookup,
) -> Option<PathBuf> {
    let name = match settings.theme_name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            settings.theme_name = None;
            return None;
        }
    };

    settings.favicon_path = format!("themes/{name}/images/favicon.ico");

    let theme_root = settings.env_root.join("themes").join(&name);
    let templates = theme_root.join("templates");

    settings.template_dirs.insert(0, templates.clone());
    lookup.add(templates, true);
    settings.staticfiles_dirs.push(StaticDir::prefixed(
        format!("themes/{name}"),
        theme_root.join("static"),
    ));
    settings
        .locale_paths
        .insert(0, theme_root.join("conf").join("locale"));

    tracing::info!(theme = %name, root = %theme_root.display(), "enabled custom theme");
    Some(theme_root)
}
