//! Microsite path wiring.
//!
//! Microsites are per-organization skins kept under `microsite_root_dir`,
//! enabled by the `use_microsites` feature. The root is wired in two places:
//! the template dirs must learn about it before they are frozen into the
//! [`TemplateLookup`], and the lookup and static dirs afterwards.

use std::path::PathBuf;

use crate::settings::{Settings, StaticDir};
use crate::theming::TemplateLookup;

/// The microsite root resolved against `env_root`, if microsites are enabled.
pub fn microsite_root(settings: &Settings) -> Option<PathBuf> {
    if !settings.features.use_microsites {
        return None;
    }
    settings
        .microsite_root_dir
        .as_ref()
        .map(|dir| settings.env_root.join(dir))
}

/// Appends the microsite root to the template dirs.
///
/// Runs before the template lookup is built. Returns `true` if the root was
/// added.
pub fn enable_microsites_pre_startup(settings: &mut Settings) -> bool {
    let Some(root) = microsite_root(settings) else {
        return false;
    };
    if settings.template_dirs.contains(&root) {
        return false;
    }
    tracing::debug!(root = %root.display(), "microsite templates added");
    settings.template_dirs.push(root);
    true
}

/// Adds the microsite root to the template lookup and the static dirs.
///
/// Skipped with a warning when the root is not a directory. Returns `true`
/// if the root was wired.
pub fn enable_microsites(settings: &mut Settings, lookup: &mut TemplateLookup) -> bool {
    let Some(root) = microsite_root(settings) else {
        return false;
    };
    if !root.is_dir() {
        tracing::warn!(root = %root.display(), "microsite root is not a directory");
        return false;
    }

    lookup.add(root.clone(), false);
    if !settings.staticfiles_dirs.iter().any(|dir| dir.path == root) {
        settings.staticfiles_dirs.insert(0, StaticDir::new(root.clone()));
    }

    tracing::info!(root = %root.display(), "enabled microsites");
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn microsite_settings(root: PathBuf) -> Settings {
        let mut settings = Settings {
            microsite_root_dir: Some(root),
            ..Settings::default()
        };
        settings.features.use_microsites = true;
        settings
    }

    #[test]
    fn test_disabled_by_default() {
        let mut settings = Settings {
            microsite_root_dir: Some(PathBuf::from("microsites")),
            ..Settings::default()
        };
        assert!(microsite_root(&settings).is_none());
        assert!(!enable_microsites_pre_startup(&mut settings));
        assert!(!enable_microsites(&mut settings, &mut TemplateLookup::default()));
        assert_eq!(settings.template_dirs, Settings::default().template_dirs);
    }

    #[test]
    fn test_root_resolved_against_env_root() {
        let mut settings = microsite_settings(PathBuf::from("microsites"));
        settings.env_root = PathBuf::from("/edx/app/edxapp");
        assert_eq!(
            microsite_root(&settings),
            Some(PathBuf::from("/edx/app/edxapp/microsites"))
        );
    }

    #[test]
    fn test_pre_startup_appends_template_dir_once() {
        let mut settings = microsite_settings(PathBuf::from("/srv/microsites"));

        assert!(enable_microsites_pre_startup(&mut settings));
        assert!(!enable_microsites_pre_startup(&mut settings));
        assert_eq!(
            settings.template_dirs,
            vec![
                PathBuf::from("lms/templates"),
                PathBuf::from("/srv/microsites")
            ]
        );
    }

    #[test]
    fn test_enable_wires_lookup_and_static() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = microsite_settings(dir.path().to_path_buf());
        let mut lookup = TemplateLookup::new(vec![PathBuf::from("lms/templates")]);

        assert!(enable_microsites(&mut settings, &mut lookup));
        assert_eq!(lookup.dirs().last().unwrap(), dir.path());
        assert_eq!(settings.staticfiles_dirs[0].path, dir.path());

        assert!(enable_microsites(&mut settings, &mut lookup));
        assert_eq!(lookup.dirs().len(), 2);
        assert_eq!(settings.staticfiles_dirs.len(), 2);
    }

    #[test]
    fn test_enable_skips_missing_root() {
        let mut settings = microsite_settings(PathBuf::from("/nonexistent/microsites"));
        let mut lookup = TemplateLookup::default();

        assert!(!enable_microsites(&mut settings, &mut lookup));
        assert!(lookup.dirs().is_empty());
        assert_eq!(settings.staticfiles_dirs, Settings::default().staticfiles_dirs);
    }
}
