//! XBlock translation discovery.
//!
//! Installed XBlock packages may ship their own catalogs in a
//! `translations/` folder. Every configured XBlock directory that has a
//! non-empty `translations/` folder is added to the front of the locale
//! search path.

use std::path::{Path, PathBuf};

use crate::error::LmsResult;
use crate::settings::Settings;
use crate::theming::prepend_unique;

/// Folder name where XBlocks keep their translations.
pub const LOCALE_FOLDER: &str = "translations";

/// Returns `true` if `path` is a directory with at least one entry.
fn is_non_empty_dir(path: &Path) -> LmsResult<bool> {
    if !path.is_dir() {
        return Ok(false);
    }
    Ok(std::fs::read_dir(path)?.next().is_some())
}

/// Prepends each XBlock's translations folder to `settings.locale_paths`.
///
/// Relative XBlock directories are resolved against `settings.env_root`.
/// Returns the paths that were added, in discovery order.
///
/// # Errors
///
/// Returns an I/O error if an existing translations folder cannot be listed.
pub fn enable_locale_discovery(settings: &mut Settings) -> LmsResult<Vec<PathBuf>> {
    let candidates: Vec<PathBuf> = settings
        .xblock_dirs
        .iter()
        .map(|dir| settings.env_root.join(dir).join(LOCALE_FOLDER))
        .collect();

    let mut added = Vec::new();
    for candidate in candidates {
        if !is_non_empty_dir(&candidate)? {
            tracing::trace!(path = %candidate.display(), "no xblock translations");
            continue;
        }
        if prepend_unique(&mut settings.locale_paths, candidate.clone()) {
            tracing::debug!(path = %candidate.display(), "discovered xblock translations");
            added.push(candidate);
        }
    }

    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xblock_with_translations(root: &Path, name: &str) -> PathBuf {
        let dir = root.join(name);
        let translations = dir.join(LOCALE_FOLDER).join("fr");
        std::fs::create_dir_all(&translations).unwrap();
        std::fs::write(translations.join("text.po"), "msgid \"\"\n").unwrap();
        dir
    }

    #[test]
    fn test_discovers_non_empty_translations() {
        let root = tempfile::tempdir().unwrap();
        let poll = xblock_with_translations(root.path(), "poll");

        let mut settings = Settings {
            xblock_dirs: vec![poll.clone()],
            ..Settings::default()
        };
        let added = enable_locale_discovery(&mut settings).unwrap();

        assert_eq!(added, vec![poll.join(LOCALE_FOLDER)]);
        assert_eq!(settings.locale_paths[0], poll.join(LOCALE_FOLDER));
    }

    #[test]
    fn test_skips_missing_and_empty_folders() {
        let root = tempfile::tempdir().unwrap();
        let empty = root.path().join("empty");
        std::fs::create_dir_all(empty.join(LOCALE_FOLDER)).unwrap();
        let missing = root.path().join("missing");

        let mut settings = Settings {
            xblock_dirs: vec![empty, missing],
            ..Settings::default()
        };
        let added = enable_locale_discovery(&mut settings).unwrap();

        assert!(added.is_empty());
        assert_eq!(settings.locale_paths, Settings::default().locale_paths);
    }

    #[test]
    fn test_relative_dirs_resolve_against_env_root() {
        let root = tempfile::tempdir().unwrap();
        xblock_with_translations(root.path(), "venv/src/drag-and-drop");

        let mut settings = Settings {
            env_root: root.path().to_path_buf(),
            xblock_dirs: vec![PathBuf::from("venv/src/drag-and-drop")],
            ..Settings::default()
        };
        let added = enable_locale_discovery(&mut settings).unwrap();

        assert_eq!(
            added,
            vec![root.path().join("venv/src/drag-and-drop").join(LOCALE_FOLDER)]
        );
    }

    #[test]
    fn test_duplicate_dirs_added_once() {
        let root = tempfile::tempdir().unwrap();
        let poll = xblock_with_translations(root.path(), "poll");

        let mut settings = Settings {
            xblock_dirs: vec![poll.clone(), poll],
            ..Settings::default()
        };
        let added = enable_locale_discovery(&mut settings).unwrap();

        assert_eq!(added.len(), 1);
        assert_eq!(settings.locale_paths.len(), 2);
    }
}
