//! Settings loading from configuration files.
//!
//! [`Settings`] can be loaded from TOML or JSON. Values found in the file are
//! deep-merged over [`Settings::default`], then environment overrides are
//! applied on top.
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `LMS_SECRET_KEY` | `secret_key` |
//! | `LMS_DEBUG` | `debug` |
//! | `LMS_LOG_LEVEL` | `log_level` |
//! | `LMS_DATABASE` | `database.name` |
//! | `LMS_ENV_ROOT` | `env_root` |
//! | `LMS_THEME_NAME` | `theme_name` |
//! | `LMS_SEGMENT_KEY` | `lms_segment_key` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use lms_core::settings_loader;
//!
//! let settings = settings_loader::from_file_with_env("lms.toml").unwrap();
//! ```

use std::path::{Path, PathBuf};

use crate::error::LmsError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Any fields not present in the TOML keep their default values.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, LmsError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| LmsError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a JSON string.
pub fn from_json_str(json_str: &str) -> Result<Settings, LmsError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| LmsError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;

    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a file, choosing the format by extension.
///
/// `.json` files are parsed as JSON; everything else as TOML.
pub fn from_file(path: impl AsRef<Path>) -> Result<Settings, LmsError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        LmsError::ConfigurationError(format!(
            "Failed to read settings file '{}': {e}",
            path.display()
        ))
    })?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        from_json_str(&content)
    } else {
        from_toml_str(&content)
    }
}

/// Loads settings from a file and then applies environment variable overrides.
pub fn from_file_with_env(path: impl AsRef<Path>) -> Result<Settings, LmsError> {
    let mut settings = from_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies `LMS_*` environment variable overrides to a settings struct.
///
/// `LMS_DEBUG` accepts "true"/"1"/"yes"; anything else disables debug.
/// An empty `LMS_THEME_NAME` or `LMS_SEGMENT_KEY` clears the setting.
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("LMS_SECRET_KEY") {
        settings.secret_key = val;
    }

    if let Ok(val) = std::env::var("LMS_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Ok(val) = std::env::var("LMS_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("LMS_DATABASE") {
        settings.database.name = val;
    }

    if let Ok(val) = std::env::var("LMS_ENV_ROOT") {
        settings.env_root = PathBuf::from(val);
    }

    if let Ok(val) = std::env::var("LMS_THEME_NAME") {
        settings.theme_name = non_empty(val);
    }

    if let Ok(val) = std::env::var("LMS_SEGMENT_KEY") {
        settings.lms_segment_key = non_empty(val);
    }
}

// ============================================================
// Helpers
// ============================================================

fn non_empty(val: String) -> Option<String> {
    if val.trim().is_empty() {
        None
    } else {
        Some(val)
    }
}

fn merge_over_defaults(value: serde_json::Value, format: &str) -> Result<Settings, LmsError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        LmsError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        LmsError::ConfigurationError(format!("Failed to deserialize settings from {format}: {e}"))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => serde_json::Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Deep-merges two JSON values. Objects merge key by key; anything else in
/// `override_val` replaces the base.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = match base_map.remove(&key) {
                    Some(base_v) => merge_json(base_v, override_v),
                    None => override_v,
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}
