//! Settings loading from configuration files.
//!
//! Provides functions to load [`Settings`] from TOML, and to apply
//! environment variable overrides on top of file-based configuration.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML file (overriding defaults; absent keys keep their
//!    defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `TAGKIT_DEBUG` | `debug` |
//! | `TAGKIT_LOG_LEVEL` | `log_level` |
//! | `TAGKIT_PAGER_ITEMS_PER_PAGE` | `pager.items_per_page` |
//! | `TAGKIT_PAGER_WINDOW_RADIUS` | `pager.window_radius` |
//! | `TAGKIT_PAGER_QUERY_PARAM` | `pager.query_param` |
//! | `TAGKIT_FRAGMENT_TTL_SECS` | `fragments.default_ttl_secs` |

use std::path::Path;

use crate::error::TagError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Fields not present in the TOML keep their default values.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or cannot be deserialized.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, TagError> {
    toml::from_str(toml_str).map_err(|e| TagError::Configuration(e.to_string()))
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, TagError> {
    let contents = std::fs::read_to_string(path)?;
    from_toml_str(&contents)
}

/// Loads settings from a TOML file and applies environment overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, TagError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Applies `TAGKIT_*` environment variable overrides to the given settings.
///
/// Unparseable numeric values are ignored rather than treated as errors, so
/// a stray environment variable cannot take the application down.
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(debug) = std::env::var("TAGKIT_DEBUG") {
        settings.debug = matches!(debug.to_lowercase().as_str(), "1" | "true" | "yes" | "on");
    }
    if let Ok(level) = std::env::var("TAGKIT_LOG_LEVEL") {
        settings.log_level = level;
    }
    if let Ok(per_page) = std::env::var("TAGKIT_PAGER_ITEMS_PER_PAGE") {
        if let Ok(n) = per_page.parse::<u64>() {
            settings.pager.items_per_page = n;
        }
    }
    if let Ok(radius) = std::env::var("TAGKIT_PAGER_WINDOW_RADIUS") {
        if let Ok(n) = radius.parse::<u64>() {
            settings.pager.window_radius = n;
        }
    }
    if let Ok(param) = std::env::var("TAGKIT_PAGER_QUERY_PARAM") {
        settings.pager.query_param = param;
    }
    if let Ok(ttl) = std::env::var("TAGKIT_FRAGMENT_TTL_SECS") {
        if let Ok(n) = ttl.parse::<u64>() {
            settings.fragments.default_ttl_secs = n;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml_str_full() {
        let toml = r#"
            debug = false
            log_level = "warn"

            [pager]
            items_per_page = 10
            window_radius = 2
            query_param = "p"
            previous_text = "Back"
            next_text = "More"

            [fragments]
            default_ttl_secs = 60
        "#;
        let s = from_toml_str(toml).unwrap();
        assert!(!s.debug);
        assert_eq!(s.log_level, "warn");
        assert_eq!(s.pager.items_per_page, 10);
        assert_eq!(s.pager.window_radius, 2);
        assert_eq!(s.pager.query_param, "p");
        assert_eq!(s.pager.previous_text, "Back");
        assert_eq!(s.pager.next_text, "More");
        assert_eq!(s.fragments.default_ttl_secs, 60);
    }

    #[test]
    fn test_from_toml_str_partial_keeps_defaults() {
        let toml = r#"
            [pager]
            items_per_page = 5
        "#;
        let s = from_toml_str(toml).unwrap();
        assert!(s.debug);
        assert_eq!(s.pager.items_per_page, 5);
        assert_eq!(s.pager.window_radius, 3);
        assert_eq!(s.pager.query_param, "page");
    }

    #[test]
    fn test_from_toml_str_empty() {
        let s = from_toml_str("").unwrap();
        assert_eq!(s.pager.items_per_page, 20);
    }

    #[test]
    fn test_from_toml_str_malformed() {
        let result = from_toml_str("pager = nonsense [");
        assert!(matches!(result, Err(TagError::Configuration(_))));
    }

    #[test]
    fn test_from_toml_file_missing() {
        let result = from_toml_file("/nonexistent/tagkit.toml");
        assert!(matches!(result, Err(TagError::Io(_))));
    }
}
