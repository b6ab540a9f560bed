//! Settings for the tagkit helper library.
//!
//! Provides the [`Settings`] struct holding all configuration, and
//! [`LazySettings`], a globally-accessible, lazily-initialized settings
//! instance. Every helper also accepts its settings explicitly; the global is
//! a convenience for applications with a single configuration.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Configuration for the pagination widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PagerSettings {
    /// Items shown per page.
    pub items_per_page: u64,
    /// Page links shown on each side of the current page before collapsing
    /// into an ellipsis.
    pub window_radius: u64,
    /// The query-string parameter carrying the page number.
    pub query_param: String,
    /// Label text for the previous-page link.
    pub previous_text: String,
    /// Label text for the next-page link.
    pub next_text: String,
}

impl Default for PagerSettings {
    fn default() -> Self {
        Self {
            items_per_page: 20,
            window_radius: 3,
            query_param: "page".to_string(),
            previous_text: "\u{ab} Prev".to_string(),
            next_text: "Next \u{bb}".to_string(),
        }
    }
}

/// Configuration for the fragment cache registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FragmentSettings {
    /// Default time-to-live for cached fragments, in seconds.
    pub default_ttl_secs: u64,
}

impl Default for FragmentSettings {
    fn default() -> Self {
        Self {
            default_ttl_secs: 300,
        }
    }
}

/// The complete set of tagkit settings.
///
/// # Examples
///
/// ```
/// use tagkit_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert_eq!(settings.pager.items_per_page, 20);
/// assert_eq!(settings.pager.query_param, "page");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether debug mode is enabled (affects log formatting).
    pub debug: bool,
    /// The log level (e.g. "info", "debug", "warn").
    pub log_level: String,
    /// Pagination widget configuration.
    pub pager: PagerSettings,
    /// Fragment cache configuration.
    pub fragments: FragmentSettings,
    /// Custom settings that don't fit into the above categories.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            pager: PagerSettings::default(),
            fragments: FragmentSettings::default(),
            extra: HashMap::new(),
        }
    }
}

/// A lazily-initialized, globally-accessible settings container.
///
/// Call [`configure`](LazySettings::configure) once at startup to set the
/// settings, then use [`get`](LazySettings::get) to access them.
///
/// # Panics
///
/// [`get`](LazySettings::get) panics if settings have not been configured.
/// [`configure`](LazySettings::configure) panics if called more than once.
pub struct LazySettings {
    inner: OnceLock<Settings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the global settings. Must be called exactly once.
    ///
    /// # Panics
    ///
    /// Panics if settings have already been configured.
    pub fn configure(&self, settings: Settings) {
        self.inner
            .set(settings)
            .expect("Settings have already been configured");
    }

    /// Returns a reference to the configured settings.
    ///
    /// # Panics
    ///
    /// Panics if settings have not been configured.
    pub fn get(&self) -> &Settings {
        self.inner
            .get()
            .expect("Settings have not been configured. Call SETTINGS.configure() first.")
    }

    /// Returns `true` if settings have been configured.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
///
/// Call `SETTINGS.configure(settings)` once at application startup, then
/// access settings via `SETTINGS.get()` anywhere in the application.
pub static SETTINGS: LazySettings = LazySettings::new();
