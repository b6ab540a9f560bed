//! # tagkit-core
//!
//! Core types for the tagkit helper library: error types, settings, and
//! logging. This crate has no dependency on the other tagkit crates and
//! provides the foundation they build on.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Settings structs and global configuration
//! - [`settings_loader`] - TOML loading and environment overrides
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{TagError, TagResult};
pub use settings::{FragmentSettings, PagerSettings, Settings, SETTINGS};
