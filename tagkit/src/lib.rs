//! # tagkit
//!
//! Template-layer helper utilities for server-rendered web applications.
//!
//! This is the meta-crate that re-exports the member crates for convenient
//! access. Depend on `tagkit` for everything, or on the individual crates
//! for finer-grained control.
//!
//! ```
//! use tagkit::template::pager::compute_page_window;
//!
//! let window = compute_page_window(100, 10, 5, 2).unwrap();
//! assert_eq!(window.total_pages, 10);
//! ```

/// Core types: errors, settings, and logging.
pub use tagkit_core as core;

/// Template helpers: value lookups, filters, pager, fragment registry.
pub use tagkit_template as template;
