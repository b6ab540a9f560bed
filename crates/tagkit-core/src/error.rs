//! Error types for the tagkit helper library.
//!
//! Provides [`TagError`], the single error enum shared by all tagkit crates,
//! and the [`TagResult`] alias. Helpers are deliberately forgiving: most bad
//! input degrades to a neutral value rather than an error, so the variants
//! here cover genuine misuse (violated preconditions, unknown registry keys)
//! and infrastructure failures.

use thiserror::Error;

/// The primary error type for tagkit.
#[derive(Error, Debug)]
pub enum TagError {
    /// A caller violated a documented precondition (e.g. a zero page size).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A filter name was not found in the registry.
    #[error("Unknown filter: '{0}'")]
    UnknownFilter(String),

    /// A data key was not found in the data registry.
    #[error("Unknown data key: '{0}'")]
    UnknownDataKey(String),

    /// The fragment cache store failed.
    #[error("Fragment cache error: {0}")]
    FragmentCache(String),

    /// A configuration value is missing or malformed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience type alias for `Result<T, TagError>`.
pub type TagResult<T> = Result<T, TagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            TagError::InvalidArgument("page_size must be >= 1".into()).to_string(),
            "Invalid argument: page_size must be >= 1"
        );
        assert_eq!(
            TagError::UnknownFilter("frobnicate".into()).to_string(),
            "Unknown filter: 'frobnicate'"
        );
        assert_eq!(
            TagError::UnknownDataKey("novels".into()).to_string(),
            "Unknown data key: 'novels'"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: TagError = io_err.into();
        assert!(err.to_string().contains("file missing"));
    }
}
