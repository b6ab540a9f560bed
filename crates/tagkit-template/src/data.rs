//! The consolidated data registry and its template tag.
//!
//! Applications that render the same reusable values (navigation entries,
//! featured querysets, computed counts) across many templates can register
//! them once here instead of threading them through every view. An entry is
//! either a plain [`TagValue`] or a callable evaluated on each lookup, so
//! expensive lookups only run when a template actually asks for them.
//!
//! ## Examples
//!
//! ```
//! use tagkit_template::context::{Context, TagValue};
//! use tagkit_template::data::DataRegistry;
//!
//! let mut registry = DataRegistry::new();
//! registry.insert("site_name", TagValue::from("Bookshop"));
//! registry.insert_fn("double", |args| {
//!     let n = args.first().and_then(TagValue::as_integer).unwrap_or(0);
//!     TagValue::Integer(n * 2)
//! });
//!
//! let v = registry.resolve("site_name", &[]).unwrap();
//! assert_eq!(v.to_display_string(), "Bookshop");
//!
//! let v = registry.resolve("double", &[TagValue::Integer(21)]).unwrap();
//! assert_eq!(v, TagValue::Integer(42));
//!
//! // A trailing '>' injects the value into the context instead.
//! let mut ctx = Context::new();
//! registry.resolve_into(&mut ctx, "site_name>", &[]).unwrap();
//! assert_eq!(ctx.get("site_name").unwrap().to_display_string(), "Bookshop");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};

use tagkit_core::error::TagError;

use crate::context::{Context, TagValue};

/// A callable registry entry, evaluated on each lookup.
pub type DataFn = Arc<dyn Fn(&[TagValue]) -> TagValue + Send + Sync>;

/// An entry in a [`DataRegistry`]: a stored value or a callable.
#[derive(Clone)]
pub enum DataEntry {
    /// A plain value, returned as-is. Lookup arguments are ignored.
    Value(TagValue),
    /// A callable invoked with the lookup arguments.
    Callable(DataFn),
}

impl fmt::Debug for DataEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Callable(_) => f.write_str("Callable(..)"),
        }
    }
}

/// A registry of named values and callables shared across templates.
#[derive(Debug, Default)]
pub struct DataRegistry {
    entries: HashMap<String, DataEntry>,
}

impl DataRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registers a plain value under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: TagValue) {
        self.entries.insert(key.into(), DataEntry::Value(value));
    }

    /// Registers a callable under `key`.
    pub fn insert_fn<F>(&mut self, key: impl Into<String>, func: F)
    where
        F: Fn(&[TagValue]) -> TagValue + Send + Sync + 'static,
    {
        self.entries
            .insert(key.into(), DataEntry::Callable(Arc::new(func)));
    }

    /// Returns `true` if the registry has an entry with this key.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns all registered keys.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Resolves an entry: plain values are returned as-is (arguments are
    /// ignored), callables are invoked with `args`.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::UnknownDataKey`] if no entry exists for `key`.
    pub fn resolve(&self, key: &str, args: &[TagValue]) -> Result<TagValue, TagError> {
        let entry = self
            .entries
            .get(key)
            .ok_or_else(|| TagError::UnknownDataKey(key.to_string()))?;
        Ok(match entry {
            DataEntry::Value(v) => v.clone(),
            DataEntry::Callable(f) => f(args),
        })
    }

    /// The tag form of [`resolve`](Self::resolve).
    ///
    /// If `key` ends in `>`, the resolved value is injected into `ctx` under
    /// the stripped key and an empty safe string is returned, so the tag
    /// renders nothing. Otherwise the resolved value is returned for direct
    /// output.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::UnknownDataKey`] if no entry exists for the key.
    pub fn resolve_into(
        &self,
        ctx: &mut Context,
        key: &str,
        args: &[TagValue],
    ) -> Result<TagValue, TagError> {
        if let Some(stripped) = key.strip_suffix('>') {
            let value = self.resolve(stripped, args)?;
            ctx.set(stripped, value);
            return Ok(TagValue::SafeString(String::new()));
        }
        self.resolve(key, args)
    }

    /// The filter form of [`resolve`](Self::resolve), limited to at most one
    /// argument by filter syntax.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::UnknownDataKey`] if no entry exists for `key`.
    pub fn filter(&self, key: &str, arg: Option<&TagValue>) -> Result<TagValue, TagError> {
        match arg {
            Some(a) => self.resolve(key, std::slice::from_ref(a)),
            None => self.resolve(key, &[]),
        }
    }
}

/// Returns the global data registry.
///
/// This is a singleton that can be populated from anywhere in the
/// application (typically alongside model definitions at startup); the
/// `data` tag and `dataf` filter read from it.
pub fn global_data() -> &'static RwLock<DataRegistry> {
    static REGISTRY: OnceLock<RwLock<DataRegistry>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(DataRegistry::new()))
}

/// Convenience function to register a plain value in the global registry.
pub fn register_value(key: impl Into<String>, value: TagValue) {
    let mut reg = global_data().write().expect("data registry lock poisoned");
    reg.insert(key, value);
}

/// Convenience function to register a callable in the global registry.
pub fn register_fn<F>(key: impl Into<String>, func: F)
where
    F: Fn(&[TagValue]) -> TagValue + Send + Sync + 'static,
{
    let mut reg = global_data().write().expect("data registry lock poisoned");
    reg.insert_fn(key, func);
}

/// Convenience function to resolve a key against the global registry.
///
/// # Errors
///
/// Returns [`TagError::UnknownDataKey`] if no entry exists for `key`.
pub fn lookup(key: &str, args: &[TagValue]) -> Result<TagValue, TagError> {
    let reg = global_data().read().expect("data registry lock poisoned");
    reg.resolve(key, args)
}
