//! Fragment cache registry.
//!
//! Caches rendered sub-template output keyed by a fragment name plus an
//! ordered list of distinguishing tokens, and records every fragment
//! identity it has seen. Because identities are recorded, cached content can
//! be invalidated on demand — by name, by token, or by arbitrary predicate —
//! instead of waiting for expiry or flushing the whole cache. When an object
//! that feeds cached markup changes, the application can clear exactly the
//! fragments that mention it.
//!
//! Storage is pluggable through [`FragmentStore`]; [`MemoryStore`] is the
//! built-in implementation. Durable stores are an integration concern and
//! live with the application.
//!
//! # Examples
//!
//! ```
//! use tagkit_template::fragments::FragmentRegistry;
//!
//! let registry = FragmentRegistry::in_memory();
//! let tokens = vec!["en".to_string(), "42".to_string()];
//!
//! let html = registry
//!     .get_or_render("sidebar", &tokens, None, || "<ul>...</ul>".to_string())
//!     .unwrap();
//! assert_eq!(html, "<ul>...</ul>");
//!
//! // Second call is served from the cache.
//! let html = registry
//!     .get_or_render("sidebar", &tokens, None, || unreachable!())
//!     .unwrap();
//! assert_eq!(html, "<ul>...</ul>");
//!
//! // The links changed: drop every cached fragment of this name.
//! assert_eq!(registry.invalidate("sidebar").unwrap(), 1);
//! ```

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use sha2::{Digest, Sha256};

use tagkit_core::error::TagResult;

/// The composite identity of a cached fragment: a name plus the ordered
/// tokens that distinguish one instance from another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FragmentKey {
    /// The fragment name (shared by all instances of one template block).
    pub name: String,
    /// Ordered distinguishing tokens (language, object id, ...).
    pub tokens: Vec<String>,
}

impl FragmentKey {
    /// Creates a new fragment key.
    pub fn new(name: impl Into<String>, tokens: Vec<String>) -> Self {
        Self {
            name: name.into(),
            tokens,
        }
    }

    /// Derives the store key for this fragment.
    ///
    /// Tokens are percent-encoded before joining so a `:` inside a token
    /// cannot collide with the separator, then digested with SHA-256 and
    /// base64-encoded (URL-safe, unpadded).
    pub fn cache_key(&self) -> String {
        let quoted: Vec<String> = self
            .tokens
            .iter()
            .map(|t| utf8_percent_encode(t, NON_ALPHANUMERIC).to_string())
            .collect();
        let digest = Sha256::digest(quoted.join(":").as_bytes());
        format!("fragments.{}.{}", self.name, URL_SAFE_NO_PAD.encode(digest))
    }
}

/// Metadata recorded for every fragment identity the registry has seen.
#[derive(Debug, Clone)]
pub struct FragmentRecord {
    /// The fragment name.
    pub name: String,
    /// The distinguishing tokens.
    pub tokens: Vec<String>,
    /// The derived store key.
    pub cache_key: String,
    /// When this fragment identity was first registered.
    pub created_at: DateTime<Utc>,
}

/// A backend for storing rendered fragment content.
pub trait FragmentStore: Send + Sync {
    /// Retrieves cached content by key.
    ///
    /// Returns `None` if the key does not exist or has expired.
    fn get(&self, key: &str) -> TagResult<Option<String>>;

    /// Stores content with an optional TTL. A `None` TTL never expires.
    fn set(&self, key: &str, content: String, ttl: Option<Duration>) -> TagResult<()>;

    /// Deletes cached content. Returns `true` if the key existed.
    fn delete(&self, key: &str) -> TagResult<bool>;

    /// Removes all entries from the store.
    fn clear(&self) -> TagResult<()>;
}

#[derive(Debug, Clone)]
struct StoreEntry {
    content: String,
    expires_at: Option<Instant>,
}

impl StoreEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() > exp)
    }
}

/// A thread-safe in-memory fragment store with TTL support.
///
/// Expired entries are treated as absent on read and cleaned up on the next
/// write to their key.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, StoreEntry>>,
}

impl MemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl FragmentStore for MemoryStore {
    fn get(&self, key: &str) -> TagResult<Option<String>> {
        let entries = self.entries.read().expect("fragment store lock poisoned");
        match entries.get(key) {
            Some(entry) if !entry.is_expired() => Ok(Some(entry.content.clone())),
            _ => Ok(None),
        }
    }

    fn set(&self, key: &str, content: String, ttl: Option<Duration>) -> TagResult<()> {
        let mut entries = self.entries.write().expect("fragment store lock poisoned");
        let expires_at = ttl.map(|d| Instant::now() + d);
        entries.insert(
            key.to_string(),
            StoreEntry {
                content,
                expires_at,
            },
        );
        Ok(())
    }

    fn delete(&self, key: &str) -> TagResult<bool> {
        let mut entries = self.entries.write().expect("fragment store lock poisoned");
        Ok(entries.remove(key).is_some())
    }

    fn clear(&self) -> TagResult<()> {
        let mut entries = self.entries.write().expect("fragment store lock poisoned");
        entries.clear();
        Ok(())
    }
}

/// Records fragment identities and delegates content storage to a
/// [`FragmentStore`].
pub struct FragmentRegistry {
    records: RwLock<HashMap<String, FragmentRecord>>,
    store: Box<dyn FragmentStore>,
}

impl FragmentRegistry {
    /// Creates a registry over the given store.
    pub fn new(store: Box<dyn FragmentStore>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            store,
        }
    }

    /// Creates a registry over a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    /// Returns cached content for the fragment, rendering and storing it on
    /// a miss. The fragment identity is recorded the first time it is seen.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn get_or_render<F>(
        &self,
        name: &str,
        tokens: &[String],
        ttl: Option<Duration>,
        render: F,
    ) -> TagResult<String>
    where
        F: FnOnce() -> String,
    {
        let key = FragmentKey::new(name, tokens.to_vec());
        let cache_key = key.cache_key();

        {
            let mut records = self.records.write().expect("fragment records lock poisoned");
            records.entry(cache_key.clone()).or_insert_with(|| {
                tracing::debug!(name, ?tokens, "registered fragment");
                FragmentRecord {
                    name: key.name.clone(),
                    tokens: key.tokens.clone(),
                    cache_key: cache_key.clone(),
                    created_at: Utc::now(),
                }
            });
        }

        if let Some(content) = self.store.get(&cache_key)? {
            tracing::debug!(name, "fragment cache hit");
            return Ok(content);
        }

        tracing::debug!(name, "fragment cache miss");
        let content = render();
        self.store.set(&cache_key, content.clone(), ttl)?;
        Ok(content)
    }

    /// Invalidates every fragment whose record matches the predicate,
    /// dropping the record and deleting the cached content. Returns the
    /// number of fragments invalidated.
    ///
    /// # Errors
    ///
    /// Propagates store failures; records invalidated before a failure stay
    /// removed.
    pub fn invalidate_matching<P>(&self, predicate: P) -> TagResult<usize>
    where
        P: Fn(&FragmentRecord) -> bool,
    {
        let removed: Vec<FragmentRecord> = {
            let mut records = self.records.write().expect("fragment records lock poisoned");
            let keys: Vec<String> = records
                .values()
                .filter(|r| predicate(r))
                .map(|r| r.cache_key.clone())
                .collect();
            keys.iter().filter_map(|k| records.remove(k)).collect()
        };

        for record in &removed {
            self.store.delete(&record.cache_key)?;
            tracing::debug!(name = %record.name, "invalidated fragment");
        }
        Ok(removed.len())
    }

    /// Invalidates every fragment registered under `name`.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn invalidate(&self, name: &str) -> TagResult<usize> {
        self.invalidate_matching(|r| r.name == name)
    }

    /// Invalidates every fragment whose token list contains `token`.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn invalidate_token(&self, token: &str) -> TagResult<usize> {
        self.invalidate_matching(|r| r.tokens.iter().any(|t| t == token))
    }

    /// Removes all records and cached content.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn clear(&self) -> TagResult<()> {
        let mut records = self.records.write().expect("fragment records lock poisoned");
        records.clear();
        self.store.clear()
    }

    /// Returns a snapshot of all registered fragments.
    pub fn records(&self) -> Vec<FragmentRecord> {
        let records = self.records.read().expect("fragment records lock poisoned");
        records.values().cloned().collect()
    }

    /// Returns the number of registered fragments.
    pub fn len(&self) -> usize {
        self.records
            .read()
            .expect("fragment records lock poisoned")
            .len()
    }

    /// Returns `true` if no fragments have been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
