//! Template context and dynamic values.
//!
//! Provides [`TagValue`] for representing dynamic template values, and
//! [`Context`] for holding the variables a tag injects. Tags receive the
//! context as an explicit parameter; there is no ambient per-request state.

use std::collections::HashMap;
use std::fmt;

/// Represents a dynamic value passed through template helpers.
///
/// Covers the value types that appear in server-rendered template contexts:
/// strings, numbers, booleans, lists, dictionaries, and the absence of a
/// value.
#[derive(Debug, Clone)]
pub enum TagValue {
    /// A string value, subject to auto-escaping by the rendering layer.
    String(String),
    /// A 64-bit integer.
    Integer(i64),
    /// A 64-bit floating point number.
    Float(f64),
    /// A boolean value.
    Bool(bool),
    /// An ordered list of values.
    List(Vec<TagValue>),
    /// A key-value mapping.
    Dict(HashMap<String, TagValue>),
    /// The absence of a value.
    None,
    /// A string marked as safe markup — auto-escaping will not be applied.
    SafeString(String),
}

impl TagValue {
    /// Returns `true` if this value is considered "truthy" in template logic.
    ///
    /// - `None` is falsy
    /// - Empty strings, empty lists, empty dicts are falsy
    /// - `Bool(false)` is falsy
    /// - `Integer(0)` and `Float(0.0)` are falsy
    /// - Everything else is truthy
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::None => false,
            Self::Bool(b) => *b,
            Self::Integer(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::String(s) | Self::SafeString(s) => !s.is_empty(),
            Self::List(l) => !l.is_empty(),
            Self::Dict(d) => !d.is_empty(),
        }
    }

    /// Converts this value to a display string (without HTML escaping).
    pub fn to_display_string(&self) -> String {
        match self {
            Self::String(s) | Self::SafeString(s) => s.clone(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => {
                if f.fract() == 0.0 {
                    format!("{f:.1}")
                } else {
                    f.to_string()
                }
            }
            Self::Bool(b) => {
                if *b {
                    "True".to_string()
                } else {
                    "False".to_string()
                }
            }
            Self::List(items) => {
                let inner: Vec<String> = items.iter().map(Self::to_repr).collect();
                format!("[{}]", inner.join(", "))
            }
            Self::Dict(map) => {
                let inner: Vec<String> = map
                    .iter()
                    .map(|(k, v)| format!("'{}': {}", k, v.to_repr()))
                    .collect();
                format!("{{{}}}", inner.join(", "))
            }
            Self::None => String::new(),
        }
    }

    /// Returns a quoted repr string, used when nesting inside lists/dicts.
    fn to_repr(&self) -> String {
        match self {
            Self::String(s) | Self::SafeString(s) => format!("'{s}'"),
            Self::None => "None".to_string(),
            other => other.to_display_string(),
        }
    }

    /// Returns `true` if this value is a safe string (auto-escaping bypassed).
    pub fn is_safe(&self) -> bool {
        matches!(self, Self::SafeString(_))
    }

    /// Marks a string value as safe, bypassing auto-escaping.
    #[must_use]
    pub fn mark_safe(self) -> Self {
        match self {
            Self::String(s) => Self::SafeString(s),
            other => other,
        }
    }

    /// Returns the length of a list, string, or dict.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::String(s) | Self::SafeString(s) => Some(s.len()),
            Self::List(l) => Some(l.len()),
            Self::Dict(d) => Some(d.len()),
            _ => None,
        }
    }

    /// Returns `true` if this is an empty collection or empty string.
    pub fn is_empty(&self) -> Option<bool> {
        self.len().map(|l| l == 0)
    }

    /// Attempts to convert this value to an i64.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Float(f) => Some(*f as i64),
            Self::String(s) | Self::SafeString(s) => s.parse::<i64>().ok(),
            Self::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Attempts to convert this value to an f64.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            Self::String(s) | Self::SafeString(s) => s.parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Returns the string contents if this is a String or SafeString.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::SafeString(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

impl PartialEq for TagValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(a), Self::String(b))
            | (Self::SafeString(a), Self::SafeString(b))
            | (Self::String(a), Self::SafeString(b))
            | (Self::SafeString(a), Self::String(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Integer(a), Self::Float(b)) | (Self::Float(b), Self::Integer(a)) => {
                (*a as f64) == *b
            }
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::None, Self::None) => true,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Dict(a), Self::Dict(b)) => a == b,
            _ => false,
        }
    }
}

// -- From implementations --

impl From<&str> for TagValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for TagValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i32> for TagValue {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<i64> for TagValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<u32> for TagValue {
    fn from(i: u32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<u64> for TagValue {
    fn from(i: u64) -> Self {
        Self::Integer(i as i64)
    }
}

impl From<usize> for TagValue {
    fn from(i: usize) -> Self {
        Self::Integer(i as i64)
    }
}

impl From<f64> for TagValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for TagValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<TagValue>> From<Vec<T>> for TagValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<TagValue>> From<HashMap<String, T>> for TagValue {
    fn from(m: HashMap<String, T>) -> Self {
        Self::Dict(m.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<TagValue>> From<Option<T>> for TagValue {
    fn from(o: Option<T>) -> Self {
        match o {
            Some(v) => v.into(),
            None => Self::None,
        }
    }
}

impl From<serde_json::Value> for TagValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::None,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    Self::Float(f)
                } else {
                    Self::None
                }
            }
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(arr) => {
                Self::List(arr.into_iter().map(TagValue::from).collect())
            }
            serde_json::Value::Object(map) => Self::Dict(
                map.into_iter()
                    .map(|(k, v)| (k, TagValue::from(v)))
                    .collect(),
            ),
        }
    }
}

/// A template context holding the variables tags read and inject.
///
/// # Examples
///
/// ```
/// use tagkit_template::context::{Context, TagValue};
///
/// let mut ctx = Context::new();
/// ctx.set("name", TagValue::from("tagkit"));
/// assert_eq!(ctx.get("name").unwrap().to_display_string(), "tagkit");
/// ```
#[derive(Debug, Default)]
pub struct Context {
    vars: HashMap<String, TagValue>,
}

impl Context {
    /// Creates a new empty context.
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }

    /// Sets a variable, replacing any previous value under the same name.
    pub fn set(&mut self, key: impl Into<String>, value: TagValue) {
        self.vars.insert(key.into(), value);
    }

    /// Looks up a variable.
    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.vars.get(key)
    }

    /// Returns `true` if the context contains a variable with this name.
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Removes a variable, returning its value if present.
    pub fn remove(&mut self, key: &str) -> Option<TagValue> {
        self.vars.remove(key)
    }

    /// Returns the number of variables in the context.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns `true` if the context holds no variables.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── TagValue ────────────────────────────────────────────────────

    #[test]
    fn test_truthiness() {
        assert!(!TagValue::None.is_truthy());
        assert!(!TagValue::from("").is_truthy());
        assert!(!TagValue::Integer(0).is_truthy());
        assert!(!TagValue::Float(0.0).is_truthy());
        assert!(!TagValue::Bool(false).is_truthy());
        assert!(!TagValue::List(vec![]).is_truthy());
        assert!(TagValue::from("x").is_truthy());
        assert!(TagValue::Integer(-1).is_truthy());
        assert!(TagValue::List(vec![TagValue::None]).is_truthy());
    }

    #[test]
    fn test_display_string() {
        assert_eq!(TagValue::from("abc").to_display_string(), "abc");
        assert_eq!(TagValue::Integer(7).to_display_string(), "7");
        assert_eq!(TagValue::Float(2.0).to_display_string(), "2.0");
        assert_eq!(TagValue::Float(2.5).to_display_string(), "2.5");
        assert_eq!(TagValue::Bool(true).to_display_string(), "True");
        assert_eq!(TagValue::None.to_display_string(), "");
        assert_eq!(
            TagValue::List(vec![TagValue::Integer(1), TagValue::from("a")])
                .to_display_string(),
            "[1, 'a']"
        );
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(TagValue::from("42").as_integer(), Some(42));
        assert_eq!(TagValue::Float(3.9).as_integer(), Some(3));
        assert_eq!(TagValue::from("nope").as_integer(), None);
        assert_eq!(TagValue::Integer(2).as_float(), Some(2.0));
        assert_eq!(TagValue::None.as_float(), None);
    }

    #[test]
    fn test_mark_safe() {
        let v = TagValue::from("<b>hi</b>").mark_safe();
        assert!(v.is_safe());
        // Non-strings pass through unchanged.
        assert!(!TagValue::Integer(1).mark_safe().is_safe());
    }

    #[test]
    fn test_len() {
        assert_eq!(TagValue::from("abc").len(), Some(3));
        assert_eq!(TagValue::List(vec![TagValue::None]).len(), Some(1));
        assert_eq!(TagValue::Integer(5).len(), None);
        assert_eq!(TagValue::from("").is_empty(), Some(true));
    }

    #[test]
    fn test_eq_mixed_numeric() {
        assert_eq!(TagValue::Integer(2), TagValue::Float(2.0));
        assert_eq!(TagValue::from("x"), TagValue::SafeString("x".into()));
        assert_ne!(TagValue::Integer(2), TagValue::from("2"));
    }

    #[test]
    fn test_from_json() {
        let json: serde_json::Value = serde_json::json!({
            "title": "Books",
            "count": 3,
            "tags": ["a", "b"],
            "missing": null
        });
        let v = TagValue::from(json);
        let TagValue::Dict(map) = v else {
            panic!("expected dict");
        };
        assert_eq!(map.get("title"), Some(&TagValue::from("Books")));
        assert_eq!(map.get("count"), Some(&TagValue::Integer(3)));
        assert_eq!(map.get("missing"), Some(&TagValue::None));
    }

    // ── Context ─────────────────────────────────────────────────────

    #[test]
    fn test_context_set_get() {
        let mut ctx = Context::new();
        assert!(ctx.is_empty());
        ctx.set("n", TagValue::Integer(1));
        assert_eq!(ctx.get("n"), Some(&TagValue::Integer(1)));
        assert!(ctx.contains("n"));
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn test_context_overwrite_and_remove() {
        let mut ctx = Context::new();
        ctx.set("n", TagValue::Integer(1));
        ctx.set("n", TagValue::Integer(2));
        assert_eq!(ctx.get("n"), Some(&TagValue::Integer(2)));
        assert_eq!(ctx.remove("n"), Some(TagValue::Integer(2)));
        assert!(!ctx.contains("n"));
    }
}
