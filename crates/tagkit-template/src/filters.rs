//! Built-in template filters.
//!
//! Value-lookup and formatting shortcuts for templates. Each filter is a
//! function registered in a [`FilterRegistry`]; [`default_registry`] returns
//! a singleton with all built-ins installed.
//!
//! Filters are forgiving: type mismatches pass the value through or degrade
//! to a neutral result rather than erroring, so a template never breaks on
//! unexpected data. The exception is `dataf`, which reports unknown registry
//! keys since a missing key is a wiring mistake rather than bad data.

use std::collections::HashMap;
use std::sync::OnceLock;

use tagkit_core::error::TagError;

use crate::context::TagValue;
use crate::data::global_data;

/// A template filter function.
///
/// Takes a value and optional arguments, and returns a transformed value.
pub trait Filter: Send + Sync {
    /// Returns the filter name.
    fn name(&self) -> &'static str;

    /// Applies the filter to a value with the given arguments.
    fn apply(&self, value: &TagValue, args: &[TagValue]) -> Result<TagValue, TagError>;
}

/// A registry of available template filters.
pub struct FilterRegistry {
    filters: HashMap<String, Box<dyn Filter>>,
}

impl FilterRegistry {
    /// Creates a new empty filter registry.
    pub fn new() -> Self {
        Self {
            filters: HashMap::new(),
        }
    }

    /// Registers a filter.
    pub fn register(&mut self, filter: Box<dyn Filter>) {
        self.filters.insert(filter.name().to_string(), filter);
    }

    /// Returns `true` if a filter with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Applies a named filter to a value.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::UnknownFilter`] if no filter with this name is
    /// registered, or the filter's own error.
    pub fn apply(
        &self,
        name: &str,
        value: &TagValue,
        args: &[TagValue],
    ) -> Result<TagValue, TagError> {
        let filter = self
            .filters
            .get(name)
            .ok_or_else(|| TagError::UnknownFilter(name.to_string()))?;
        filter.apply(value, args)
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the default filter registry with all built-in filters.
pub fn default_registry() -> &'static FilterRegistry {
    static REGISTRY: OnceLock<FilterRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut r = FilterRegistry::new();
        register_all(&mut r);
        r
    })
}

/// Registers all built-in filters.
fn register_all(r: &mut FilterRegistry) {
    r.register(Box::new(GetFilter));
    r.register(Box::new(ModFilter));
    r.register(Box::new(PartitionFilter));
    r.register(Box::new(SecondsToUnitsFilter));
    r.register(Box::new(DataLookupFilter));
}

/// `get` — dictionary lookup with a runtime key.
///
/// Template variable syntax only supports static keys; this filter covers
/// the case where the key itself is a variable. Missing keys and non-dict
/// values yield `None`.
struct GetFilter;
impl Filter for GetFilter {
    fn name(&self) -> &'static str {
        "get"
    }
    fn apply(&self, value: &TagValue, args: &[TagValue]) -> Result<TagValue, TagError> {
        let key = args
            .first()
            .map(TagValue::to_display_string)
            .unwrap_or_default();
        match value {
            TagValue::Dict(map) => Ok(map.get(&key).cloned().unwrap_or(TagValue::None)),
            _ => Ok(TagValue::None),
        }
    }
}

/// `mod` — arithmetic remainder.
///
/// Works on integers and floats; division by zero and non-numeric input
/// degrade to an empty string rather than erroring.
struct ModFilter;
impl Filter for ModFilter {
    fn name(&self) -> &'static str {
        "mod"
    }
    fn apply(&self, value: &TagValue, args: &[TagValue]) -> Result<TagValue, TagError> {
        let arg = args.first().unwrap_or(&TagValue::None);
        if let (TagValue::Integer(a), TagValue::Integer(b)) = (value, arg) {
            if *b != 0 {
                return Ok(TagValue::Integer(a % b));
            }
            return Ok(TagValue::String(String::new()));
        }
        match (value.as_float(), arg.as_float()) {
            (Some(a), Some(b)) if b != 0.0 => Ok(TagValue::Float(a % b)),
            _ => Ok(TagValue::String(String::new())),
        }
    }
}

/// `partition` — front-weighted split of a list into N groups.
///
/// Splitting an alphabetized list into columns this way keeps the reading
/// order intact top-to-bottom, left-to-right: earlier groups get the extra
/// items. `[0..10]` with 3 groups becomes `[[0,1,2,3], [4,5,6], [7,8,9]]`.
/// The group count defaults to 3; non-lists pass through unchanged.
struct PartitionFilter;
impl Filter for PartitionFilter {
    fn name(&self) -> &'static str {
        "partition"
    }
    fn apply(&self, value: &TagValue, args: &[TagValue]) -> Result<TagValue, TagError> {
        let TagValue::List(items) = value else {
            return Ok(value.clone());
        };
        let mut groups = args.first().and_then(TagValue::as_integer).unwrap_or(3);

        let mut result = Vec::new();
        let mut start = 0usize;
        while groups > 1 {
            let end = start + (items.len() - start).div_ceil(groups as usize);
            result.push(TagValue::List(items[start..end].to_vec()));
            start = end;
            groups -= 1;
        }
        result.push(TagValue::List(items[start..].to_vec()));
        Ok(TagValue::List(result))
    }
}

/// `seconds_to_units` — break a second count into meaningful units.
///
/// Returns a dict with `days`, `hours`, `minutes`, and `seconds` keys. Each
/// unit is only split out once the next-smaller one overflows, so 59 stays
/// as seconds and 90 becomes one minute and thirty seconds.
struct SecondsToUnitsFilter;
impl Filter for SecondsToUnitsFilter {
    fn name(&self) -> &'static str {
        "seconds_to_units"
    }
    fn apply(&self, value: &TagValue, _args: &[TagValue]) -> Result<TagValue, TagError> {
        let mut seconds = value.as_integer().unwrap_or(0);
        let mut minutes = 0;
        let mut hours = 0;
        let mut days = 0;
        if seconds > 59 {
            minutes = seconds / 60;
            seconds -= minutes * 60;
            if minutes > 59 {
                hours = minutes / 60;
                minutes -= hours * 60;
                if hours > 23 {
                    days = hours / 24;
                    hours -= days * 24;
                }
            }
        }
        let mut map = HashMap::new();
        map.insert("days".to_string(), TagValue::Integer(days));
        map.insert("hours".to_string(), TagValue::Integer(hours));
        map.insert("minutes".to_string(), TagValue::Integer(minutes));
        map.insert("seconds".to_string(), TagValue::Integer(seconds));
        Ok(TagValue::Dict(map))
    }
}

/// `dataf` — data-registry lookup in filter position.
///
/// The filtered value is the registry key; the single optional filter
/// argument is passed through to callable entries. Filter syntax caps this
/// at one argument — the `data` tag takes arbitrarily many.
struct DataLookupFilter;
impl Filter for DataLookupFilter {
    fn name(&self) -> &'static str {
        "dataf"
    }
    fn apply(&self, value: &TagValue, args: &[TagValue]) -> Result<TagValue, TagError> {
        let key = value.to_display_string();
        let reg = global_data().read().expect("data registry lock poisoned");
        reg.filter(&key, args.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::register_fn;

    fn apply_filter(name: &str, value: TagValue, args: Vec<TagValue>) -> TagValue {
        default_registry().apply(name, &value, &args).unwrap()
    }

    fn dict_of(pairs: &[(&str, TagValue)]) -> TagValue {
        TagValue::Dict(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect(),
        )
    }

    // ── get ─────────────────────────────────────────────────────────

    #[test]
    fn test_get_hit() {
        let d = dict_of(&[("title", TagValue::from("Dune"))]);
        let result = apply_filter("get", d, vec![TagValue::from("title")]);
        assert_eq!(result, TagValue::from("Dune"));
    }

    #[test]
    fn test_get_missing_key() {
        let d = dict_of(&[("title", TagValue::from("Dune"))]);
        let result = apply_filter("get", d, vec![TagValue::from("author")]);
        assert_eq!(result, TagValue::None);
    }

    #[test]
    fn test_get_non_dict() {
        let result = apply_filter("get", TagValue::Integer(3), vec![TagValue::from("x")]);
        assert_eq!(result, TagValue::None);
    }

    // ── mod ─────────────────────────────────────────────────────────

    #[test]
    fn test_mod_integers() {
        let result = apply_filter("mod", TagValue::Integer(7), vec![TagValue::Integer(3)]);
        assert_eq!(result, TagValue::Integer(1));
    }

    #[test]
    fn test_mod_floats() {
        let result = apply_filter("mod", TagValue::Float(7.5), vec![TagValue::Float(2.0)]);
        assert_eq!(result, TagValue::Float(1.5));
    }

    #[test]
    fn test_mod_mixed_numeric() {
        let result = apply_filter("mod", TagValue::Integer(7), vec![TagValue::Float(2.0)]);
        assert_eq!(result, TagValue::Float(1.0));
    }

    #[test]
    fn test_mod_by_zero_degrades() {
        let result = apply_filter("mod", TagValue::Integer(7), vec![TagValue::Integer(0)]);
        assert_eq!(result, TagValue::String(String::new()));
    }

    #[test]
    fn test_mod_non_numeric_degrades() {
        let result = apply_filter("mod", TagValue::from("seven"), vec![TagValue::Integer(2)]);
        assert_eq!(result, TagValue::String(String::new()));
    }

    // ── partition ───────────────────────────────────────────────────

    fn int_list(range: std::ops::Range<i64>) -> TagValue {
        TagValue::List(range.map(TagValue::Integer).collect())
    }

    fn group_lens(value: &TagValue) -> Vec<usize> {
        let TagValue::List(groups) = value else {
            panic!("expected a list of groups");
        };
        groups
            .iter()
            .map(|g| g.len().expect("expected list groups"))
            .collect()
    }

    #[test]
    fn test_partition_default_three_groups() {
        let result = apply_filter("partition", int_list(0..10), vec![]);
        assert_eq!(group_lens(&result), vec![4, 3, 3]);
        let TagValue::List(groups) = &result else {
            unreachable!();
        };
        assert_eq!(
            groups[0],
            TagValue::List(vec![
                TagValue::Integer(0),
                TagValue::Integer(1),
                TagValue::Integer(2),
                TagValue::Integer(3),
            ])
        );
    }

    #[test]
    fn test_partition_explicit_groups() {
        let result = apply_filter("partition", int_list(0..10), vec![TagValue::Integer(4)]);
        assert_eq!(group_lens(&result), vec![3, 3, 2, 2]);
    }

    #[test]
    fn test_partition_more_groups_than_items() {
        let result = apply_filter("partition", int_list(0..2), vec![TagValue::Integer(4)]);
        assert_eq!(group_lens(&result), vec![1, 1, 0, 0]);
    }

    #[test]
    fn test_partition_single_group() {
        let result = apply_filter("partition", int_list(0..5), vec![TagValue::Integer(1)]);
        assert_eq!(group_lens(&result), vec![5]);
    }

    #[test]
    fn test_partition_non_list_passes_through() {
        let result = apply_filter("partition", TagValue::from("abc"), vec![]);
        assert_eq!(result, TagValue::from("abc"));
    }

    // ── seconds_to_units ────────────────────────────────────────────

    fn unit(value: &TagValue, key: &str) -> i64 {
        let TagValue::Dict(map) = value else {
            panic!("expected dict");
        };
        map.get(key).and_then(TagValue::as_integer).unwrap()
    }

    #[test]
    fn test_seconds_to_units_below_minute() {
        let result = apply_filter("seconds_to_units", TagValue::Integer(59), vec![]);
        assert_eq!(unit(&result, "days"), 0);
        assert_eq!(unit(&result, "hours"), 0);
        assert_eq!(unit(&result, "minutes"), 0);
        assert_eq!(unit(&result, "seconds"), 59);
    }

    #[test]
    fn test_seconds_to_units_full_breakdown() {
        // 1 day, 1 hour, 1 minute, 1 second
        let result = apply_filter("seconds_to_units", TagValue::Integer(90_061), vec![]);
        assert_eq!(unit(&result, "days"), 1);
        assert_eq!(unit(&result, "hours"), 1);
        assert_eq!(unit(&result, "minutes"), 1);
        assert_eq!(unit(&result, "seconds"), 1);
    }

    #[test]
    fn test_seconds_to_units_exact_hour() {
        let result = apply_filter("seconds_to_units", TagValue::Integer(3600), vec![]);
        assert_eq!(unit(&result, "hours"), 1);
        assert_eq!(unit(&result, "minutes"), 0);
        assert_eq!(unit(&result, "seconds"), 0);
    }

    #[test]
    fn test_seconds_to_units_non_numeric() {
        let result = apply_filter("seconds_to_units", TagValue::from("soon"), vec![]);
        assert_eq!(unit(&result, "seconds"), 0);
    }

    // ── dataf ───────────────────────────────────────────────────────

    #[test]
    fn test_dataf_resolves_through_global_registry() {
        register_fn("test_dataf_triple", |args| {
            let n = args.first().and_then(TagValue::as_integer).unwrap_or(0);
            TagValue::Integer(n * 3)
        });
        let result = apply_filter(
            "dataf",
            TagValue::from("test_dataf_triple"),
            vec![TagValue::Integer(4)],
        );
        assert_eq!(result, TagValue::Integer(12));
    }

    #[test]
    fn test_dataf_unknown_key_errors() {
        let result = default_registry().apply(
            "dataf",
            &TagValue::from("test_dataf_no_such_key"),
            &[],
        );
        assert!(matches!(result, Err(TagError::UnknownDataKey(_))));
    }

    // ── registry ────────────────────────────────────────────────────

    #[test]
    fn test_unknown_filter() {
        let result = default_registry().apply("frobnicate", &TagValue::None, &[]);
        assert!(matches!(result, Err(TagError::UnknownFilter(_))));
    }

    #[test]
    fn test_default_registry_contents() {
        let r = default_registry();
        for name in ["get", "mod", "partition", "seconds_to_units", "dataf"] {
            assert!(r.contains(name), "missing filter {name}");
        }
    }
}
