//! Collection helpers: stable cache keys, deduplication and label ordering.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;

use icu::collator::options::CollatorOptions;
use icu::collator::{Collator, CollatorBorrowed};
use icu::locale::locale;
use serde::Serialize;
use serde_json::Value;

use carbure_core::logging::targets;

/// Serialize a JSON value with object keys in sorted order.
///
/// Two values differing only by key order produce the same string, which
/// makes the result usable as a cache key.
pub fn sorted_stringify(value: &Value) -> String {
    let mut out = String::new();
    write_sorted(value, &mut out);
    out
}

/// Serialize any value and return its [`sorted_stringify`] key.
pub fn cache_key<V: Serialize + ?Sized>(value: &V) -> serde_json::Result<String> {
    serde_json::to_value(value).map(|value| sorted_stringify(&value))
}

fn write_sorted(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                if let Some(inner) = map.get(key) {
                    write_sorted(inner, out);
                }
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_sorted(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Keep the first item for every key, preserving order.
pub fn dedupe_by_key<T, K, F>(items: impl IntoIterator<Item = T>, mut key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}

/// A sort key extracted from an entry.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    /// Compared with the label collator.
    Text(String),
    /// Compared numerically.
    Number(f64),
}

impl From<String> for SortKey {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for SortKey {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<f64> for SortKey {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for SortKey {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

/// Locale-aware label comparison.
///
/// Labels are French, so accents sort next to their base letter
/// (`"éthanol"` sorts between `"essence"` and `"gazole"`). Falls back to
/// byte order if the collation data is unavailable.
pub struct LabelCollator {
    collator: Option<CollatorBorrowed<'static>>,
}

impl LabelCollator {
    /// Collator for French labels.
    pub fn french() -> Self {
        let collator = match Collator::try_new(locale!("fr").into(), CollatorOptions::default()) {
            Ok(collator) => Some(collator),
            Err(err) => {
                tracing::warn!(target: targets::MODEL, error = ?err, "collator unavailable, using byte order");
                None
            }
        };
        Self { collator }
    }

    /// Compare two labels.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match &self.collator {
            Some(collator) => collator.compare(a, b),
            None => a.cmp(b),
        }
    }

    /// Compare two sort keys. Text keys order before numbers.
    pub fn compare_keys(&self, a: &SortKey, b: &SortKey) -> Ordering {
        match (a, b) {
            (SortKey::Text(a), SortKey::Text(b)) => self.compare(a, b),
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Less,
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Greater,
        }
    }
}

impl Default for LabelCollator {
    fn default() -> Self {
        Self::french()
    }
}

impl std::fmt::Debug for LabelCollator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelCollator")
            .field("collation", &self.collator.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sorted_stringify_ignores_key_order() {
        let a = json!({ "b": 1, "a": { "y": [1, 2], "x": null } });
        let b = json!({ "a": { "x": null, "y": [1, 2] }, "b": 1 });

        assert_eq!(sorted_stringify(&a), sorted_stringify(&b));
        assert_eq!(sorted_stringify(&a), r#"{"a":{"x":null,"y":[1,2]},"b":1}"#);
    }

    #[test]
    fn test_sorted_stringify_scalars() {
        assert_eq!(sorted_stringify(&json!("ETH")), r#""ETH""#);
        assert_eq!(sorted_stringify(&json!(2)), "2");
        assert_ne!(sorted_stringify(&json!(2)), sorted_stringify(&json!("2")));
    }

    #[test]
    fn test_cache_key() {
        #[derive(Serialize)]
        struct Depot {
            name: &'static str,
            id: u32,
        }

        let key = cache_key(&Depot { name: "Fos", id: 4 }).unwrap();
        assert_eq!(key, r#"{"id":4,"name":"Fos"}"#);
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let items = vec![("a", 1), ("b", 2), ("a", 3)];
        let deduped = dedupe_by_key(items, |(key, _)| *key);
        assert_eq!(deduped, vec![("a", 1), ("b", 2)]);
    }

    #[test]
    fn test_french_collation() {
        let collator = LabelCollator::french();
        let mut labels = vec!["gazole", "éthanol", "essence", "Biodiesel"];
        labels.sort_by(|a, b| collator.compare(a, b));
        assert_eq!(labels, vec!["Biodiesel", "essence", "éthanol", "gazole"]);
    }

    #[test]
    fn test_text_keys_before_numbers() {
        let collator = LabelCollator::french();
        let mut keys = vec![SortKey::from(2.0), SortKey::from("b"), SortKey::from(1_i64), SortKey::from("a")];
        keys.sort_by(|a, b| collator.compare_keys(a, b));
        assert_eq!(
            keys,
            vec![SortKey::from("a"), SortKey::from("b"), SortKey::Number(1.0), SortKey::Number(2.0)]
        );
    }
}
