//! Normalization of heterogeneous items into option entries.
//!
//! Every selection widget works on items of an arbitrary type `T`. A
//! *normalizer* maps an item to its canonical shape: a value identifying it,
//! a display label, a disabled flag and optional children (for grouped
//! option lists). The functions here apply a normalizer to a whole list,
//! optionally filtering and sorting it, and flatten the resulting tree for
//! display.
//!
//! # Example
//!
//! ```
//! use carbure_select::model::normalize::{normalize_items, denormalize_items, Normalized};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Feedstock {
//!     code: &'static str,
//!     name: &'static str,
//! }
//!
//! let items = vec![
//!     Feedstock { code: "COLZA", name: "Colza" },
//!     Feedstock { code: "BLE", name: "Blé" },
//! ];
//!
//! let normalize = |f: &Feedstock| Normalized::new(f.code, f.name);
//! let entries = normalize_items(&items, &normalize, None, None);
//!
//! assert_eq!(entries[1].label, "Blé");
//! assert_eq!(denormalize_items(&entries), items);
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use carbure_core::PerfSpan;

use super::collection::{LabelCollator, SortKey};

/// Default separator used by [`labelize`].
pub const LABEL_SEPARATOR: &str = ", ";

/// The canonical shape of an item, as produced by a normalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T, V> {
    /// Identity of the item.
    pub value: V,
    /// Display label.
    pub label: String,
    /// Whether the item can be chosen.
    pub disabled: bool,
    /// Nested items, for grouped lists.
    pub children: Option<Vec<T>>,
}

impl<T, V> Normalized<T, V> {
    /// An enabled leaf.
    pub fn new(value: V, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
            disabled: false,
            children: None,
        }
    }

    /// Set the disabled flag.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Attach child items.
    pub fn with_children(mut self, children: Vec<T>) -> Self {
        self.children = Some(children);
        self
    }
}

/// A normalized item together with the item it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEntry<T, V> {
    /// The original item.
    pub data: T,
    /// Identity of the item.
    pub value: V,
    /// Display label.
    pub label: String,
    /// Whether the item can be chosen.
    pub disabled: bool,
    /// Normalized children, for grouped lists.
    pub children: Option<Vec<NormalizedEntry<T, V>>>,
}

impl<T, V> NormalizedEntry<T, V> {
    /// Returns `true` if this entry has children (possibly none).
    pub fn is_group(&self) -> bool {
        self.children.is_some()
    }
}

/// A shareable normalizer.
pub type Normalizer<T, V> = Arc<dyn Fn(&T) -> Normalized<T, V> + Send + Sync>;

/// Wrap a closure as a [`Normalizer`].
pub fn normalizer<T, V, F>(f: F) -> Normalizer<T, V>
where
    F: Fn(&T) -> Normalized<T, V> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Entry filter applied by [`normalize_items`].
pub type EntryFilter<'a, T, V> = &'a dyn Fn(&NormalizedEntry<T, V>) -> bool;

/// Sort key extractor applied by [`normalize_items`].
pub type EntrySort<'a, T, V> = &'a dyn Fn(&NormalizedEntry<T, V>) -> SortKey;

/// A plain `{value, label}` option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Choice<V> {
    /// Identity of the option.
    pub value: V,
    /// Display label.
    pub label: String,
}

impl<V> Choice<V> {
    /// Create a choice.
    pub fn new(value: V, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }
}

/// Items that know how to normalize themselves.
///
/// Scalars are their own value and display as `to_string()`; a [`Choice`]
/// uses its value and label as-is.
pub trait DefaultNormalize: Sized {
    /// Identity type produced by the normalization.
    type Value;

    /// Normalize this item.
    fn normalize(&self) -> Normalized<Self, Self::Value>;
}

macro_rules! impl_default_normalize {
    ($($ty:ty),* $(,)?) => {
        $(
            impl DefaultNormalize for $ty {
                type Value = $ty;

                fn normalize(&self) -> Normalized<Self, Self::Value> {
                    Normalized::new(self.clone(), self.to_string())
                }
            }
        )*
    };
}

impl_default_normalize!(
    String, &'static str, bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128,
    usize, f32, f64,
);

impl<V: Clone> DefaultNormalize for Choice<V> {
    type Value = V;

    fn normalize(&self) -> Normalized<Self, V> {
        Normalized::new(self.value.clone(), self.label.clone())
    }
}

impl DefaultNormalize for Value {
    type Value = Value;

    /// Objects carrying both `value` and `label` use them (and honor
    /// `disabled` and `children` when present); anything else is its own
    /// value.
    fn normalize(&self) -> Normalized<Self, Value> {
        if let Value::Object(map) = self {
            if let (Some(value), Some(label)) = (map.get("value"), map.get("label")) {
                let disabled = map.get("disabled").and_then(Value::as_bool).unwrap_or(false);
                let normalized = Normalized::new(value.clone(), display_label(label)).disabled(disabled);
                return match map.get("children") {
                    Some(Value::Array(children)) => normalized.with_children(children.clone()),
                    _ => normalized,
                };
            }
        }
        Normalized::new(self.clone(), display_label(self))
    }
}

/// The default normalizer for `T`.
pub fn default_normalizer<T>() -> Normalizer<T, T::Value>
where
    T: DefaultNormalize + 'static,
{
    Arc::new(|item: &T| item.normalize())
}

/// Display text of a JSON value: strings unquoted, arrays comma-joined,
/// objects as an opaque placeholder.
pub fn display_label(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display_label(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
        other => other.to_string(),
    }
}

/// Normalize a list of items.
///
/// Children are normalized recursively. `filter` applies to top-level
/// entries only, so rejecting a group drops its whole subtree. Top-level
/// entries are then stable-sorted by the key returned by `sort`, text keys
/// using French collation.
pub fn normalize_items<T, V, N>(
    items: &[T],
    normalize: &N,
    filter: Option<EntryFilter<'_, T, V>>,
    sort: Option<EntrySort<'_, T, V>>,
) -> Vec<NormalizedEntry<T, V>>
where
    T: Clone,
    N: Fn(&T) -> Normalized<T, V> + ?Sized,
{
    let mut entries: Vec<NormalizedEntry<T, V>> = items
        .iter()
        .map(|item| normalize_item(item, normalize))
        .collect();

    if let Some(filter) = filter {
        entries.retain(|entry| filter(entry));
    }

    if let Some(sort) = sort {
        let _perf = PerfSpan::new("sort_entries");
        let collator = LabelCollator::french();
        let mut keyed: Vec<(SortKey, NormalizedEntry<T, V>)> =
            entries.into_iter().map(|entry| (sort(&entry), entry)).collect();
        keyed.sort_by(|(a, _), (b, _)| collator.compare_keys(a, b));
        entries = keyed.into_iter().map(|(_, entry)| entry).collect();
    }

    entries
}

fn normalize_item<T, V, N>(item: &T, normalize: &N) -> NormalizedEntry<T, V>
where
    T: Clone,
    N: Fn(&T) -> Normalized<T, V> + ?Sized,
{
    let normalized = normalize(item);
    NormalizedEntry {
        data: item.clone(),
        value: normalized.value,
        label: normalized.label,
        disabled: normalized.disabled,
        children: normalized.children.map(|children| {
            children
                .iter()
                .map(|child| normalize_item(child, normalize))
                .collect()
        }),
    }
}

/// Recover the original items of top-level entries, in entry order.
pub fn denormalize_items<T: Clone, V>(entries: &[NormalizedEntry<T, V>]) -> Vec<T> {
    entries.iter().map(|entry| entry.data.clone()).collect()
}

/// Flatten a normalized tree depth-first for display.
///
/// A group is emitted followed by its flattened descendants, minus the
/// disabled ones. A top-level leaf is always emitted, even when disabled.
pub fn list_tree_items<T: Clone, V: Clone>(
    entries: &[NormalizedEntry<T, V>],
) -> Vec<NormalizedEntry<T, V>> {
    let mut flat = Vec::new();
    for entry in entries {
        flat.push(entry.clone());
        if let Some(children) = &entry.children {
            flat.extend(
                list_tree_items(children)
                    .into_iter()
                    .filter(|child| !child.disabled),
            );
        }
    }
    flat
}

/// Join the labels of `items`, separated by `separator` (`", "` if `None`).
pub fn labelize<T, V, N>(items: &[T], normalize: &N, separator: Option<&str>) -> String
where
    N: Fn(&T) -> Normalized<T, V> + ?Sized,
{
    items
        .iter()
        .map(|item| normalize(item).label)
        .collect::<Vec<_>>()
        .join(separator.unwrap_or(LABEL_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq)]
    struct Site {
        id: u32,
        name: &'static str,
        closed: bool,
        depots: Vec<Site>,
    }

    fn site(id: u32, name: &'static str) -> Site {
        Site {
            id,
            name,
            closed: false,
            depots: Vec::new(),
        }
    }

    fn normalize_site(site: &Site) -> Normalized<Site, u32> {
        let normalized = Normalized::new(site.id, site.name).disabled(site.closed);
        if site.depots.is_empty() {
            normalized
        } else {
            normalized.with_children(site.depots.clone())
        }
    }

    #[test]
    fn test_normalize_denormalize_round_trip() {
        let items = vec![site(1, "Fos"), site(2, "Lavéra"), site(3, "Donges")];
        let entries = normalize_items(&items, &normalize_site, None, None);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].value, 2);
        assert_eq!(entries[1].label, "Lavéra");
        assert_eq!(denormalize_items(&entries), items);
    }

    #[test]
    fn test_filter_applies_to_top_level_only() {
        let mut group = site(10, "Sud");
        group.depots = vec![site(11, "Fos"), site(12, "Lavéra")];
        let items = vec![group, site(2, "Donges")];

        let keep_groups = |entry: &NormalizedEntry<Site, u32>| entry.is_group();
        let entries = normalize_items(&items, &normalize_site, Some(&keep_groups), None);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].children.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_sort_by_label_uses_french_order() {
        let items = vec![site(1, "Rouen"), site(2, "Évry"), site(3, "Dunkerque")];
        let by_label = |entry: &NormalizedEntry<Site, u32>| SortKey::Text(entry.label.clone());
        let entries = normalize_items(&items, &normalize_site, None, Some(&by_label));

        let labels: Vec<_> = entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Dunkerque", "Évry", "Rouen"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let items = vec![site(3, "A"), site(1, "B"), site(2, "C")];
        let constant = |_: &NormalizedEntry<Site, u32>| SortKey::Number(0.0);
        let entries = normalize_items(&items, &normalize_site, None, Some(&constant));

        let ids: Vec<_> = entries.iter().map(|e| e.value).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_default_normalizer_scalar() {
        let normalized = 5_i32.normalize();
        assert_eq!(normalized.value, 5);
        assert_eq!(normalized.label, "5");
        assert!(!normalized.disabled);
        assert!(normalized.children.is_none());
    }

    #[test]
    fn test_default_normalizer_value_label_object() {
        let item = json!({ "value": "a", "label": "Apple" });
        let normalized = item.normalize();
        assert_eq!(normalized.value, json!("a"));
        assert_eq!(normalized.label, "Apple");

        let normalize = default_normalizer::<Choice<&str>>();
        let normalized = normalize(&Choice::new("a", "Apple"));
        assert_eq!(normalized.value, "a");
        assert_eq!(normalized.label, "Apple");
    }

    #[test]
    fn test_default_normalizer_plain_json() {
        assert_eq!(json!(5).normalize().label, "5");
        assert_eq!(json!("SAF").normalize().label, "SAF");
        assert_eq!(json!([1, null, "x"]).normalize().label, "1,,x");
        assert_eq!(json!({ "id": 1 }).normalize().label, "[object Object]");

        let only_value = json!({ "value": 1 });
        assert_eq!(only_value.normalize().value, only_value);
    }

    #[test]
    fn test_json_groups() {
        let items = vec![json!({
            "value": "eu",
            "label": "Europe",
            "children": [
                { "value": "fr", "label": "France" },
                { "value": "de", "label": "Allemagne", "disabled": true },
            ],
        })];

        let normalize = default_normalizer::<Value>();
        let entries = normalize_items(&items, normalize.as_ref(), None, None);
        let flat = list_tree_items(&entries);

        let labels: Vec<_> = flat.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Europe", "France"]);
    }

    #[test]
    fn test_list_tree_items_drops_disabled_children_only() {
        let mut closed = site(3, "Closed");
        closed.closed = true;
        let mut closed_child = site(12, "Closed child");
        closed_child.closed = true;

        let mut group = site(10, "Group");
        group.depots = vec![site(11, "Open child"), closed_child];
        let items = vec![group, closed, site(4, "Open")];

        let entries = normalize_items(&items, &normalize_site, None, None);
        let flat = list_tree_items(&entries);

        let ids: Vec<_> = flat.iter().map(|e| e.value).collect();
        assert_eq!(ids, vec![10, 11, 3, 4]);
    }

    #[test]
    fn test_list_tree_items_nested_groups() {
        let mut inner = site(20, "Inner");
        inner.depots = vec![site(21, "Leaf")];
        let mut outer = site(10, "Outer");
        outer.depots = vec![inner];

        let entries = normalize_items(&[outer], &normalize_site, None, None);
        let ids: Vec<_> = list_tree_items(&entries).iter().map(|e| e.value).collect();
        assert_eq!(ids, vec![10, 20, 21]);
    }

    #[test]
    fn test_labelize() {
        let items = vec![site(1, "Fos"), site(2, "Donges")];
        assert_eq!(labelize(&items, &normalize_site, None), "Fos, Donges");
        assert_eq!(labelize(&items, &normalize_site, Some(" / ")), "Fos / Donges");
        assert_eq!(labelize(&[], &normalize_site, None), "");
    }
}
