//! Selection reducers.
//!
//! The selected value(s) of a widget are owned by the caller (often through a
//! [`carbure_core::State`]). These reducers borrow the current selection and a
//! setter, and answer membership questions with the structural
//! [`matches`](super::matcher::matches) relation rather than identity.
//!
//! # Example
//!
//! ```
//! use carbure_select::model::selection::multiple_selection;
//!
//! let current = vec![1, 2];
//! let mut next = None;
//!
//! let mut selection = multiple_selection(Some(current.as_slice()), |values| next = Some(values));
//! assert!(selection.is_selected(Some(&2)));
//!
//! selection.on_select(Some(2));
//! drop(selection);
//! assert_eq!(next, Some(vec![1]));
//! ```

use serde::Serialize;

use super::matcher::matches_value;

/// Single-selection reducer over a borrowed selection.
pub struct SingleSelection<'a, V, F> {
    selected: Option<&'a V>,
    on_select: F,
}

/// Build a single-selection reducer.
pub fn single_selection<V, F>(selected: Option<&V>, on_select: F) -> SingleSelection<'_, V, F>
where
    V: Serialize,
    F: FnMut(Option<V>),
{
    SingleSelection {
        selected,
        on_select,
    }
}

impl<'a, V, F> SingleSelection<'a, V, F>
where
    V: Serialize,
    F: FnMut(Option<V>),
{
    /// The current selection.
    pub fn selected(&self) -> Option<&'a V> {
        self.selected
    }

    /// Returns `true` if `value` matches the current selection.
    pub fn is_selected(&self, value: &V) -> bool {
        self.selected
            .is_some_and(|selected| matches_value(value, selected, false))
    }

    /// Forward a new selection to the setter.
    pub fn on_select(&mut self, value: Option<V>) {
        (self.on_select)(value);
    }
}

/// Multiple-selection reducer over a borrowed selection.
pub struct MultipleSelection<'a, V, F> {
    selected: Option<&'a [V]>,
    on_select: F,
}

/// Build a multiple-selection reducer.
///
/// The setter receives the complete new selection.
pub fn multiple_selection<V, F>(selected: Option<&[V]>, on_select: F) -> MultipleSelection<'_, V, F>
where
    V: Serialize + Clone,
    F: FnMut(Vec<V>),
{
    MultipleSelection {
        selected,
        on_select,
    }
}

impl<'a, V, F> MultipleSelection<'a, V, F>
where
    V: Serialize + Clone,
    F: FnMut(Vec<V>),
{
    /// The current selection.
    pub fn selected(&self) -> Option<&'a [V]> {
        self.selected
    }

    /// Returns `true` if `value` matches any selected value.
    ///
    /// An absent value or an absent selection is never selected.
    pub fn is_selected(&self, value: Option<&V>) -> bool {
        match (value, self.selected) {
            (Some(value), Some(selected)) => selected
                .iter()
                .any(|candidate| matches_value(value, candidate, false)),
            _ => false,
        }
    }

    /// Returns `true` if a selection exists and contains every value of
    /// `values`.
    pub fn is_all_selected(&self, values: &[V]) -> bool {
        self.selected.is_some() && values.iter().all(|value| self.is_selected(Some(value)))
    }

    /// Toggle a value.
    ///
    /// `None` clears the selection. A selected value is removed (every
    /// matching entry); any other value is appended.
    pub fn on_select(&mut self, value: Option<V>) {
        let Some(value) = value else {
            (self.on_select)(Vec::new());
            return;
        };

        let current = self.selected.unwrap_or_default();
        let next = if self.is_selected(Some(&value)) {
            current
                .iter()
                .filter(|candidate| !matches_value(&value, *candidate, false))
                .cloned()
                .collect()
        } else {
            let mut next = current.to_vec();
            next.push(value);
            next
        };
        (self.on_select)(next);
    }

    /// Clear when every value is already selected, otherwise select exactly
    /// `values`.
    pub fn on_select_all(&mut self, values: Vec<V>) {
        if self.is_all_selected(&values) {
            (self.on_select)(Vec::new());
        } else {
            (self.on_select)(values);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn toggle(current: Option<&[Value]>, value: Option<Value>) -> Vec<Value> {
        let mut next = None;
        multiple_selection(current, |values| next = Some(values)).on_select(value);
        next.unwrap()
    }

    fn toggle_all(current: Option<&[Value]>, values: Vec<Value>) -> Vec<Value> {
        let mut next = None;
        multiple_selection(current, |selection| next = Some(selection)).on_select_all(values);
        next.unwrap()
    }

    #[test]
    fn test_single_selection() {
        let selected = json!({ "id": 2, "name": "Fos" });
        let mut chosen = Vec::new();

        let mut selection = single_selection(Some(&selected), |value| chosen.push(value));
        assert!(selection.is_selected(&json!({ "id": 2 })));
        assert!(!selection.is_selected(&json!({ "id": 3 })));

        selection.on_select(Some(json!({ "id": 3 })));
        selection.on_select(None);
        drop(selection);

        assert_eq!(chosen, vec![Some(json!({ "id": 3 })), None]);
    }

    #[test]
    fn test_single_selection_without_selection() {
        let selection = single_selection(None::<&u32>, |_| {});
        assert!(!selection.is_selected(&1));
        assert!(selection.selected().is_none());
    }

    #[test]
    fn test_toggle_is_idempotent() {
        let start = vec![json!(1), json!({ "id": 2 })];

        let added = toggle(Some(start.as_slice()), Some(json!(3)));
        assert_eq!(added, vec![json!(1), json!({ "id": 2 }), json!(3)]);

        let removed = toggle(Some(added.as_slice()), Some(json!(3)));
        assert_eq!(removed, start);
    }

    #[test]
    fn test_toggle_removes_structural_matches() {
        let start = vec![json!({ "id": 2, "name": "a" }), json!(1), json!({ "id": 2, "name": "b" })];
        let next = toggle(Some(start.as_slice()), Some(json!({ "id": 2 })));
        assert_eq!(next, vec![json!(1)]);
    }

    #[test]
    fn test_toggle_without_selection_appends() {
        assert_eq!(toggle(None, Some(json!("ETH"))), vec![json!("ETH")]);
    }

    #[test]
    fn test_select_none_clears() {
        let start = vec![json!(1)];
        assert!(toggle(Some(start.as_slice()), None).is_empty());
    }

    #[test]
    fn test_is_selected_absent_value_or_selection() {
        let selection = multiple_selection(None::<&[u32]>, |_| {});
        assert!(!selection.is_selected(Some(&1)));
        assert!(!selection.is_all_selected(&[]));

        let current = [1_u32];
        let selection = multiple_selection(Some(&current[..]), |_| {});
        assert!(!selection.is_selected(None));
        assert!(selection.is_all_selected(&[]));
        assert!(selection.is_all_selected(&[1]));
        assert!(!selection.is_all_selected(&[1, 2]));
    }

    #[test]
    fn test_select_all_then_clear() {
        let values = vec![json!(1), json!(2), json!(3)];

        let all = toggle_all(Some(&[json!(2)][..]), values.clone());
        assert_eq!(all, values);

        let cleared = toggle_all(Some(all.as_slice()), values.clone());
        assert!(cleared.is_empty());
    }
}
