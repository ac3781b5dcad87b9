//! Keyboard navigation over a flattened option list.
//!
//! [`ListNavigator`] holds the output of
//! [`list_tree_items`](crate::model::list_tree_items) and tracks the
//! highlighted entry. Navigation wraps around and skips disabled entries.
//!
//! # Example
//!
//! ```
//! use carbure_select::model::{Normalized, normalize_items};
//! use carbure_select::widget::ListNavigator;
//!
//! let items = vec![("ETH", false), ("HVO", true), ("SAF", false)];
//! let normalize = |&(code, disabled): &(&'static str, bool)| Normalized::new(code, code).disabled(disabled);
//! let entries = normalize_items(&items, &normalize, None, None);
//!
//! let mut nav = ListNavigator::from_tree(&entries);
//! nav.move_next();
//! nav.move_next();
//! assert_eq!(nav.highlighted_value(), Some(&"SAF"));
//! ```

use carbure_core::Signal;
use carbure_core::logging::targets;

use crate::model::{NormalizedEntry, list_tree_items};

/// Highlight state over a flat option list.
pub struct ListNavigator<T, V> {
    entries: Vec<NormalizedEntry<T, V>>,
    highlighted: Option<usize>,
    /// Emitted with the new highlighted index.
    pub highlighted_changed: Signal<Option<usize>>,
}

impl<T: Clone, V: Clone> ListNavigator<T, V> {
    /// Navigate an already flat list.
    pub fn new(entries: Vec<NormalizedEntry<T, V>>) -> Self {
        Self {
            entries,
            highlighted: None,
            highlighted_changed: Signal::new(),
        }
    }

    /// Flatten a normalized tree and navigate it.
    pub fn from_tree(entries: &[NormalizedEntry<T, V>]) -> Self {
        Self::new(list_tree_items(entries))
    }

    /// Replace the entries, keeping the highlight if it is still valid.
    pub fn set_entries(&mut self, entries: Vec<NormalizedEntry<T, V>>) {
        self.entries = entries;
        if let Some(index) = self.highlighted {
            if !self.is_enabled(index) {
                self.set_highlighted_index(None);
            }
        }
    }

    /// The flat entries.
    pub fn entries(&self) -> &[NormalizedEntry<T, V>] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the highlighted entry.
    pub fn highlighted_index(&self) -> Option<usize> {
        self.highlighted
    }

    /// The highlighted entry.
    pub fn highlighted(&self) -> Option<&NormalizedEntry<T, V>> {
        self.highlighted.and_then(|index| self.entries.get(index))
    }

    /// Value of the highlighted entry.
    pub fn highlighted_value(&self) -> Option<&V> {
        self.highlighted().map(|entry| &entry.value)
    }

    /// Highlight `index`. Disabled or out-of-range indices are ignored.
    pub fn highlight(&mut self, index: usize) -> bool {
        if !self.is_enabled(index) {
            return false;
        }
        self.set_highlighted_index(Some(index));
        true
    }

    /// Remove the highlight.
    pub fn clear_highlight(&mut self) {
        self.set_highlighted_index(None);
    }

    /// Highlight the next enabled entry, wrapping to the top.
    pub fn move_next(&mut self) {
        let len = self.entries.len();
        let start = self.highlighted.map_or(0, |index| index + 1);
        let next = (0..len)
            .map(|offset| (start + offset) % len)
            .find(|&index| self.is_enabled(index));
        if next.is_some() {
            self.set_highlighted_index(next);
        }
    }

    /// Highlight the previous enabled entry, wrapping to the bottom.
    pub fn move_previous(&mut self) {
        let len = self.entries.len();
        let start = self.highlighted.unwrap_or(0) + len;
        let previous = (1..=len)
            .map(|offset| (start - offset) % len)
            .find(|&index| self.is_enabled(index));
        if previous.is_some() {
            self.set_highlighted_index(previous);
        }
    }

    /// Highlight the first enabled entry.
    pub fn move_first(&mut self) {
        if let Some(index) = (0..self.entries.len()).find(|&index| self.is_enabled(index)) {
            self.set_highlighted_index(Some(index));
        }
    }

    /// Highlight the last enabled entry.
    pub fn move_last(&mut self) {
        if let Some(index) = (0..self.entries.len()).rev().find(|&index| self.is_enabled(index)) {
            self.set_highlighted_index(Some(index));
        }
    }

    fn is_enabled(&self, index: usize) -> bool {
        self.entries.get(index).is_some_and(|entry| !entry.disabled)
    }

    fn set_highlighted_index(&mut self, index: Option<usize>) {
        if self.highlighted != index {
            self.highlighted = index;
            tracing::trace!(target: targets::WIDGET, ?index, "highlight moved");
            self.highlighted_changed.emit(index);
        }
    }
}

impl<T, V> std::fmt::Debug for ListNavigator<T, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListNavigator")
            .field("len", &self.entries.len())
            .field("highlighted", &self.highlighted)
            .finish()
    }
}
