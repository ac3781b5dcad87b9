//! Multi-value select, also backing tag groups.
//!
//! Tags are the removable chips showing the current selection; removing a
//! tag is [`MultiSelect::remove`].

use serde::Serialize;

use carbure_core::logging::targets;
use carbure_core::{Result, Signal, State};

use super::dropdown::Dropdown;
use super::visible_options;
use crate::model::{AsyncList, NormalizedEntry, matches_value, multiple_selection};

/// A select holding any number of values.
pub struct MultiSelect<T, V> {
    list: AsyncList<T, V>,
    value: State<Vec<V>>,
    dropdown: Dropdown,
    search: String,
    /// Emitted with the complete selection after every change.
    pub value_changed: Signal<Vec<V>>,
}

impl<T, V> MultiSelect<T, V>
where
    T: Clone + Send + Sync + 'static,
    V: Serialize + Clone + PartialEq + Send + Sync + 'static,
{
    /// A multi-select managing its own values, initially empty.
    pub fn new(list: AsyncList<T, V>) -> Self {
        Self::with_state(list, State::uncontrolled(Vec::new()))
    }

    /// A multi-select whose values belong to the caller.
    pub fn controlled<F>(list: AsyncList<T, V>, value: Vec<V>, on_change: F) -> Self
    where
        F: Fn(Vec<V>) + Send + Sync + 'static,
    {
        Self::with_state(list, State::controlled(value, on_change))
    }

    fn with_state(list: AsyncList<T, V>, value: State<Vec<V>>) -> Self {
        Self {
            list,
            value,
            dropdown: Dropdown::new(),
            search: String::new(),
            value_changed: Signal::new(),
        }
    }

    /// Set the initial values of an uncontrolled multi-select.
    pub fn with_value(mut self, value: Vec<V>) -> Self {
        if !self.value.is_controlled() {
            self.value = State::uncontrolled(value);
        }
        self
    }

    /// The option list.
    pub fn list(&self) -> &AsyncList<T, V> {
        &self.list
    }

    /// The dropdown state.
    pub fn dropdown(&self) -> &Dropdown {
        &self.dropdown
    }

    /// The selected values.
    pub fn value(&self) -> Vec<V> {
        self.value.get()
    }

    /// Apply values pushed by a controlling parent.
    pub fn sync(&mut self, value: Vec<V>) {
        self.value.sync(value);
    }

    /// Returns true if `value` matches a selected value.
    pub fn is_selected(&self, value: &V) -> bool {
        multiple_selection(Some(self.value.value().as_slice()), |_| {}).is_selected(Some(value))
    }

    /// Returns true if every enabled option is selected.
    ///
    /// Always false while no enabled option is loaded.
    pub fn is_all_selected(&self) -> bool {
        let values = self.enabled_values();
        if values.is_empty() {
            return false;
        }
        multiple_selection(Some(self.value.value().as_slice()), |_| {}).is_all_selected(&values)
    }

    /// Open the dropdown, loading options for remote lists.
    pub async fn open(&mut self) -> Result<()> {
        self.dropdown.open();
        if self.list.is_remote() {
            self.list.execute(&self.search).await?;
        }
        Ok(())
    }

    /// Close the dropdown.
    pub fn close(&mut self) {
        self.dropdown.close();
    }

    /// Change the search text.
    pub async fn set_search(&mut self, search: impl Into<String>) -> Result<()> {
        self.search = search.into();
        if self.list.is_searchable() {
            self.list.execute(&self.search).await?;
        }
        Ok(())
    }

    /// The options to display, flattened.
    pub fn options(&self) -> Vec<NormalizedEntry<T, V>> {
        let search = if self.list.is_searchable() { "" } else { &self.search };
        visible_options(&self.list, search)
    }

    /// Add `value` if absent, remove it otherwise. The dropdown stays open.
    pub fn toggle(&mut self, value: V) {
        let current = self.value.get();
        let mut next = None;
        multiple_selection(Some(current.as_slice()), |values| next = Some(values)).on_select(Some(value));
        self.apply(next);
    }

    /// Select every enabled option, or clear if all are already selected.
    ///
    /// Does nothing while no enabled option is loaded.
    pub fn toggle_all(&mut self) {
        let values = self.enabled_values();
        if values.is_empty() {
            tracing::trace!(target: targets::WIDGET, "no enabled option to toggle");
            return;
        }
        let current = self.value.get();
        let mut next = None;
        multiple_selection(Some(current.as_slice()), |selection| next = Some(selection)).on_select_all(values);
        self.apply(next);
    }

    /// Remove a value (tag removal).
    pub fn remove(&mut self, value: &V) {
        let next: Vec<V> = self
            .value
            .get()
            .into_iter()
            .filter(|selected| !matches_value(value, selected, false))
            .collect();
        self.apply(Some(next));
    }

    /// Clear the selection.
    pub fn clear(&mut self) {
        let current = self.value.get();
        let mut next = None;
        multiple_selection(Some(current.as_slice()), |values| next = Some(values)).on_select(None);
        self.apply(next);
    }

    /// Resolve the items of the selected values.
    pub async fn resolve(&self) -> Result<Vec<T>> {
        let values = self.value.get();
        self.list.resolve_selection(&values).await
    }

    /// Comma-separated labels of the selected values whose item is known.
    pub fn label(&self) -> String {
        self.list.label_for(self.value.value())
    }

    fn enabled_values(&self) -> Vec<V> {
        visible_options(&self.list, "")
            .into_iter()
            .filter(|entry| !entry.disabled)
            .map(|entry| entry.value)
            .collect()
    }

    fn apply(&mut self, next: Option<Vec<V>>) {
        if let Some(next) = next {
            tracing::debug!(target: targets::WIDGET, count = next.len(), "multi-select changed");
            self.value.set(next.clone());
            self.value_changed.emit(next);
        }
    }
}

impl<T, V: std::fmt::Debug> std::fmt::Debug for MultiSelect<T, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiSelect")
            .field("value", &self.value)
            .field("dropdown", &self.dropdown)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Normalized;

    #[derive(Debug, Clone, PartialEq)]
    struct Country {
        code: &'static str,
        name: &'static str,
        blocked: bool,
    }

    fn countries() -> Vec<Country> {
        vec![
            Country { code: "FR", name: "France", blocked: false },
            Country { code: "DE", name: "Allemagne", blocked: false },
            Country { code: "RU", name: "Russie", blocked: true },
        ]
    }

    fn multi_select() -> MultiSelect<Country, String> {
        let list = AsyncList::builder(|c: &Country| {
            Normalized::new(c.code.to_string(), c.name).disabled(c.blocked)
        })
        .items(countries())
        .build();
        MultiSelect::new(list)
    }

    #[test]
    fn test_toggle_twice_restores_selection() {
        let mut select = multi_select().with_value(vec!["FR".into()]);

        select.toggle("DE".into());
        assert_eq!(select.value(), vec!["FR".to_string(), "DE".to_string()]);

        select.toggle("DE".into());
        assert_eq!(select.value(), vec!["FR".to_string()]);
    }

    #[test]
    fn test_toggle_all_skips_disabled() {
        let mut select = multi_select();

        select.toggle_all();
        assert_eq!(select.value(), vec!["FR".to_string(), "DE".to_string()]);
        assert!(select.is_all_selected());

        select.toggle_all();
        assert!(select.value().is_empty());
    }

    #[test]
    fn test_remove_tag_and_clear() {
        let mut select = multi_select().with_value(vec!["FR".into(), "DE".into()]);
        let changes = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = changes.clone();
        select.value_changed.connect(move |_| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });

        select.remove(&"FR".to_string());
        assert_eq!(select.value(), vec!["DE".to_string()]);
        assert!(!select.is_selected(&"FR".to_string()));

        select.clear();
        assert!(select.value().is_empty());
        assert_eq!(changes.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_label_joins_resolved_items() {
        let select = multi_select().with_value(vec!["DE".into(), "FR".into()]);
        select.resolve().await.unwrap();
        assert_eq!(select.label(), "Allemagne, France");
    }

    #[tokio::test]
    async fn test_label_drops_unselected_values() {
        let mut select = multi_select().with_value(vec!["FR".into(), "DE".into()]);
        select.resolve().await.unwrap();

        select.toggle("DE".into());
        assert_eq!(select.label(), "France");

        select.toggle_all();
        assert_eq!(select.label(), "France, Allemagne");

        select.remove(&"FR".to_string());
        assert_eq!(select.label(), "Allemagne");

        select.clear();
        assert_eq!(select.label(), "");
    }

    #[test]
    fn test_toggle_all_without_options_keeps_selection() {
        let list = AsyncList::builder(|c: &Country| Normalized::new(c.code.to_string(), c.name))
            .get_items(carbure_core::fetch::get_items(|| async { Ok(countries()) }))
            .build();
        let mut select = MultiSelect::new(list).with_value(vec!["FR".to_string()]);

        assert!(!select.is_all_selected());
        select.toggle_all();
        assert_eq!(select.value(), vec!["FR".to_string()]);
    }
}
