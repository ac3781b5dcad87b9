//! Free-text input completed from an option list.

use serde::Serialize;

use carbure_core::logging::targets;
use carbure_core::{Result, Signal, State};

use super::dropdown::Dropdown;
use super::visible_options;
use crate::model::{AsyncList, NormalizedEntry, matches_value};

/// Text input with a suggestion dropdown.
///
/// Searchable lists are queried with the typed text; other lists are
/// filtered locally by label.
pub struct Autocomplete<T, V> {
    list: AsyncList<T, V>,
    value: State<Option<V>>,
    dropdown: Dropdown,
    query: String,
    /// Emitted when a suggestion is chosen.
    pub value_changed: Signal<Option<V>>,
}

impl<T, V> Autocomplete<T, V>
where
    T: Clone + Send + Sync + 'static,
    V: Serialize + Clone + PartialEq + Send + Sync + 'static,
{
    /// An autocomplete managing its own value.
    pub fn new(list: AsyncList<T, V>) -> Self {
        Self::with_state(list, State::uncontrolled(None))
    }

    /// An autocomplete whose value belongs to the caller.
    pub fn controlled<F>(list: AsyncList<T, V>, value: Option<V>, on_change: F) -> Self
    where
        F: Fn(Option<V>) + Send + Sync + 'static,
    {
        Self::with_state(list, State::controlled(value, on_change))
    }

    fn with_state(list: AsyncList<T, V>, value: State<Option<V>>) -> Self {
        Self {
            list,
            value,
            dropdown: Dropdown::new(),
            query: String::new(),
            value_changed: Signal::new(),
        }
    }

    /// The option list.
    pub fn list(&self) -> &AsyncList<T, V> {
        &self.list
    }

    /// The suggestion dropdown.
    pub fn dropdown(&self) -> &Dropdown {
        &self.dropdown
    }

    /// The chosen value.
    pub fn value(&self) -> Option<V> {
        self.value.get()
    }

    /// Apply a value pushed by a controlling parent.
    pub fn sync(&mut self, value: Option<V>) {
        self.value.sync(value);
    }

    /// The text typed so far.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Update the typed text and refresh suggestions.
    ///
    /// The dropdown opens when there is at least one suggestion and closes
    /// otherwise.
    pub async fn set_query(&mut self, query: impl Into<String>) -> Result<()> {
        self.query = query.into();
        if self.list.is_searchable() {
            self.list.execute(&self.query).await?;
        }

        if self.suggestions().is_empty() {
            self.dropdown.close();
        } else {
            self.dropdown.open();
        }
        Ok(())
    }

    /// Suggestions for the current text, flattened.
    pub fn suggestions(&self) -> Vec<NormalizedEntry<T, V>> {
        let search = if self.list.is_searchable() { "" } else { &self.query };
        visible_options(&self.list, search)
    }

    /// Choose a suggestion: the value is set and the text becomes its label.
    pub fn choose(&mut self, value: V) {
        let label = self
            .suggestions()
            .into_iter()
            .find(|entry| matches_value(&value, &entry.value, false))
            .map(|entry| entry.label);

        if let Some(label) = label {
            self.query = label;
        }

        tracing::debug!(target: targets::WIDGET, query = %self.query, "autocomplete suggestion chosen");
        let value = Some(value);
        self.value.set(value.clone());
        self.value_changed.emit(value);
        self.dropdown.close();
    }

    /// Clear both the text and the value.
    pub fn clear(&mut self) {
        self.query.clear();
        self.value.set(None);
        self.value_changed.emit(None);
        self.dropdown.close();
    }
}

impl<T, V: std::fmt::Debug> std::fmt::Debug for Autocomplete<T, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autocomplete")
            .field("query", &self.query)
            .field("value", &self.value)
            .field("dropdown", &self.dropdown)
            .finish()
    }
}
