//! Single-value select.
//!
//! # Example
//!
//! ```
//! use carbure_select::model::{AsyncList, Choice, default_normalizer};
//! use carbure_select::widget::Select;
//!
//! let list = AsyncList::builder_with(default_normalizer::<Choice<&str>>())
//!     .items(vec![Choice::new("ETH", "Éthanol"), Choice::new("HVO", "HVO")])
//!     .build();
//!
//! let mut select = Select::new(list);
//! select.choose(Some("ETH"));
//! assert_eq!(select.value(), Some("ETH"));
//! assert!(select.is_selected(&"ETH"));
//! ```

use serde::Serialize;

use carbure_core::logging::targets;
use carbure_core::{OnChange, Result, Signal, State};

use super::dropdown::Dropdown;
use super::visible_options;
use crate::model::{AsyncList, NormalizedEntry, single_selection};

/// A select holding at most one value.
pub struct Select<T, V> {
    list: AsyncList<T, V>,
    value: State<Option<V>>,
    dropdown: Dropdown,
    search: String,
    /// Emitted with every chosen value.
    pub value_changed: Signal<Option<V>>,
}

impl<T, V> Select<T, V>
where
    T: Clone + Send + Sync + 'static,
    V: Serialize + Clone + PartialEq + Send + Sync + 'static,
{
    /// A select managing its own value, initially empty.
    pub fn new(list: AsyncList<T, V>) -> Self {
        Self::with_state(list, State::uncontrolled(None))
    }

    /// A select whose value belongs to the caller.
    pub fn controlled<F>(list: AsyncList<T, V>, value: Option<V>, on_change: F) -> Self
    where
        F: Fn(Option<V>) + Send + Sync + 'static,
    {
        Self::with_state(list, State::controlled(value, on_change))
    }

    /// A select built from an optional controlled pair.
    pub fn from_parts(list: AsyncList<T, V>, controlled: Option<(Option<V>, OnChange<Option<V>>)>) -> Self {
        Self::with_state(list, State::from_parts(controlled, None))
    }

    fn with_state(list: AsyncList<T, V>, value: State<Option<V>>) -> Self {
        Self {
            list,
            value,
            dropdown: Dropdown::new(),
            search: String::new(),
            value_changed: Signal::new(),
        }
    }

    /// Set the initial value of an uncontrolled select.
    pub fn with_value(mut self, value: Option<V>) -> Self {
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

    /// The current value.
    pub fn value(&self) -> Option<V> {
        self.value.get()
    }

    /// Apply a value pushed by a controlling parent.
    pub fn sync(&mut self, value: Option<V>) {
        self.value.sync(value);
    }

    /// Returns true if `value` matches the current value.
    pub fn is_selected(&self, value: &V) -> bool {
        single_selection(self.value.value().as_ref(), |_| {}).is_selected(value)
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

    /// Current search text.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Change the search text.
    ///
    /// Searchable lists query the source again; other lists filter labels
    /// locally.
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

    /// Choose a value (or none) and close the dropdown.
    pub fn choose(&mut self, value: Option<V>) {
        let current = self.value.get();
        let mut next = None;
        single_selection(current.as_ref(), |value| next = Some(value)).on_select(value);

        if let Some(next) = next {
            tracing::debug!(target: targets::WIDGET, selected = next.is_some(), "select value chosen");
            self.value.set(next.clone());
            self.value_changed.emit(next);
        }
        self.dropdown.close();
    }

    /// Clear the value.
    pub fn clear(&mut self) {
        self.choose(None);
    }

    /// Resolve the item of the current value, so its label can render.
    pub async fn resolve(&self) -> Result<Vec<T>> {
        let values: Vec<V> = self.value.get().into_iter().collect();
        self.list.resolve_selection(&values).await
    }

    /// Label of the current value, once its item is known.
    pub fn label(&self) -> String {
        match self.value.value() {
            Some(value) => self.list.label_for(std::slice::from_ref(value)),
            None => String::new(),
        }
    }
}

impl<T, V: std::fmt::Debug> std::fmt::Debug for Select<T, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Select")
            .field("value", &self.value)
            .field("dropdown", &self.dropdown)
            .field("search", &self.search)
            .finish()
    }
}
