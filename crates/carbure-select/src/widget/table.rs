//! Table state: column order, pagination, hidden columns and row selection.
//!
//! Page size and hidden columns are user preferences. When a
//! [`Preferences`] store is attached they are read from and written to
//! `tables.{key}.page_size` and `tables.{key}.hidden_columns`.
//!
//! # Example
//!
//! ```
//! use carbure_select::widget::{Direction, TableState};
//!
//! let mut table: TableState<u32> = TableState::new("transfers");
//! table.toggle_order("volume");
//! assert_eq!(table.order().map(|o| o.direction), Some(Direction::Asc));
//!
//! table.set_page(3);
//! table.set_page_size(50);
//! assert_eq!(table.page(), 0);
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use carbure_core::logging::targets;
use carbure_core::{Signal, State};

use crate::model::{matches_value, multiple_selection};
use crate::preferences::Preferences;

/// Rows per page when no preference is stored.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Sort direction of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending order (A-Z, 0-9).
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

/// The column a table is sorted by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Order {
    /// Column key.
    pub column: String,
    /// Sort direction.
    pub direction: Direction,
}

impl Order {
    /// Ascending order on `column`.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Asc,
        }
    }

    /// Descending order on `column`.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Desc,
        }
    }
}

/// State of a paginated, sortable table whose rows are identified by `V`.
///
/// # Signals
///
/// - `order_changed(Option<Order>)`: after the sort order changes
/// - `page_changed(usize)`: after the page index changes
/// - `selection_changed(Vec<V>)`: after the row selection changes
pub struct TableState<V> {
    key: String,
    preferences: Option<Arc<Preferences>>,
    order: State<Option<Order>>,
    page: usize,
    page_size: usize,
    hidden_columns: Vec<String>,
    selection: Vec<V>,
    /// Emitted with the new sort order.
    pub order_changed: Signal<Option<Order>>,
    /// Emitted with the new page index.
    pub page_changed: Signal<usize>,
    /// Emitted with the selected rows after every change.
    pub selection_changed: Signal<Vec<V>>,
}

impl<V> TableState<V>
where
    V: Serialize + Clone + Send + Sync + 'static,
{
    /// A table with no stored preferences.
    pub fn new(key: impl Into<String>) -> Self {
        Self::with_order(key, State::uncontrolled(None))
    }

    /// A table whose sort order belongs to the caller.
    pub fn controlled<F>(key: impl Into<String>, order: Option<Order>, on_change: F) -> Self
    where
        F: Fn(Option<Order>) + Send + Sync + 'static,
    {
        Self::with_order(key, State::controlled(order, on_change))
    }

    fn with_order(key: impl Into<String>, order: State<Option<Order>>) -> Self {
        Self {
            key: key.into(),
            preferences: None,
            order,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            hidden_columns: Vec::new(),
            selection: Vec::new(),
            order_changed: Signal::new(),
            page_changed: Signal::new(),
            selection_changed: Signal::new(),
        }
    }

    /// Attach a preferences store, reading the stored page size and hidden
    /// columns.
    pub fn with_preferences(mut self, preferences: Arc<Preferences>) -> Self {
        self.page_size = preferences
            .get::<usize>(&self.page_size_path())
            .filter(|&size| size > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        self.hidden_columns = preferences
            .get::<Vec<String>>(&self.hidden_columns_path())
            .unwrap_or_default();
        self.preferences = Some(preferences);
        self
    }

    /// The table key used in preference paths.
    pub fn key(&self) -> &str {
        &self.key
    }

    // =========================================================================
    // Ordering
    // =========================================================================

    /// The current sort order.
    pub fn order(&self) -> Option<Order> {
        self.order.get()
    }

    /// Request a sort order.
    pub fn set_order(&mut self, order: Option<Order>) {
        if self.order.set(order.clone()) {
            tracing::debug!(target: targets::WIDGET, table = %self.key, ?order, "table order changed");
            self.order_changed.emit(order);
        }
    }

    /// Cycle the order of `column`: ascending, descending, then unsorted.
    ///
    /// A column other than the sorted one starts at ascending.
    pub fn toggle_order(&mut self, column: &str) {
        let next = match self.order.get() {
            Some(order) if order.column == column => match order.direction {
                Direction::Asc => Some(Order::desc(column)),
                Direction::Desc => None,
            },
            _ => Some(Order::asc(column)),
        };
        self.set_order(next);
    }

    /// Apply an order pushed by a controlling parent.
    pub fn sync_order(&mut self, order: Option<Order>) {
        self.order.sync(order);
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Zero-based page index.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Rows per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Go to `page`.
    pub fn set_page(&mut self, page: usize) {
        if self.page != page {
            self.page = page;
            self.page_changed.emit(page);
        }
    }

    /// Change the page size, store it, and go back to the first page.
    ///
    /// A size of zero is ignored.
    pub fn set_page_size(&mut self, page_size: usize) {
        if page_size == 0 {
            return;
        }
        self.page_size = page_size;
        if let Some(preferences) = &self.preferences {
            preferences.set_value(&self.page_size_path(), page_size.into());
        }
        self.set_page(0);
    }

    /// Number of pages needed for `total` rows (at least one).
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    /// Index of the first row of the current page.
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.page_size)
    }

    // =========================================================================
    // Columns
    // =========================================================================

    /// Keys of the hidden columns.
    pub fn hidden_columns(&self) -> &[String] {
        &self.hidden_columns
    }

    /// Returns true unless `column` is hidden.
    pub fn is_column_visible(&self, column: &str) -> bool {
        !self.hidden_columns.iter().any(|hidden| hidden == column)
    }

    /// Hide or show `column`, storing the result.
    pub fn set_column_hidden(&mut self, column: &str, hidden: bool) {
        let visible = self.is_column_visible(column);
        if hidden && visible {
            self.hidden_columns.push(column.to_string());
        } else if !hidden && !visible {
            self.hidden_columns.retain(|c| c != column);
        } else {
            return;
        }

        if let Some(preferences) = &self.preferences {
            let columns = self.hidden_columns.iter().cloned().map(Into::into).collect();
            preferences.set_value(&self.hidden_columns_path(), serde_json::Value::Array(columns));
        }
    }

    // =========================================================================
    // Row selection
    // =========================================================================

    /// The selected rows.
    pub fn selection(&self) -> &[V] {
        &self.selection
    }

    /// Returns true if `row` is selected.
    pub fn is_row_selected(&self, row: &V) -> bool {
        self.selection.iter().any(|selected| matches_value(row, selected, false))
    }

    /// Returns true if every row of `rows` is selected.
    pub fn is_all_rows_selected(&self, rows: &[V]) -> bool {
        multiple_selection(Some(self.selection.as_slice()), |_| {}).is_all_selected(rows)
    }

    /// Select `row`, or deselect it if already selected.
    pub fn toggle_row(&mut self, row: V) {
        let mut next = None;
        multiple_selection(Some(self.selection.as_slice()), |rows| next = Some(rows)).on_select(Some(row));
        self.apply_selection(next);
    }

    /// Select every row of `rows`, or clear if they all are selected.
    pub fn toggle_all_rows(&mut self, rows: Vec<V>) {
        let mut next = None;
        multiple_selection(Some(self.selection.as_slice()), |selection| next = Some(selection))
            .on_select_all(rows);
        self.apply_selection(next);
    }

    /// Deselect every row.
    pub fn clear_selection(&mut self) {
        if !self.selection.is_empty() {
            self.apply_selection(Some(Vec::new()));
        }
    }

    fn apply_selection(&mut self, next: Option<Vec<V>>) {
        if let Some(next) = next {
            self.selection = next.clone();
            self.selection_changed.emit(next);
        }
    }

    fn page_size_path(&self) -> String {
        format!("tables.{}.page_size", self.key)
    }

    fn hidden_columns_path(&self) -> String {
        format!("tables.{}.hidden_columns", self.key)
    }
}

impl<V: std::fmt::Debug> std::fmt::Debug for TableState<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableState")
            .field("key", &self.key)
            .field("order", &self.order)
            .field("page", &self.page)
            .field("page_size", &self.page_size)
            .field("hidden_columns", &self.hidden_columns)
            .field("selection", &self.selection)
            .finish()
    }
}
