//! Headless selection widgets.
//!
//! These widgets carry the state and behavior of the compliance front-end's
//! selection controls without rendering anything. A renderer reads their
//! state, forwards user input to their methods, and repaints when their
//! signals fire.
//!
//! # Widget Catalog
//!
//! - [`ListNavigator`]: keyboard highlight over a flattened option list
//! - [`Dropdown`]: open/closed state of a popup
//! - [`Select`]: one value out of an [`AsyncList`](crate::model::AsyncList)
//! - [`MultiSelect`]: any number of values, with tag removal
//! - [`Autocomplete`]: free text completed by suggestions
//! - [`TableState`]: column order, pagination, hidden columns and row selection
//! - [`Icon`]: an icon given either as a component or as a ready element
//!
//! Every widget with a value accepts it either controlled (owned by the
//! caller) or uncontrolled (owned by the widget), see
//! [`State`](carbure_core::State).

pub mod autocomplete;
pub mod dropdown;
pub mod icon;
pub mod list;
pub mod multi_select;
pub mod select;
pub mod table;

pub use autocomplete::Autocomplete;
pub use dropdown::Dropdown;
pub use icon::{Icon, IconProps, IconSize};
pub use list::ListNavigator;
pub use multi_select::MultiSelect;
pub use select::Select;
pub use table::{Direction, Order, TableState};

use serde::Serialize;

use crate::model::{AsyncList, NormalizedEntry, list_tree_items, normalize_items};

/// Normalize the list's current items, keep those whose label contains
/// `search` ignoring case, and flatten the result.
pub(crate) fn visible_options<T, V>(list: &AsyncList<T, V>, search: &str) -> Vec<NormalizedEntry<T, V>>
where
    T: Clone + Send + Sync + 'static,
    V: Serialize + Clone + Send + Sync + 'static,
{
    let items = list.items();
    let normalize = list.normalizer().as_ref();
    let needle = search.trim().to_lowercase();

    let entries = if needle.is_empty() {
        normalize_items(&items, normalize, None, None)
    } else {
        let filter = |entry: &NormalizedEntry<T, V>| entry.label.to_lowercase().contains(&needle);
        normalize_items(&items, normalize, Some(&filter), None)
    };

    list_tree_items(&entries)
}
