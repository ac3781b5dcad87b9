//! Carbure selection engine.
//!
//! Turns arbitrary domain items (depots, biofuels, entities, lots) into
//! uniform options, matches selected values against loaded items, and
//! drives headless selection widgets.
//!
//! # Example
//!
//! ```
//! use carbure_select::model::{Normalized, labelize, normalize_items};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Biofuel {
//!     code: &'static str,
//!     name: &'static str,
//! }
//!
//! let biofuels = vec![
//!     Biofuel { code: "ETH", name: "Éthanol" },
//!     Biofuel { code: "HVO", name: "HVO" },
//! ];
//! let normalize = |b: &Biofuel| Normalized::new(b.code, b.name);
//!
//! let entries = normalize_items(&biofuels, &normalize, None, None);
//! assert_eq!(entries[1].value, "HVO");
//! assert_eq!(labelize(&biofuels, &normalize, None), "Éthanol, HVO");
//! ```
//!
//! The re-exported core types (`Signal`, `State`, `InvalidationBus`, fetch
//! types) come from `carbure-core`.

pub mod model;
pub mod preferences;
pub mod widget;

pub use carbure_core::{
    FetchError, FetchFuture, FindItems, GetItems, InvalidationBus, OnChange, Result, Signal, State,
    Subscription, Topic,
};

pub use model::{
    AsyncList, AsyncListBuilder, AsyncListState, Choice, ItemSource, Normalized, NormalizedEntry,
    Normalizer, default_normalizer, matches, multiple_selection, normalize_items, single_selection,
};
pub use preferences::{Preferences, PreferencesError, PreferencesResult};
pub use widget::{Autocomplete, Dropdown, Icon, ListNavigator, MultiSelect, Select, TableState};
