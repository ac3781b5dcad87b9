//! Option-list model for Carbure selection widgets.
//!
//! This module holds everything a selection widget needs besides rendering:
//!
//! - Structural matching of values that are equal but not identical
//! - Normalization of arbitrary items into `{value, label, disabled, children}`
//! - Selection reducers for single and multiple selection
//! - An async option list that loads, caches and resolves selected items
//!
//! # Core Types
//!
//! - `Normalized` / `NormalizedEntry`: the canonical option shape
//! - `Normalizer`: a shareable item-to-option mapping
//! - `SingleSelection` / `MultipleSelection`: reducers over borrowed state
//! - `AsyncList`: the option cache
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Items `T`  │────>│ Normalizer  │────>│   Entries   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!       ▲                                       │
//!       │         ┌─────────────┐               ▼
//!       └─────────│  AsyncList  │       ┌─────────────┐
//!                 │  (fetchers) │       │  Selection  │
//!                 └─────────────┘       │  + Matcher  │
//!                                       └─────────────┘
//! ```

pub mod async_list;
pub mod collection;
pub mod matcher;
pub mod normalize;
pub mod selection;

pub use async_list::{AsyncList, AsyncListBuilder, AsyncListState, ItemSource, LookupQuery};
pub use collection::{LabelCollator, SortKey, cache_key, dedupe_by_key, sorted_stringify};
pub use matcher::{matches, matches_value};
pub use normalize::{
    Choice, DefaultNormalize, EntryFilter, EntrySort, Normalized, NormalizedEntry, Normalizer,
    default_normalizer, denormalize_items, labelize, list_tree_items, normalize_items, normalizer,
};
pub use selection::{MultipleSelection, SingleSelection, multiple_selection, single_selection};
