//! Cache-aware async option list.
//!
//! [`AsyncList`] owns the option set a selection widget browses and keeps the
//! items matching the current selection resolved, so a selected value can be
//! labelled even when it is not part of the page or search result currently
//! displayed.
//!
//! Options come from exactly one [`ItemSource`]: a static vector, a fetcher
//! returning the whole set, or a search fetcher taking a query.
//!
//! # Example
//!
//! ```
//! use carbure_core::fetch::find_items;
//! use carbure_select::model::{AsyncList, Normalized};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Depot {
//!     id: u32,
//!     name: String,
//! }
//!
//! # tokio_test_block(async {
//! let list = AsyncList::builder(|depot: &Depot| Normalized::new(depot.id, depot.name.clone()))
//!     .find_items(find_items(|_query: String| async {
//!         Ok(vec![Depot { id: 2, name: "Fos".into() }])
//!     }))
//!     .build();
//!
//! list.resolve_selection(&[2]).await.unwrap();
//! assert_eq!(list.label(), "Fos");
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```
//!
//! # Loading and staleness
//!
//! While a fetch is in flight the previous items stay visible and
//! [`is_loading`](AsyncList::is_loading) is `true`. Every fetch and every
//! resolution takes a generation number; when a newer request was issued
//! before an older one completes, the older result is returned to its caller
//! but never published.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::future::join_all;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::Instrument;

use carbure_core::async_runtime::AsyncRuntime;
use carbure_core::fetch::{FindItems, GetItems};
use carbure_core::logging::{span_names, targets};
use carbure_core::{FetchError, InvalidationBus, Result, Signal, Subscription, Topic};

use super::collection::{cache_key, dedupe_by_key};
use super::normalize::{LABEL_SEPARATOR, Normalized, Normalizer, labelize};

/// Derives the search query used to look up a single selected value.
pub type LookupQuery<V> = Arc<dyn Fn(&V) -> String + Send + Sync>;

// ============================================================================
// Item Source
// ============================================================================

/// Where the options of an [`AsyncList`] come from.
pub enum ItemSource<T> {
    /// A fixed list, available synchronously.
    Static(Vec<T>),
    /// Fetches the complete option set.
    Get(GetItems<T>),
    /// Fetches the options matching a query.
    Find(FindItems<T>),
}

impl<T> std::fmt::Debug for ItemSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(items) => f.debug_tuple("Static").field(&items.len()).finish(),
            Self::Get(_) => f.write_str("Get"),
            Self::Find(_) => f.write_str("Find"),
        }
    }
}

enum Fetcher<T> {
    Get(GetItems<T>),
    Find(FindItems<T>),
}

// ============================================================================
// State
// ============================================================================

/// A snapshot of an [`AsyncList`].
#[derive(Debug, Clone, PartialEq)]
pub struct AsyncListState<T> {
    /// Whether a fetch or a resolution is in flight.
    pub loading: bool,
    /// The browsable option set.
    pub items: Vec<T>,
    /// Items resolved for the current selection, in selection order.
    pub selected_items: Option<Vec<T>>,
    /// Error of the last failed request, cleared by the next success.
    pub error: Option<FetchError>,
    /// Labels of `selected_items`, comma separated.
    pub label: String,
}

struct ListState<T> {
    fetching: bool,
    resolving: bool,
    items: Vec<T>,
    default_items: Vec<T>,
    selected_items: Option<Vec<T>>,
    error: Option<FetchError>,
    last_query: Option<String>,
}

struct Inner<T, V> {
    normalize: Normalizer<T, V>,
    fetcher: Option<Fetcher<T>>,
    lookup_query: Option<LookupQuery<V>>,
    state: Mutex<ListState<T>>,
    fetch_generation: AtomicU64,
    resolve_generation: AtomicU64,
    changed: Signal<()>,
}

/// Which in-flight request a [`PendingGuard`] tracks.
#[derive(Debug, Clone, Copy)]
enum Pending {
    Fetch,
    Resolve,
}

/// Clears the loading flag of a request whose future is dropped before it
/// completes, unless a newer request took over.
struct PendingGuard<'a, T, V> {
    inner: &'a Inner<T, V>,
    pending: Pending,
    generation: u64,
}

impl<T, V> Drop for PendingGuard<'_, T, V> {
    fn drop(&mut self) {
        let current = match self.pending {
            Pending::Fetch => self.inner.fetch_generation.load(Ordering::SeqCst),
            Pending::Resolve => self.inner.resolve_generation.load(Ordering::SeqCst),
        };
        if current != self.generation {
            return;
        }

        let cleared = {
            let mut state = self.inner.state.lock();
            let flag = match self.pending {
                Pending::Fetch => &mut state.fetching,
                Pending::Resolve => &mut state.resolving,
            };
            std::mem::replace(flag, false)
        };
        if cleared {
            tracing::debug!(target: targets::ASYNC_LIST, pending = ?self.pending, generation = self.generation, "request dropped before completion");
            self.inner.changed.emit(());
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`AsyncList`].
pub struct AsyncListBuilder<T, V> {
    normalize: Normalizer<T, V>,
    source: ItemSource<T>,
    default_items: Vec<T>,
    lookup_query: Option<LookupQuery<V>>,
}

impl<T, V> AsyncListBuilder<T, V>
where
    T: Clone + Send + Sync + 'static,
    V: Serialize + Clone + Send + Sync + 'static,
{
    /// Set the option source.
    pub fn source(mut self, source: ItemSource<T>) -> Self {
        self.source = source;
        self
    }

    /// Use a fixed option list.
    pub fn items(self, items: Vec<T>) -> Self {
        self.source(ItemSource::Static(items))
    }

    /// Fetch the whole option set on demand.
    pub fn get_items(self, get_items: GetItems<T>) -> Self {
        self.source(ItemSource::Get(get_items))
    }

    /// Fetch options matching a query on demand.
    pub fn find_items(self, find_items: FindItems<T>) -> Self {
        self.source(ItemSource::Find(find_items))
    }

    /// Items consulted when resolving selected values, before any fetch.
    pub fn default_items(mut self, items: Vec<T>) -> Self {
        self.default_items = items;
        self
    }

    /// Derive the query used to look up one missing selected value with a
    /// search fetcher. Without it every lookup uses the empty query.
    pub fn lookup_query<F>(mut self, f: F) -> Self
    where
        F: Fn(&V) -> String + Send + Sync + 'static,
    {
        self.lookup_query = Some(Arc::new(f));
        self
    }

    /// Build the list.
    pub fn build(self) -> AsyncList<T, V> {
        let (items, fetcher) = match self.source {
            ItemSource::Static(items) => (items, None),
            ItemSource::Get(get) => (Vec::new(), Some(Fetcher::Get(get))),
            ItemSource::Find(find) => (Vec::new(), Some(Fetcher::Find(find))),
        };

        AsyncList {
            inner: Arc::new(Inner {
                normalize: self.normalize,
                fetcher,
                lookup_query: self.lookup_query,
                state: Mutex::new(ListState {
                    fetching: false,
                    resolving: false,
                    items,
                    default_items: self.default_items,
                    selected_items: None,
                    error: None,
                    last_query: None,
                }),
                fetch_generation: AtomicU64::new(0),
                resolve_generation: AtomicU64::new(0),
                changed: Signal::new(),
            }),
        }
    }
}

// ============================================================================
// AsyncList
// ============================================================================

/// An option list with async loading and selected-value resolution.
///
/// Cloning is cheap; clones share the same state.
pub struct AsyncList<T, V> {
    inner: Arc<Inner<T, V>>,
}

impl<T, V> Clone for AsyncList<T, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, V> AsyncList<T, V>
where
    T: Clone + Send + Sync + 'static,
    V: Serialize + Clone + Send + Sync + 'static,
{
    /// Start building a list with the given normalizer.
    pub fn builder<F>(normalize: F) -> AsyncListBuilder<T, V>
    where
        F: Fn(&T) -> Normalized<T, V> + Send + Sync + 'static,
    {
        Self::builder_with(Arc::new(normalize))
    }

    /// Start building a list with a shared normalizer.
    pub fn builder_with(normalize: Normalizer<T, V>) -> AsyncListBuilder<T, V> {
        AsyncListBuilder {
            normalize,
            source: ItemSource::Static(Vec::new()),
            default_items: Vec::new(),
            lookup_query: None,
        }
    }

    /// The normalizer.
    pub fn normalizer(&self) -> &Normalizer<T, V> {
        &self.inner.normalize
    }

    /// Emitted after every state transition.
    pub fn changed(&self) -> &Signal<()> {
        &self.inner.changed
    }

    /// Returns `true` if options are fetched rather than static.
    pub fn is_remote(&self) -> bool {
        self.inner.fetcher.is_some()
    }

    /// Returns `true` if options are searched by query.
    pub fn is_searchable(&self) -> bool {
        matches!(self.inner.fetcher, Some(Fetcher::Find(_)))
    }

    /// Whether a fetch or a resolution is in flight.
    pub fn is_loading(&self) -> bool {
        let state = self.inner.state.lock();
        state.fetching || state.resolving
    }

    /// The browsable option set.
    pub fn items(&self) -> Vec<T> {
        self.inner.state.lock().items.clone()
    }

    /// Items resolved for the current selection.
    pub fn selected_items(&self) -> Option<Vec<T>> {
        self.inner.state.lock().selected_items.clone()
    }

    /// Error of the last failed request.
    pub fn error(&self) -> Option<FetchError> {
        self.inner.state.lock().error.clone()
    }

    /// Query of the last [`execute`](Self::execute) call.
    pub fn last_query(&self) -> Option<String> {
        self.inner.state.lock().last_query.clone()
    }

    /// Labels of the selected items joined with `", "`.
    pub fn label(&self) -> String {
        let selected = self.selected_items().unwrap_or_default();
        labelize(&selected, self.inner.normalize.as_ref(), Some(LABEL_SEPARATOR))
    }

    /// Labels of the items known for `values`, in value order.
    ///
    /// Items are looked up by cache key among the resolved items, the
    /// browsable set and the default items, without fetching. Values that
    /// are not known yet are left out, and so are resolved items no longer
    /// part of `values`.
    pub fn label_for(&self, values: &[V]) -> String {
        let pool = self.known_items();
        let mut resolved: Vec<Option<T>> = vec![None; values.len()];
        self.fill(values, &mut resolved, &pool);
        let items: Vec<T> = resolved.into_iter().flatten().collect();
        labelize(&items, self.inner.normalize.as_ref(), Some(LABEL_SEPARATOR))
    }

    /// A snapshot of the whole state.
    pub fn state(&self) -> AsyncListState<T> {
        let (loading, items, selected_items, error) = {
            let state = self.inner.state.lock();
            (
                state.fetching || state.resolving,
                state.items.clone(),
                state.selected_items.clone(),
                state.error.clone(),
            )
        };
        let label = selected_items
            .as_deref()
            .map(|selected| labelize(selected, self.inner.normalize.as_ref(), None))
            .unwrap_or_default();

        AsyncListState {
            loading,
            items,
            selected_items,
            error,
            label,
        }
    }

    /// Replace the browsable items.
    ///
    /// Meant for static lists whose items changed; for remote lists the next
    /// fetch overwrites them.
    /// Resolved items are replaced by their new version, if any.
    pub fn set_items(&self, items: Vec<T>) {
        {
            let mut state = self.inner.state.lock();
            state.items = items;
            self.refresh_selected(&mut state);
        }
        self.inner.changed.emit(());
    }

    /// Replace the default items used for resolution.
    pub fn set_default_items(&self, items: Vec<T>) {
        {
            let mut state = self.inner.state.lock();
            state.default_items = items;
            self.refresh_selected(&mut state);
        }
        self.inner.changed.emit(());
    }

    /// Load the browsable set for `query`.
    ///
    /// Static lists return their items without loading. The query is
    /// ignored by whole-set fetchers.
    pub async fn execute(&self, query: &str) -> Result<Vec<T>> {
        let fetch = match &self.inner.fetcher {
            None => return Ok(self.items()),
            Some(Fetcher::Get(get)) => get(),
            Some(Fetcher::Find(find)) => find(query.to_string()),
        };

        let generation = self.inner.fetch_generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.inner.state.lock();
            state.fetching = true;
            state.last_query = Some(query.to_string());
        }
        self.inner.changed.emit(());
        let _pending = self.pending_guard(Pending::Fetch, generation);

        let span = tracing::debug_span!(
            target: targets::ASYNC_LIST,
            "execute",
            operation = span_names::FETCH,
            query,
            generation
        );
        let result = fetch.instrument(span).await;

        if self.inner.fetch_generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(target: targets::ASYNC_LIST, generation, "discarding superseded fetch");
            return result;
        }

        {
            let mut state = self.inner.state.lock();
            state.fetching = false;
            match &result {
                Ok(items) => {
                    state.items = items.clone();
                    state.error = None;
                }
                Err(err) => {
                    tracing::warn!(target: targets::ASYNC_LIST, error = %err, "fetch failed");
                    state.error = Some(err.clone());
                }
            }
        }
        self.inner.changed.emit(());

        result
    }

    /// Re-run the last executed query (the empty query if none).
    pub async fn refresh(&self) -> Result<Vec<T>> {
        let query = self.last_query().unwrap_or_default();
        self.execute(&query).await
    }

    /// Resolve selected values to items.
    ///
    /// Each value is looked up among the previously resolved items, then the
    /// browsable set, then the default items. Values still missing are
    /// fetched: a whole-set fetcher loads everything (which also becomes the
    /// browsable set), a search fetcher runs one lookup per missing value
    /// concurrently, identical queries only once.
    ///
    /// Values that cannot be resolved are left out of the result.
    pub async fn resolve_selection(&self, values: &[V]) -> Result<Vec<T>> {
        let generation = self.inner.resolve_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let cached = self.known_items();
        let mut resolved: Vec<Option<T>> = vec![None; values.len()];
        self.fill(values, &mut resolved, &cached);

        let mut outcome: Result<()> = Ok(());
        let mut fetched_items = None;
        let mut _pending = None;

        if resolved.iter().any(Option::is_none) {
            if let Some(fetcher) = &self.inner.fetcher {
                self.set_resolving(true);
                _pending = Some(self.pending_guard(Pending::Resolve, generation));
                let span = tracing::debug_span!(
                    target: targets::ASYNC_LIST,
                    "resolve",
                    operation = span_names::RESOLVE,
                    generation
                );

                match fetcher {
                    Fetcher::Get(get) => match get().instrument(span).await {
                        Ok(items) => {
                            self.fill(values, &mut resolved, &items);
                            fetched_items = Some(items);
                        }
                        Err(err) => outcome = Err(err),
                    },
                    Fetcher::Find(find) => {
                        let queries = dedupe_by_key(
                            values
                                .iter()
                                .zip(&resolved)
                                .filter(|(_, item)| item.is_none())
                                .map(|(value, _)| self.query_for(value)),
                            |query: &String| query.clone(),
                        );
                        tracing::debug!(target: targets::ASYNC_LIST, lookups = queries.len(), "looking up missing values");

                        let results = join_all(queries.into_iter().map(|query| find(query)))
                            .instrument(span)
                            .await;

                        let mut found = Vec::new();
                        for result in results {
                            match result {
                                Ok(items) => found.extend(items),
                                Err(err) if outcome.is_ok() => outcome = Err(err),
                                Err(_) => {}
                            }
                        }
                        self.fill(values, &mut resolved, &found);
                    }
                }
            }
        }

        let selected: Vec<T> = resolved.into_iter().flatten().collect();

        if self.inner.resolve_generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(target: targets::ASYNC_LIST, generation, "discarding superseded resolution");
            return outcome.map(|()| selected);
        }

        {
            let mut state = self.inner.state.lock();
            state.resolving = false;
            state.selected_items = Some(selected.clone());
            if let Some(items) = fetched_items {
                state.items = items;
            }
            match &outcome {
                Ok(()) => state.error = None,
                Err(err) => {
                    tracing::warn!(target: targets::ASYNC_LIST, error = %err, "resolution failed");
                    state.error = Some(err.clone());
                }
            }
        }
        self.inner.changed.emit(());

        outcome.map(|()| selected)
    }

    /// Refresh this list whenever `topic` is invalidated on `bus`.
    ///
    /// The refresh runs on `runtime`. The subscription holds the list weakly
    /// and lives until the returned handle is dropped.
    pub fn invalidate_on<K: Topic>(
        &self,
        bus: &InvalidationBus<K>,
        topic: K,
        runtime: &'static AsyncRuntime,
    ) -> Subscription<K> {
        let weak = Arc::downgrade(&self.inner);
        bus.subscribe(topic, move |topic| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            tracing::debug!(target: targets::ASYNC_LIST, ?topic, "list invalidated, refreshing");
            let list = AsyncList { inner };
            runtime.spawn(async move {
                if let Err(err) = list.refresh().await {
                    tracing::warn!(target: targets::ASYNC_LIST, error = %err, "refresh after invalidation failed");
                }
            });
        })
    }

    fn pending_guard(&self, pending: Pending, generation: u64) -> PendingGuard<'_, T, V> {
        PendingGuard {
            inner: &self.inner,
            pending,
            generation,
        }
    }

    /// Resolved items first, then the browsable set, then the defaults.
    fn known_items(&self) -> Vec<T> {
        let state = self.inner.state.lock();
        state
            .selected_items
            .iter()
            .flatten()
            .chain(state.items.iter())
            .chain(state.default_items.iter())
            .cloned()
            .collect()
    }

    /// Swap resolved items for their counterpart in the current browsable
    /// or default items.
    fn refresh_selected(&self, state: &mut ListState<T>) {
        let Some(selected) = state.selected_items.take() else {
            return;
        };
        let values: Vec<V> = selected.iter().map(|item| (self.inner.normalize)(item).value).collect();
        let pool: Vec<T> = state.items.iter().chain(state.default_items.iter()).cloned().collect();

        let mut fresh: Vec<Option<T>> = vec![None; values.len()];
        self.fill(&values, &mut fresh, &pool);
        state.selected_items = Some(
            fresh
                .into_iter()
                .zip(selected)
                .map(|(fresh, old)| fresh.unwrap_or(old))
                .collect(),
        );
    }

    fn set_resolving(&self, resolving: bool) {
        self.inner.state.lock().resolving = resolving;
        self.inner.changed.emit(());
    }

    fn query_for(&self, value: &V) -> String {
        self.inner
            .lookup_query
            .as_ref()
            .map(|query| query(value))
            .unwrap_or_default()
    }

    /// Fill unresolved slots from `pool` by cache key. The first pool entry
    /// with a given key wins.
    fn fill(&self, values: &[V], resolved: &mut [Option<T>], pool: &[T]) {
        if pool.is_empty() {
            return;
        }

        let pool_values: Vec<V> = pool.iter().map(|item| (self.inner.normalize)(item).value).collect();
        let mut by_key: HashMap<String, usize> = HashMap::new();
        for (index, value) in pool_values.iter().enumerate() {
            if let Ok(key) = cache_key(value) {
                by_key.entry(key).or_insert(index);
            }
        }

        for (value, slot) in values.iter().zip(resolved.iter_mut()) {
            if slot.is_some() {
                continue;
            }
            let index = match cache_key(value) {
                Ok(key) => by_key.get(&key).copied(),
                Err(err) => {
                    tracing::trace!(target: targets::ASYNC_LIST, error = %err, "selected value has no cache key");
                    None
                }
            };

            if let Some(index) = index {
                *slot = Some(pool[index].clone());
            }
        }
    }
}

impl<T, V> std::fmt::Debug for AsyncList<T, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("AsyncList")
            .field("loading", &(state.fetching || state.resolving))
            .field("items", &state.items.len())
            .field("selected_items", &state.selected_items.as_ref().map(Vec::len))
            .field("error", &state.error)
            .finish()
    }
}
