//! Core systems for Carbure selection widgets.
//!
//! This crate provides the building blocks shared by the option engine and
//! the REST sources:
//!
//! - **Signal/Slot System**: Type-safe change notification
//! - **Invalidation Bus**: Typed publish/subscribe for stale cached data
//! - **Controlled State**: Values owned either by a parent or by the widget
//! - **Fetch Types**: Boxed fetcher closures and the shared `FetchError`
//! - **Async Runtime**: Tokio runtime for background fetches (`tokio` feature)
//!
//! # Signal/Slot Example
//!
//! ```
//! use carbure_core::Signal;
//!
//! let selection_changed = Signal::<Vec<u32>>::new();
//!
//! let conn_id = selection_changed.connect(|ids| {
//!     println!("{} lots selected", ids.len());
//! });
//!
//! selection_changed.emit(vec![1, 2, 3]);
//! selection_changed.disconnect(conn_id);
//! ```
//!
//! # Invalidation Example
//!
//! ```
//! use carbure_core::InvalidationBus;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Topic {
//!     Depots,
//! }
//!
//! let bus = InvalidationBus::new();
//! let stale = Arc::new(AtomicBool::new(false));
//!
//! let flag = stale.clone();
//! let _subscription = bus.subscribe(Topic::Depots, move |_| {
//!     flag.store(true, Ordering::SeqCst);
//! });
//!
//! bus.invalidate(Topic::Depots);
//! assert!(stale.load(Ordering::SeqCst));
//! ```

#[cfg(feature = "tokio")]
pub mod async_runtime;
pub mod bus;
mod error;
pub mod fetch;
pub mod logging;
pub mod signal;
pub mod state;

#[cfg(feature = "tokio")]
pub use async_runtime::{AsyncRuntime, AsyncRuntimeConfig, AsyncRuntimeError};
pub use bus::{InvalidationBus, Subscription, Topic};
pub use error::{FetchError, Result};
pub use fetch::{FetchFuture, FindItems, GetItems};
pub use logging::PerfSpan;
pub use signal::{ConnectionId, Signal};
pub use state::{OnChange, State};
