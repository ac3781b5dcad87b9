//! Controlled and uncontrolled widget state.
//!
//! Several widgets (dropdown open state, table order, tab focus, selected
//! values) either receive their value from a parent together with a change
//! callback, or manage it themselves. [`State`] makes that choice explicit and
//! fixes it at construction.
//!
//! # Example
//!
//! ```
//! use carbure_core::State;
//! use std::sync::{Arc, Mutex};
//!
//! // Uncontrolled: the widget stores the value.
//! let mut open = State::uncontrolled(false);
//! open.set(true);
//! assert!(open.get());
//!
//! // Controlled: the parent owns the value; `set` only reports the request.
//! let requested = Arc::new(Mutex::new(None));
//! let sink = requested.clone();
//! let mut open = State::controlled(false, move |value| {
//!     *sink.lock().unwrap() = Some(value);
//! });
//! open.set(true);
//! assert!(!open.get());
//! assert_eq!(*requested.lock().unwrap(), Some(true));
//!
//! // The parent re-renders with the new value.
//! open.sync(true);
//! assert!(open.get());
//! ```

use std::fmt;

use crate::logging::targets;
use crate::signal::Signal;

/// Change callback of a controlled state.
pub type OnChange<T> = Box<dyn Fn(T) + Send + Sync>;

/// A value either owned by the parent (controlled) or by the widget (uncontrolled).
pub enum State<T> {
    /// The parent owns the value and is told about requested changes.
    Controlled {
        /// Last value pushed by the parent.
        value: T,
        /// Receives every requested change.
        on_change: OnChange<T>,
    },
    /// The widget owns the value.
    Uncontrolled {
        /// Current value.
        value: T,
        /// Emitted after the value actually changed.
        changed: Signal<T>,
    },
}

impl<T: Clone + PartialEq + Send + 'static> State<T> {
    /// A state whose value is owned by the caller.
    pub fn controlled<F>(value: T, on_change: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self::Controlled {
            value,
            on_change: Box::new(on_change),
        }
    }

    /// A state managed internally, starting at `initial`.
    pub fn uncontrolled(initial: T) -> Self {
        Self::Uncontrolled {
            value: initial,
            changed: Signal::new(),
        }
    }

    /// Build from an optional controlled pair, falling back to `initial`.
    pub fn from_parts(controlled: Option<(T, OnChange<T>)>, initial: T) -> Self {
        match controlled {
            Some((value, on_change)) => Self::Controlled { value, on_change },
            None => Self::uncontrolled(initial),
        }
    }

    /// Returns `true` for a controlled state.
    pub fn is_controlled(&self) -> bool {
        matches!(self, Self::Controlled { .. })
    }

    /// Current value.
    pub fn get(&self) -> T {
        self.value().clone()
    }

    /// Borrow the current value.
    pub fn value(&self) -> &T {
        match self {
            Self::Controlled { value, .. } | Self::Uncontrolled { value, .. } => value,
        }
    }

    /// Request a new value.
    ///
    /// Controlled: forwards to the change callback and leaves the stored value
    /// untouched until [`sync`](Self::sync). Uncontrolled: stores the value and
    /// emits `changed` if it differs. Returns `true` when the stored value changed.
    pub fn set(&mut self, new_value: T) -> bool {
        match self {
            Self::Controlled { on_change, .. } => {
                on_change(new_value);
                false
            }
            Self::Uncontrolled { value, changed } => {
                if *value == new_value {
                    return false;
                }
                *value = new_value.clone();
                tracing::trace!(target: targets::STATE, "uncontrolled state changed");
                changed.emit(new_value);
                true
            }
        }
    }

    /// Apply a value pushed by the parent.
    ///
    /// Only meaningful for controlled states; ignored otherwise.
    pub fn sync(&mut self, new_value: T) {
        match self {
            Self::Controlled { value, .. } => *value = new_value,
            Self::Uncontrolled { .. } => {
                tracing::warn!(target: targets::STATE, "sync() called on an uncontrolled state");
            }
        }
    }

    /// Change signal of an uncontrolled state.
    pub fn changed(&self) -> Option<&Signal<T>> {
        match self {
            Self::Controlled { .. } => None,
            Self::Uncontrolled { changed, .. } => Some(changed),
        }
    }
}

impl<T: Default + Clone + PartialEq + Send + 'static> Default for State<T> {
    fn default() -> Self {
        Self::uncontrolled(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Controlled { value, .. } => f.debug_tuple("Controlled").field(value).finish(),
            Self::Uncontrolled { value, .. } => f.debug_tuple("Uncontrolled").field(value).finish(),
        }
    }
}
