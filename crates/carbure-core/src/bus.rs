//! Typed invalidation bus.
//!
//! Data screens cache query results; when a mutation makes some of them
//! stale, the mutating code invalidates a *topic* and every subscriber of that
//! topic refreshes. The bus is an explicit value created once at application
//! start and handed to whoever needs it (it is cheap to clone), keyed by a
//! caller-defined topic enum rather than free-form channel names.
//!
//! # Example
//!
//! ```
//! use carbure_core::bus::InvalidationBus;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Topic {
//!     Certificates,
//!     Transfers,
//! }
//!
//! let bus = InvalidationBus::new();
//! let subscription = bus.subscribe(Topic::Certificates, |topic| {
//!     println!("{topic:?} is stale");
//! });
//!
//! assert_eq!(bus.invalidate(Topic::Certificates), 1);
//! assert_eq!(bus.invalidate(Topic::Transfers), 0);
//!
//! drop(subscription);
//! assert_eq!(bus.invalidate(Topic::Certificates), 0);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::logging::{span_names, targets};
use crate::signal::{ConnectionId, Signal};

/// Keys usable as bus topics.
///
/// Blanket-implemented for any small copyable, hashable type, typically a
/// fieldless enum.
pub trait Topic: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

impl<T> Topic for T where T: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

struct BusInner<K: Topic> {
    channels: RwLock<HashMap<K, Arc<Signal<K>>>>,
}

/// A publish/subscribe registry for cache invalidation, keyed by topic.
pub struct InvalidationBus<K: Topic> {
    inner: Arc<BusInner<K>>,
}

impl<K: Topic> InvalidationBus<K> {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                channels: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Subscribe to a topic.
    ///
    /// The callback runs on the invalidating thread each time `topic` is
    /// invalidated, until the returned [`Subscription`] is dropped.
    pub fn subscribe<F>(&self, topic: K, callback: F) -> Subscription<K>
    where
        F: Fn(K) + Send + Sync + 'static,
    {
        let signal = self
            .inner
            .channels
            .write()
            .entry(topic)
            .or_insert_with(|| Arc::new(Signal::new()))
            .clone();
        let id = signal.connect(move |topic| callback(*topic));
        tracing::debug!(target: targets::BUS, ?topic, "subscribed");

        Subscription {
            bus: Arc::downgrade(&self.inner),
            topic,
            id,
        }
    }

    /// Invalidate a topic, notifying its subscribers.
    ///
    /// Returns the number of subscribers notified.
    pub fn invalidate(&self, topic: K) -> usize {
        let _span = tracing::debug_span!(target: targets::BUS, "invalidate", operation = span_names::INVALIDATE, ?topic).entered();

        let signal = self.inner.channels.read().get(&topic).cloned();
        match signal {
            Some(signal) => {
                let count = signal.connection_count();
                signal.emit(topic);
                crate::carbure_debug!(?topic, subscribers = count, "topic invalidated");
                count
            }
            None => {
                crate::carbure_trace!(?topic, "topic has no subscribers");
                0
            }
        }
    }

    /// Invalidate several topics in order.
    ///
    /// Returns the total number of notifications delivered.
    pub fn invalidate_all(&self, topics: impl IntoIterator<Item = K>) -> usize {
        topics.into_iter().map(|topic| self.invalidate(topic)).sum()
    }

    /// Number of live subscriptions for a topic.
    pub fn subscriber_count(&self, topic: K) -> usize {
        self.inner
            .channels
            .read()
            .get(&topic)
            .map_or(0, |signal| signal.connection_count())
    }
}

impl<K: Topic> Default for InvalidationBus<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Topic> Clone for InvalidationBus<K> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K: Topic> fmt::Debug for InvalidationBus<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let topics: Vec<K> = self.inner.channels.read().keys().copied().collect();
        f.debug_struct("InvalidationBus").field("topics", &topics).finish()
    }
}

/// A live subscription; unsubscribes when dropped.
///
/// Holds only a weak reference to the bus, so it never keeps the bus alive.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription<K: Topic> {
    bus: Weak<BusInner<K>>,
    topic: K,
    id: ConnectionId,
}

impl<K: Topic> Subscription<K> {
    /// The topic this subscription listens to.
    pub fn topic(&self) -> K {
        self.topic
    }
}

impl<K: Topic> Drop for Subscription<K> {
    fn drop(&mut self) {
        if let Some(inner) = self.bus.upgrade() {
            if let Some(signal) = inner.channels.read().get(&self.topic) {
                signal.disconnect(self.id);
            }
        }
    }
}

impl<K: Topic> fmt::Debug for Subscription<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Channel {
        Lots,
        Stocks,
    }

    #[test]
    fn test_invalidate_reaches_topic_subscribers_only() {
        let bus = InvalidationBus::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        let _lots = bus.subscribe(Channel::Lots, move |topic| {
            received_clone.lock().push(topic);
        });

        assert_eq!(bus.invalidate(Channel::Stocks), 0);
        assert_eq!(bus.invalidate(Channel::Lots), 1);
        assert_eq!(*received.lock(), vec![Channel::Lots]);
    }

    #[test]
    fn test_drop_subscription_unsubscribes() {
        let bus = InvalidationBus::new();
        let count = Arc::new(AtomicUsize::new(0));

        let count_clone = count.clone();
        let subscription = bus.subscribe(Channel::Lots, move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(subscription.topic(), Channel::Lots);
        assert_eq!(bus.subscriber_count(Channel::Lots), 1);

        drop(subscription);
        assert_eq!(bus.subscriber_count(Channel::Lots), 0);
        bus.invalidate(Channel::Lots);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_clones_share_registry() {
        let bus = InvalidationBus::new();
        let other = bus.clone();
        let count = Arc::new(AtomicUsize::new(0));

        let count_clone = count.clone();
        let _sub = bus.subscribe(Channel::Stocks, move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(other.invalidate_all([Channel::Stocks, Channel::Lots, Channel::Stocks]), 2);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_subscription_outliving_bus() {
        let bus = InvalidationBus::new();
        let subscription = bus.subscribe(Channel::Lots, |_| {});
        drop(bus);
        // Must not panic once the registry is gone
        drop(subscription);
    }
}
