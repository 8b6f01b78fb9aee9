use std::{
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use tokio::sync::Notify;
#[cfg(feature = "instrumentation")]
use tracing::instrument;
use tracing::trace;

use crate::{
    signal::{self, Notifier, Ticker},
    slot::AtomicSlot,
};

pub mod fallible;

pub use fallible::{ErrorValue, Fallible};

/// Atomic value storage with update notifications.
///
/// [`Value::set`] replaces the stored value and then wakes every subscriber.
/// Subscribers get a [`Ticker`] rather than the value itself: after a wake
/// they call [`Value::get`], so they always see the latest value and simply
/// miss the intermediate ones.
///
/// Subscriptions are permanent. The notifier list only grows, and a
/// [`Ticker`] that nobody polls anymore costs a single flag store per update.
pub struct Value<T> {
    slot: AtomicSlot<T>,
    subscribers: RwLock<Vec<Notifier>>,
    updates: Notify,
}

impl<T> Value<T> {
    /// Create an unset [`Value`].
    #[must_use]
    pub fn new() -> Self {
        Self::from_slot(AtomicSlot::new())
    }

    /// Create a [`Value`] holding `value`.
    #[must_use]
    pub fn with(value: T) -> Self {
        Self::from_slot(AtomicSlot::with(value))
    }

    fn from_slot(slot: AtomicSlot<T>) -> Self {
        Self {
            slot,
            subscribers: RwLock::new(Vec::new()),
            updates: Notify::new(),
        }
    }

    /// Get the currently stored value.
    ///
    /// Returns `None` until the first [`Value::set`].
    #[must_use]
    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.get()
    }

    /// Store `value` and notify every subscriber.
    ///
    /// Subscribers are notified even if `value` equals the previous one.
    #[cfg_attr(feature = "instrumentation", instrument(skip_all))]
    pub fn set(&self, value: T) {
        self.slot.set(value);
        self.broadcast();
    }

    /// Create a new [`Ticker`] for value updates.
    #[cfg_attr(feature = "instrumentation", instrument(skip_all))]
    pub fn subscribe(&self) -> Ticker {
        let (notifier, ticker) = signal::channel();
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.push(notifier);
        trace!(subscribers = subscribers.len(), "New value subscription.");
        ticker
    }

    /// Wait for the next [`Value::set`].
    ///
    /// Only updates made after this call resolve the returned future. Unlike
    /// [`Value::subscribe`] nothing is registered on the value, so this is the
    /// right tool for one-off waits.
    pub fn next(&self) -> impl Future<Output = ()> + Send + '_ {
        self.updates.notified()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn broadcast(&self) {
        // The list is append-only, so a poisoned lock still guards a valid list.
        let subscribers = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        trace!(subscribers = subscribers.len(), "Broadcasting value update.");
        for notifier in subscribers.iter() {
            notifier.notify();
        }
        drop(subscribers);
        self.updates.notify_waiters();
    }
}

// Default is implemented manually because auto deriving introduces an
// unnecessary Default bound on T.
impl<T> Default for Value<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Value<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("value", &self.get())
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}
