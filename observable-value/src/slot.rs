use std::{fmt, sync::Arc};

use arc_swap::ArcSwapOption;

/// Lock-free storage for a single value.
///
/// Readers get a shared snapshot of whatever was stored last and never block,
/// no matter how many writers are racing them. A concurrent reader observes
/// either the previous or the new value in full.
///
/// Storing a value does not notify anyone; see
/// [`Value`](crate::value::Value) for the observable variant.
pub struct AtomicSlot<T> {
    inner: ArcSwapOption<T>,
}

impl<T> AtomicSlot<T> {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: ArcSwapOption::empty(),
        }
    }

    /// Create a slot that already holds `value`.
    #[must_use]
    pub fn with(value: T) -> Self {
        Self {
            inner: ArcSwapOption::from_pointee(value),
        }
    }

    /// Get the stored value.
    ///
    /// Returns `None` if nothing was ever stored.
    #[must_use]
    pub fn get(&self) -> Option<Arc<T>> {
        self.inner.load_full()
    }

    /// Replace the stored value.
    pub fn set(&self, value: T) {
        self.inner.store(Some(Arc::new(value)));
    }

    /// Replace the stored value, returning the previous one.
    pub fn swap(&self, value: T) -> Option<Arc<T>> {
        self.inner.swap(Some(Arc::new(value)))
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.inner.load().is_some()
    }
}

// Default is implemented manually because auto deriving introduces an
// unnecessary Default bound on T.
impl<T> Default for AtomicSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for AtomicSlot<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicSlot").field(&self.get()).finish()
    }
}
