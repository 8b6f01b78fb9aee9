use std::sync::{Arc, atomic::Ordering};

use crate::signal::Shared;

/// Producer side of a coalesced wake-up.
///
/// Clones raise the same flag as the original.
#[derive(Debug, Clone)]
pub struct Notifier {
    shared: Arc<Shared>,
}

impl Notifier {
    pub(crate) const fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Mark the paired [`Ticker`](crate::signal::Ticker) as pending.
    ///
    /// Never blocks. Calling this while the ticker is already pending has no
    /// further effect.
    pub fn notify(&self) {
        // Only the idle -> pending transition wakes the consumer; `notify_one`
        // keeps a single permit if nobody is waiting yet.
        if !self.shared.pending.swap(true, Ordering::AcqRel) {
            self.shared.wake.notify_one();
        }
    }
}
