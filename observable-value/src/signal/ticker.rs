use std::sync::{Arc, atomic::Ordering};

use futures::{Stream, stream};

use crate::signal::Shared;

/// Consumer side of a coalesced wake-up.
///
/// A [`Ticker`] is either idle or pending. It becomes pending when its
/// [`Notifier`](crate::signal::Notifier) fires, and goes back to idle once it
/// has been drained, either by awaiting [`Ticker::tick`] or by a successful
/// [`Ticker::try_tick`].
///
/// It is not [`Clone`]: every subscription has exactly one consumer.
#[derive(Debug)]
pub struct Ticker {
    shared: Arc<Shared>,
}

impl Ticker {
    pub(crate) const fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Wait until the ticker is pending, then drain it.
    ///
    /// Returns immediately if a wake is already pending.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe. The pending flag is only cleared right
    /// before the future completes, so dropping it (e.g. in a losing
    /// `tokio::select!` branch) never loses a wake.
    pub async fn tick(&self) {
        loop {
            let notified = self.shared.wake.notified();
            if self.try_tick() {
                return;
            }
            // A stale permit from an already drained wake only causes another
            // pass through the loop.
            notified.await;
        }
    }

    /// Drain the ticker without waiting.
    ///
    /// Returns `true` if it was pending.
    pub fn try_tick(&self) -> bool {
        self.shared.pending.swap(false, Ordering::AcqRel)
    }

    /// Check whether a wake is pending, without draining it.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.shared.pending.load(Ordering::Acquire)
    }

    /// Turn the ticker into a [`Stream`] that yields once per drained wake.
    pub fn into_stream(self) -> impl Stream<Item = ()> + Send + Unpin {
        Box::pin(stream::unfold(self, |ticker| async move {
            ticker.tick().await;
            Some(((), ticker))
        }))
    }
}
