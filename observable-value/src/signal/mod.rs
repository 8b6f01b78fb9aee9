//! Coalesced wake-ups.
//!
//! A [`Notifier`]/[`Ticker`] pair shares a single pending flag. Raising it any
//! number of times before the [`Ticker`] drains it results in one wake. The
//! wake carries no payload: it only means that whatever the consumer watches
//! has changed and has to be read again.

use std::sync::{Arc, atomic::AtomicBool};

use tokio::sync::Notify;

pub mod notifier;
pub mod ticker;

pub use notifier::Notifier;
pub use ticker::Ticker;

#[derive(Debug, Default)]
pub(crate) struct Shared {
    pending: AtomicBool,
    wake: Notify,
}

/// Create a connected [`Notifier`]/[`Ticker`] pair, initially idle.
#[must_use]
pub fn channel() -> (Notifier, Ticker) {
    let shared = Arc::new(Shared::default());
    (Notifier::new(Arc::clone(&shared)), Ticker::new(shared))
}
