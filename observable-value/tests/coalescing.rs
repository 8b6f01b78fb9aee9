use std::time::Duration;

use futures::FutureExt as _;
use observable_value::value::Value;
use tokio::time::timeout;

#[test]
fn latest_value_after_coalesced_drain() {
    let value = Value::new();
    let ticker = value.subscribe();

    value.set(5);
    value.set(7);

    assert!(ticker.tick().now_or_never().is_some());
    assert_eq!(value.get().as_deref(), Some(&7));
    // Two updates, one wake.
    assert!(ticker.tick().now_or_never().is_none());
}

#[test]
fn many_updates_leave_a_single_pending_wake() {
    let value = Value::new();
    let ticker = value.subscribe();
    for i in 0..100usize {
        value.set(i);
    }
    assert!(ticker.try_tick());
    assert!(!ticker.try_tick());
    assert_eq!(value.get().as_deref(), Some(&99));
}

#[test]
fn independent_subscribers_are_all_pending() {
    let value = Value::new();
    let first = value.subscribe();
    let second = value.subscribe();

    value.set("x");

    assert!(first.is_pending());
    assert!(second.is_pending());
    // Draining one leaves the other untouched.
    assert!(first.try_tick());
    assert!(second.is_pending());
}

#[tokio::test]
async fn late_subscriber_reads_current_value() {
    let value = Value::new();
    value.set(1u8);
    let ticker = value.subscribe();
    assert_eq!(value.get().as_deref(), Some(&1));

    value.set(2);
    timeout(Duration::from_secs(3), ticker.tick())
        .await
        .expect("ticker to be pending");
    assert_eq!(value.get().as_deref(), Some(&2));
}
