use std::{sync::Arc, time::Duration};

use observable_value::{ErrorValue, Render, RenderFn, Value};
use tokio::{
    sync::{mpsc, watch},
    time::{Instant, Interval, MissedTickBehavior, interval_at},
};
use tokio_stream::{StreamExt as _, wrappers::WatchStream};
use tracing::{debug, info};

use crate::{
    errors::NetspeedError,
    settings::NetspeedSettings,
    source::{CounterSource, ProcNetDev},
    speeds::Speeds,
};

const OUTPUT_BUFFER_SIZE: usize = 16;
// Tokio intervals can't have a zero period.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(1);

pub type Output = String;
type SharedRender = Box<RenderFn<Speeds, Output>>;

/// A module that periodically samples an interface and renders its speeds.
///
/// The render capability and the refresh interval can both be changed while
/// the module is streaming; the running worker picks them up without
/// restarting.
pub struct NetspeedModule<Source = ProcNetDev> {
    interface: String,
    source: Arc<Source>,
    refresh: watch::Sender<Duration>,
    output: Arc<Value<SharedRender>>,
    measurements: Arc<ErrorValue<Speeds, NetspeedError>>,
}

impl<Source> NetspeedModule<Source>
where
    Source: CounterSource + 'static,
{
    pub fn from_settings(settings: &NetspeedSettings, source: Source) -> Self {
        let (refresh, _) = watch::channel(settings.refresh_interval());
        let module = Self {
            interface: settings.interface.clone(),
            source: Arc::new(source),
            refresh,
            output: Arc::new(Value::new()),
            measurements: Arc::new(ErrorValue::new()),
        };
        module.output(|speeds: &Speeds| speeds.to_string());
        module
    }

    /// Render the module's output with `render` from now on.
    pub fn output<R>(&self, render: R) -> &Self
    where
        R: Render<Speeds, Output = Output> + 'static,
    {
        self.output.set(Box::new(render));
        self
    }

    /// Sample the interface every `interval`.
    ///
    /// Since there is no instantaneous network speed, rendered speeds are
    /// averaged over this interval. Intervals shorter than a millisecond are
    /// rounded up to one.
    pub fn refresh_interval(&self, interval: Duration) -> &Self {
        self.refresh.send_replace(interval);
        self
    }

    /// Latest measured speeds, or the error that stopped the module.
    #[must_use]
    pub fn measurements(&self) -> Arc<ErrorValue<Speeds, NetspeedError>> {
        Arc::clone(&self.measurements)
    }

    /// Start sampling and return the rendered outputs.
    ///
    /// The worker stops after the first sampling error, which is published
    /// through [`NetspeedModule::measurements`], or when the returned receiver
    /// is dropped.
    pub fn stream(&self) -> mpsc::Receiver<Output> {
        let (sender, receiver) = mpsc::channel(OUTPUT_BUFFER_SIZE);
        let worker = Worker {
            interface: self.interface.clone(),
            source: Arc::clone(&self.source),
            refresh: self.refresh.subscribe(),
            output: Arc::clone(&self.output),
            measurements: Arc::clone(&self.measurements),
            sink: sender,
        };
        tokio::spawn(worker.run());
        receiver
    }
}

struct Worker<Source> {
    interface: String,
    source: Arc<Source>,
    refresh: watch::Receiver<Duration>,
    output: Arc<Value<SharedRender>>,
    measurements: Arc<ErrorValue<Speeds, NetspeedError>>,
    sink: mpsc::Sender<Output>,
}

impl<Source> Worker<Source>
where
    Source: CounterSource,
{
    async fn run(self) {
        let Self {
            interface,
            source,
            mut refresh,
            output,
            measurements,
            sink,
        } = self;

        let Some(mut last_counters) = measurements.check(source.read(&interface).await) else {
            info!(%interface, "Netspeed worker couldn't take a first sample.");
            return;
        };
        let mut last_read = Instant::now();

        let output_ticker = output.subscribe();
        let mut render = output.get();
        let mut timer = refresh_timer(*refresh.borrow_and_update());
        let mut refresh = WatchStream::from_changes(refresh);
        let mut speeds = None;

        loop {
            if let (Some(speeds), Some(render)) = (&speeds, &render) {
                if sink.send(render.render(speeds)).await.is_err() {
                    debug!(%interface, "Netspeed output receiver dropped, stopping worker.");
                    return;
                }
            }
            tokio::select! {
                () = output_ticker.tick() => {
                    debug!(%interface, "Netspeed render function updated.");
                    render = output.get();
                }
                Some(period) = refresh.next() => {
                    debug!(%interface, ?period, "Netspeed refresh interval updated.");
                    timer = refresh_timer(period);
                }
                _ = timer.tick() => {
                    let Some(counters) = measurements.check(source.read(&interface).await) else {
                        info!(%interface, "Netspeed worker stopped after a sampling error.");
                        return;
                    };
                    let now = Instant::now();
                    let current = Speeds::between(last_counters, counters, now - last_read);
                    measurements.set(current);
                    speeds = Some(current);
                    last_counters = counters;
                    last_read = now;
                }
            }
        }
    }
}

fn refresh_timer(period: Duration) -> Interval {
    let period = period.max(MIN_REFRESH_INTERVAL);
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::time::timeout;

    use super::*;
    use crate::source::Counters;

    /// Replays canned readings, then fails.
    struct Replay {
        readings: Mutex<Vec<Counters>>,
    }

    impl Replay {
        fn new(mut readings: Vec<Counters>) -> Self {
            readings.reverse();
            Self {
                readings: Mutex::new(readings),
            }
        }
    }

    #[async_trait]
    impl CounterSource for Replay {
        async fn read(&self, interface: &str) -> Result<Counters, NetspeedError> {
            self.readings
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| NetspeedError::InterfaceNotFound(interface.to_owned()))
        }
    }

    fn counters(rx: u64, tx: u64) -> Counters {
        Counters { rx, tx }
    }

    fn module(readings: Vec<Counters>) -> NetspeedModule<Replay> {
        let settings = NetspeedSettings {
            interface: String::from("test0"),
            ..NetspeedSettings::default()
        };
        NetspeedModule::from_settings(&settings, Replay::new(readings))
    }

    #[tokio::test(start_paused = true)]
    async fn renders_with_updated_function_without_restarting() {
        let readings = (0..100).map(|i| counters(i * 1_000, i * 100)).collect();
        let module = module(readings);
        module.refresh_interval(Duration::from_secs(1));
        let mut outputs = module.stream();

        let first = outputs.recv().await.unwrap();
        assert_eq!(first, "100 B/s up | 1000 B/s down");

        module.output(|speeds: &Speeds| format!("{:.0}", speeds.total()));
        // The worker re-renders the current speeds as soon as it sees the new
        // function, without waiting for another sample.
        let rendered = timeout(Duration::from_millis(500), outputs.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rendered, "1100");
    }

    #[tokio::test(start_paused = true)]
    async fn rearms_the_timer_when_the_interval_changes() {
        let readings = (0..100).map(|i| counters(i * 1_000, i * 100)).collect();
        let module = module(readings);
        module.refresh_interval(Duration::from_secs(1));
        let mut outputs = module.stream();
        assert_eq!(outputs.recv().await.unwrap(), "100 B/s up | 1000 B/s down");

        let changed_at = Instant::now();
        module.refresh_interval(Duration::from_secs(10));
        // Picking up the new interval re-renders the current speeds.
        assert_eq!(outputs.recv().await.unwrap(), "100 B/s up | 1000 B/s down");

        // The next sample comes one new period later, not one old period.
        let sample = outputs.recv().await.unwrap();
        let elapsed = Instant::now() - changed_at;
        assert!(elapsed >= Duration::from_secs(10), "sampled after {elapsed:?}");
        assert!(elapsed < Duration::from_secs(11), "sampled after {elapsed:?}");
        assert_eq!(sample, "10 B/s up | 100 B/s down");
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_still_samples() {
        let readings = (0..100).map(|i| counters(i, i)).collect();
        let module = module(readings);
        module.refresh_interval(Duration::ZERO);
        let measurements = module.measurements();
        let mut outputs = module.stream();

        let output = timeout(Duration::from_secs(1), outputs.recv())
            .await
            .expect("worker to keep sampling")
            .expect("worker to be alive");
        assert!(output.ends_with("down"));
        assert!(measurements.get().0.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn stops_and_publishes_the_sampling_error() {
        let module = module(vec![counters(0, 0), counters(10, 10)]);
        module.refresh_interval(Duration::from_millis(100));
        let measurements = module.measurements();
        let ticker = measurements.subscribe();
        let mut outputs = module.stream();

        assert_eq!(outputs.recv().await.unwrap(), "100 B/s up | 100 B/s down");
        // The third reading fails and closes the output stream.
        assert!(outputs.recv().await.is_none());

        assert!(ticker.try_tick());
        let (payload, error) = measurements.get();
        assert!(payload.is_none());
        assert!(matches!(
            error.as_deref(),
            Some(NetspeedError::InterfaceNotFound(name)) if name == "test0"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn first_sample_failure_never_renders() {
        let module = module(Vec::new());
        let mut outputs = module.stream();
        assert!(outputs.recv().await.is_none());
        assert!(module.measurements().get().1.is_some());
    }
}
