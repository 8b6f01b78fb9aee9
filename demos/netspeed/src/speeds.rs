use std::{fmt, time::Duration};

use crate::source::Counters;

const BINARY_UNITS: [&str; 5] = ["B/s", "KiB/s", "MiB/s", "GiB/s", "TiB/s"];

/// Bidirectional network traffic, in bytes per second.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Speeds {
    pub rx: f64,
    pub tx: f64,
}

impl Speeds {
    /// Average speeds between two counter readings taken `elapsed` apart.
    #[must_use]
    pub fn between(previous: Counters, current: Counters, elapsed: Duration) -> Self {
        let seconds = elapsed.as_secs_f64();
        if seconds <= 0.0 {
            return Self::default();
        }
        // Counters reset when an interface goes down and comes back.
        let rate = |before: u64, after: u64| after.saturating_sub(before) as f64 / seconds;
        Self {
            rx: rate(previous.rx, current.rx),
            tx: rate(previous.tx, current.tx),
        }
    }

    /// Total speed, both up and down.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.rx + self.tx
    }
}

impl fmt::Display for Speeds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} up | {} down", ByteRate(self.tx), ByteRate(self.rx))
    }
}

/// A byte rate formatted with binary prefixes.
#[derive(Debug, Clone, Copy)]
pub struct ByteRate(pub f64);

impl fmt::Display for ByteRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut value = self.0;
        let mut unit = 0;
        while value >= 1024.0 && unit < BINARY_UNITS.len() - 1 {
            value /= 1024.0;
            unit += 1;
        }
        if unit == 0 {
            write!(f, "{value:.0} {}", BINARY_UNITS[unit])
        } else {
            write!(f, "{value:.1} {}", BINARY_UNITS[unit])
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn averages_over_elapsed_time() {
        let speeds = Speeds::between(
            Counters { rx: 0, tx: 1_000 },
            Counters {
                rx: 4_096,
                tx: 3_000,
            },
            Duration::from_secs(2),
        );
        assert_eq!(speeds, Speeds { rx: 2_048.0, tx: 1_000.0 });
        assert_eq!(speeds.to_string(), "1000 B/s up | 2.0 KiB/s down");
    }

    #[test]
    fn counter_reset_is_not_negative() {
        let speeds = Speeds::between(
            Counters { rx: 500, tx: 500 },
            Counters { rx: 10, tx: 10 },
            Duration::from_secs(1),
        );
        assert_eq!(speeds.total(), 0.0);
    }

    #[test]
    fn large_rates_use_binary_prefixes() {
        assert_eq!(ByteRate(3.5 * 1024.0 * 1024.0).to_string(), "3.5 MiB/s");
    }
}
