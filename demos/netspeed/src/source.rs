use std::path::PathBuf;

use async_trait::async_trait;

use crate::errors::NetspeedError;

const PROC_NET_DEV: &str = "/proc/net/dev";
// Interface name, then 8 receive columns followed by 8 transmit columns.
const RX_BYTES_COLUMN: usize = 0;
const TX_BYTES_COLUMN: usize = 8;

/// Cumulative byte counters of one interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counters {
    pub rx: u64,
    pub tx: u64,
}

/// Reads cumulative traffic counters for a network interface.
#[async_trait]
pub trait CounterSource: Send + Sync {
    async fn read(&self, interface: &str) -> Result<Counters, NetspeedError>;
}

/// [`CounterSource`] backed by the Linux `/proc/net/dev` table.
#[derive(Debug, Clone)]
pub struct ProcNetDev {
    path: PathBuf,
}

impl ProcNetDev {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Default for ProcNetDev {
    fn default() -> Self {
        Self::new(PathBuf::from(PROC_NET_DEV))
    }
}

#[async_trait]
impl CounterSource for ProcNetDev {
    async fn read(&self, interface: &str) -> Result<Counters, NetspeedError> {
        let table = tokio::fs::read_to_string(&self.path).await?;
        parse_counters(&table, interface)
    }
}

fn parse_counters(table: &str, interface: &str) -> Result<Counters, NetspeedError> {
    let parse_error = |line: &str| NetspeedError::Parse {
        interface: interface.to_owned(),
        line: line.to_owned(),
    };
    // The first two lines are column headers.
    for line in table.lines().skip(2) {
        let Some((name, columns)) = line.split_once(':') else {
            continue;
        };
        if name.trim() != interface {
            continue;
        }
        let columns: Vec<&str> = columns.split_whitespace().collect();
        let column = |index: usize| {
            columns
                .get(index)
                .and_then(|value| value.parse::<u64>().ok())
                .ok_or_else(|| parse_error(line))
        };
        return Ok(Counters {
            rx: column(RX_BYTES_COLUMN)?,
            tx: column(TX_BYTES_COLUMN)?,
        });
    }
    Err(NetspeedError::InterfaceNotFound(interface.to_owned()))
}
