use anyhow::{Context, Result};
use std::time::Duration;

const DEFAULT_POLL_SECS: u64 = 30;
const DEFAULT_UPDATES_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub poll_interval: Duration,
    /// Buffered balance updates per subscriber before lagging ones drop.
    pub updates_capacity: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECS),
            updates_capacity: DEFAULT_UPDATES_CAPACITY,
        }
    }
}

impl WorkerConfig {
    /// Reads `STATION_BALANCE_POLL_SECS` (default 30, minimum 1).
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var("STATION_BALANCE_POLL_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("invalid STATION_BALANCE_POLL_SECS: {raw}"))?;
            config.poll_interval = Duration::from_secs(secs.max(1));
        }
        Ok(config)
    }
}
