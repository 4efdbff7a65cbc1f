use anyhow::{Context, Result, anyhow};
use std::collections::HashMap;

pub const DEFAULT_NOTIFICATION_BATCH_SIZE: usize = 50;

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Notification ids acknowledged per remote call by "mark all read".
    pub notification_batch_size: usize,
    /// Display labels keyed by wallet principal text.
    pub wallet_names: HashMap<String, String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            notification_batch_size: DEFAULT_NOTIFICATION_BATCH_SIZE,
            wallet_names: HashMap::new(),
        }
    }
}

impl StoreConfig {
    /// Reads `STATION_NOTIFICATION_BATCH_SIZE` (default 50) and
    /// `STATION_WALLET_NAMES` (`principal=Label` pairs, comma separated).
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var("STATION_NOTIFICATION_BATCH_SIZE") {
            config.notification_batch_size = raw
                .trim()
                .parse()
                .with_context(|| format!("invalid STATION_NOTIFICATION_BATCH_SIZE: {raw}"))?;
        }
        if let Ok(raw) = std::env::var("STATION_WALLET_NAMES") {
            config.wallet_names = parse_wallet_names(&raw)?;
        }
        Ok(config)
    }

    pub(crate) fn batch_size(&self) -> usize {
        self.notification_batch_size.max(1)
    }
}

fn parse_wallet_names(raw: &str) -> Result<HashMap<String, String>> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (id, label) = pair
                .split_once('=')
                .ok_or_else(|| anyhow!("invalid STATION_WALLET_NAMES entry: {pair}"))?;
            Ok((id.trim().to_owned(), label.trim().to_owned()))
        })
        .collect()
}
