use anyhow::{Context, Result, anyhow};
use station_api_types::CanisterId;
use uuid::Uuid;

/// What the headless session connects to and watches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SessionConfig {
    pub(crate) wallet_id: CanisterId,
    pub(crate) track_accounts: Vec<Uuid>,
}

impl SessionConfig {
    /// The wallet id comes from the first argument, falling back to
    /// `STATION_WALLET_ID`. `STATION_TRACK_ACCOUNTS` is a comma-separated
    /// list of account ids.
    pub(crate) fn load(arg: Option<String>) -> Result<Self> {
        let raw_wallet = arg
            .or_else(|| std::env::var("STATION_WALLET_ID").ok())
            .ok_or_else(|| anyhow!("wallet id missing: pass it as argument or set STATION_WALLET_ID"))?;
        let raw_accounts = std::env::var("STATION_TRACK_ACCOUNTS").unwrap_or_default();
        Self::parse(&raw_wallet, &raw_accounts)
    }

    fn parse(raw_wallet: &str, raw_accounts: &str) -> Result<Self> {
        let wallet_id = CanisterId::parse(raw_wallet.trim())
            .with_context(|| format!("invalid wallet id: {raw_wallet}"))?;

        let track_accounts = raw_accounts
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                Uuid::parse_str(part).with_context(|| format!("invalid account id in STATION_TRACK_ACCOUNTS: {part}"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            wallet_id,
            track_accounts,
        })
    }
}
