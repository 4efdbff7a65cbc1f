//! Background workers attached to a connected wallet.
//!
//! Workers run in their own tokio task and are reached only through typed
//! messages. The wallet store owns their lifecycle: it starts them after a
//! successful connect and stops them on reset.

use anyhow::Result;
use async_trait::async_trait;
use station_api_types::{AccountBalance, CanisterId};
use uuid::Uuid;

mod accounts;
mod config;

pub use accounts::AccountsWorker;
pub use config::WorkerConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerMessage {
    /// Replace the set of accounts whose balances are polled.
    Track { account_ids: Vec<Uuid> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WorkerError {
    #[error("no worker is running")]
    NotRunning,
    #[error("worker channel closed")]
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceUpdate {
    pub wallet_id: CanisterId,
    pub balances: Vec<AccountBalance>,
}

pub trait WalletWorkers: Send + Sync {
    fn start(&self, wallet_id: &CanisterId);
    fn stop(&self);
    fn post(&self, message: WorkerMessage) -> Result<(), WorkerError>;
}

#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn fetch_balances(
        &self,
        wallet_id: &CanisterId,
        account_ids: &[Uuid],
    ) -> Result<Vec<AccountBalance>>;
}
