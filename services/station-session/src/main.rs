mod session_config;

use anyhow::Result;
use station_http::HttpWalletGateway;
use station_wallet_store::{ConnectionStatus, StoreConfig, UiHooks, WalletStore};
use station_workers::{AccountsWorker, WorkerConfig};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::session_config::SessionConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let session = SessionConfig::load(std::env::args().nth(1))?;
    let store_config = StoreConfig::from_env()?;
    let worker_config = WorkerConfig::from_env()?;

    let gateway = Arc::new(HttpWalletGateway::new(None));
    info!("station-session using gateway {}", gateway.endpoint());

    let worker = Arc::new(AccountsWorker::new(gateway.clone(), worker_config));
    let mut balances = worker.subscribe();
    let store = WalletStore::new(gateway, worker, UiHooks::default(), store_config);

    let status = store.connect_to(session.wallet_id.clone(), false).await;
    if status != ConnectionStatus::Connected {
        warn!("not connected to wallet {} (status {:?})", session.wallet_id, status);
        store.reset();
        return Ok(());
    }

    let user = store.user();
    info!(
        "signed in to {} as {} with {} privileges",
        store.name(),
        user.name.as_deref().unwrap_or("unnamed user"),
        store.privileges().len()
    );

    store.wait_for_capabilities().await;
    let capabilities = store.capabilities();
    info!(
        "wallet version {} supports {} assets",
        capabilities.version,
        capabilities.supported_assets.len()
    );

    store.refresh_notifications().await;
    for item in store.sorted_notifications() {
        info!("notification {} at {}: {}", item.data.id, item.data.created_at, item.data.title);
    }

    if !session.track_accounts.is_empty() {
        store.track_accounts_balance(session.track_accounts.clone());
    }

    loop {
        tokio::select! {
            update = balances.recv() => match update {
                Ok(update) => {
                    for balance in update.balances {
                        info!(
                            "account {} balance {} ({} decimals)",
                            balance.account_id, balance.balance, balance.decimals
                        );
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("skipped {} balance updates", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    store.reset();
    Ok(())
}
