use parking_lot::Mutex;
use station_api_types::CanisterId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::{BalanceSource, BalanceUpdate, WalletWorkers, WorkerConfig, WorkerError, WorkerMessage};

struct RunningWorker {
    wallet_id: CanisterId,
    sender: mpsc::UnboundedSender<WorkerMessage>,
    task: JoinHandle<()>,
}

/// Polls balances of the tracked accounts of one wallet at a time.
pub struct AccountsWorker {
    source: Arc<dyn BalanceSource>,
    config: WorkerConfig,
    running: Mutex<Option<RunningWorker>>,
    updates: broadcast::Sender<BalanceUpdate>,
}

impl AccountsWorker {
    pub fn new(source: Arc<dyn BalanceSource>, config: WorkerConfig) -> Self {
        let (updates, _) = broadcast::channel(config.updates_capacity.max(1));
        Self {
            source,
            config,
            running: Mutex::new(None),
            updates,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BalanceUpdate> {
        self.updates.subscribe()
    }

    pub fn running_wallet(&self) -> Option<CanisterId> {
        self.running
            .lock()
            .as_ref()
            .map(|worker| worker.wallet_id.clone())
    }
}

impl WalletWorkers for AccountsWorker {
    fn start(&self, wallet_id: &CanisterId) {
        self.stop();

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            error!("cannot start accounts worker for {} outside a tokio runtime", wallet_id);
            return;
        };

        let (sender, receiver) = mpsc::unbounded_channel();
        let task = runtime.spawn(run_accounts_loop(
            wallet_id.clone(),
            receiver,
            self.source.clone(),
            self.config.poll_interval,
            self.updates.clone(),
        ));

        debug!("accounts worker started for {}", wallet_id);
        *self.running.lock() = Some(RunningWorker {
            wallet_id: wallet_id.clone(),
            sender,
            task,
        });
    }

    fn stop(&self) {
        if let Some(worker) = self.running.lock().take() {
            worker.task.abort();
            debug!("accounts worker stopped for {}", worker.wallet_id);
        }
    }

    fn post(&self, message: WorkerMessage) -> Result<(), WorkerError> {
        let guard = self.running.lock();
        let worker = guard.as_ref().ok_or(WorkerError::NotRunning)?;
        worker.sender.send(message).map_err(|_| WorkerError::Closed)
    }
}

impl Drop for AccountsWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_accounts_loop(
    wallet_id: CanisterId,
    mut receiver: mpsc::UnboundedReceiver<WorkerMessage>,
    source: Arc<dyn BalanceSource>,
    poll_interval: Duration,
    updates: broadcast::Sender<BalanceUpdate>,
) {
    let mut tracked: Vec<Uuid> = Vec::new();
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            message = receiver.recv() => match message {
                Some(WorkerMessage::Track { account_ids }) => {
                    tracked = account_ids;
                    tracked.sort_unstable();
                    tracked.dedup();
                    poll_balances(&wallet_id, &tracked, source.as_ref(), &updates).await;
                    ticker.reset();
                }
                None => break,
            },
            _ = ticker.tick() => {
                poll_balances(&wallet_id, &tracked, source.as_ref(), &updates).await;
            }
        }
    }

    debug!("accounts worker for {} exited", wallet_id);
}

async fn poll_balances(
    wallet_id: &CanisterId,
    tracked: &[Uuid],
    source: &dyn BalanceSource,
    updates: &broadcast::Sender<BalanceUpdate>,
) {
    if tracked.is_empty() {
        return;
    }

    match source.fetch_balances(wallet_id, tracked).await {
        Ok(balances) => {
            // No subscribers is fine; the next poll refreshes anyway.
            let _ = updates.send(BalanceUpdate {
                wallet_id: wallet_id.clone(),
                balances,
            });
        }
        Err(err) => {
            warn!("failed to fetch balances for {}: {:#}", wallet_id, err);
        }
    }
}
