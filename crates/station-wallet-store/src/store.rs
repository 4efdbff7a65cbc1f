use parking_lot::Mutex;
use station_api_types::{
    AccessPolicy, AddAccountOperationInput, ApprovalCriteria, Capabilities, CanisterId,
    CreateProposalInput, ExecutionSchedule, MyUser, Proposal, ProposalOperationInput, User,
    UserPrivilege, UserSpecifier, VoteOnProposalInput, WalletAsset,
};
use station_client::{ServiceResult, WalletService, WalletServiceProvider};
use station_workers::{WalletWorkers, WorkerError, WorkerMessage};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::state::{ConnectionError, ConnectionStatus, WalletStoreState};
use crate::ui::{UiHooks, keys};

pub const BLOCKCHAIN_INTERNET_COMPUTER: &str = "icp";
pub const STANDARD_NATIVE: &str = "native";

/// A vote on a proposal, with an optional reason shown to other voters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteDecision {
    pub approve: bool,
    pub reason: Option<String>,
}

impl VoteDecision {
    pub fn approve() -> Self {
        Self {
            approve: true,
            reason: None,
        }
    }

    pub fn reject() -> Self {
        Self {
            approve: false,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

pub(crate) struct Session {
    pub(crate) state: WalletStoreState,
    /// Bumped on every reset; async work started under an older epoch must
    /// not write its results back.
    pub(crate) epoch: u64,
    capabilities_task: Option<JoinHandle<()>>,
}

impl Session {
    fn restore_initial(&mut self) -> Option<JoinHandle<()>> {
        let loading = self.state.loading;
        self.state = WalletStoreState {
            loading,
            ..WalletStoreState::default()
        };
        self.epoch = self.epoch.wrapping_add(1);
        self.capabilities_task.take()
    }
}

pub(crate) struct Inner {
    pub(crate) session: Mutex<Session>,
    services: Arc<dyn WalletServiceProvider>,
    workers: Arc<dyn WalletWorkers>,
    pub(crate) ui: UiHooks,
    pub(crate) config: StoreConfig,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum LoadingFlag {
    Busy,
    Configuration,
    Notifications,
}

/// Clears a loading flag when dropped, so cancelled futures do not leave
/// the UI spinning. Flags other than `Busy` are only cleared if no reset
/// happened in between.
pub(crate) struct LoadingGuard<'a> {
    inner: &'a Inner,
    flag: LoadingFlag,
    epoch: u64,
}

impl<'a> LoadingGuard<'a> {
    pub(crate) fn new(inner: &'a Inner, flag: LoadingFlag, epoch: u64) -> Self {
        Self { inner, flag, epoch }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut session = self.inner.session.lock();
        let current = session.epoch == self.epoch;
        match self.flag {
            LoadingFlag::Busy => session.state.loading = false,
            LoadingFlag::Configuration if current => session.state.configuration.loading = false,
            LoadingFlag::Notifications if current => session.state.notifications.loading = false,
            _ => {}
        }
    }
}

/// Session handle for one wallet connection at a time.
///
/// Cheap to clone; all clones share the same state. The state lock is never
/// held across a remote call.
#[derive(Clone)]
pub struct WalletStore {
    pub(crate) inner: Arc<Inner>,
}

impl WalletStore {
    pub fn new(
        services: Arc<dyn WalletServiceProvider>,
        workers: Arc<dyn WalletWorkers>,
        ui: UiHooks,
        config: StoreConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                session: Mutex::new(Session {
                    state: WalletStoreState::default(),
                    epoch: 0,
                    capabilities_task: None,
                }),
                services,
                workers,
                ui,
                config,
            }),
        }
    }

    /// Run a closure with shared read access to the state.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&WalletStoreState) -> R,
    {
        f(&self.inner.session.lock().state)
    }

    pub(crate) fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut WalletStoreState) -> R,
    {
        f(&mut self.inner.session.lock().state)
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.inner.session.lock().epoch
    }

    pub fn snapshot(&self) -> WalletStoreState {
        self.with(|s| s.clone())
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.with(|s| s.connection_status)
    }

    pub fn connection_error(&self) -> Option<(ConnectionError, Option<String>)> {
        self.with(|s| {
            s.connection_error
                .map(|kind| (kind, s.connection_error_message.clone()))
        })
    }

    pub fn canister_id(&self) -> CanisterId {
        self.with(|s| s.canister_id.clone())
    }

    /// Configured label of the selected wallet, or its principal text.
    pub fn name(&self) -> String {
        let canister_id = self.canister_id();
        self.inner
            .config
            .wallet_names
            .get(canister_id.as_str())
            .cloned()
            .unwrap_or_else(|| canister_id.to_string())
    }

    pub fn is_loading(&self) -> bool {
        self.with(|s| s.loading)
    }

    pub fn user(&self) -> User {
        self.with(|s| s.user.clone())
    }

    pub fn privileges(&self) -> Vec<UserPrivilege> {
        self.with(|s| s.privileges.clone())
    }

    pub fn has_privilege(&self, privilege: UserPrivilege) -> bool {
        self.with(|s| s.has_privilege(privilege))
    }

    pub fn capabilities(&self) -> Capabilities {
        self.with(|s| s.configuration.details.clone())
    }

    pub fn supported_assets(&self) -> Vec<WalletAsset> {
        self.with(|s| s.supported_assets().to_vec())
    }

    /// Service bound to the currently selected wallet.
    pub fn service(&self) -> Arc<dyn WalletService> {
        let canister_id = self.canister_id();
        self.inner.services.with_wallet_id(&canister_id)
    }

    /// Drops all session data and stops the background workers.
    pub fn reset(&self) {
        let task = self.inner.session.lock().restore_initial();
        self.teardown(task);
    }

    fn teardown(&self, capabilities_task: Option<JoinHandle<()>>) {
        if let Some(task) = capabilities_task {
            task.abort();
        }
        self.inner.workers.stop();
    }

    /// Connects the session to `wallet_id` and returns the resulting status.
    ///
    /// Only one connect runs at a time; a call made while another is pending
    /// returns the pending status untouched. Failures never escape: they land
    /// in the connection error fields and raise a toast.
    pub async fn connect_to(
        &self,
        wallet_id: CanisterId,
        force_navigation_on_success: bool,
    ) -> ConnectionStatus {
        let (epoch, stale_task) = {
            let mut session = self.inner.session.lock();
            if session.state.loading {
                warn!("wallet is already loading");
                return session.state.connection_status;
            }

            let stale_task = session.restore_initial();
            session.state.loading = true;
            session.state.connection_status = ConnectionStatus::Connecting;
            session.state.canister_id = wallet_id.clone();
            (session.epoch, stale_task)
        };
        self.teardown(stale_task);

        let _busy = LoadingGuard::new(&self.inner, LoadingFlag::Busy, epoch);
        let service = self.inner.services.with_wallet_id(&wallet_id);
        let outcome = service.my_user().await;

        self.finish_connect(&wallet_id, epoch, outcome, force_navigation_on_success)
    }

    fn finish_connect(
        &self,
        wallet_id: &CanisterId,
        epoch: u64,
        outcome: ServiceResult<Option<MyUser>>,
        force_navigation_on_success: bool,
    ) -> ConnectionStatus {
        let mut session = self.inner.session.lock();
        if session.epoch != epoch {
            debug!("discarding user lookup for {}: session was reset", wallet_id);
            return session.state.connection_status;
        }

        match outcome {
            Ok(Some(my_user)) if my_user.me.is_registered() => {
                session.state.user = my_user.me;
                session.state.privileges = my_user.privileges;
                session.state.connection_status = ConnectionStatus::Connected;
                drop(session);

                // Both run in the background so the first screen renders sooner.
                self.spawn_capabilities_load(epoch);
                self.inner.workers.start(wallet_id);

                // A reset may have slipped in while the lock was released; its
                // stop ran before our start.
                let current = self.inner.session.lock().epoch == epoch;
                if !current {
                    debug!("session reset while starting workers for {}", wallet_id);
                    self.inner.workers.stop();
                    return self.connection_status();
                }

                if force_navigation_on_success {
                    self.inner.ui.navigator.force_navigate();
                }

                info!("connected to wallet {}", wallet_id);
                ConnectionStatus::Connected
            }
            Ok(_) => {
                warn!("user not registered in wallet {}", wallet_id);
                session.state.connection_status = ConnectionStatus::UnregisteredUser;
                ConnectionStatus::UnregisteredUser
            }
            Err(err) => {
                error!("failed to connect to wallet {}: {}", wallet_id, err);
                let (kind, message) = ConnectionError::classify(&err);
                session.state.connection_status = ConnectionStatus::Failed;
                session.state.connection_error = Some(kind);
                session.state.connection_error_message = message;
                drop(session);

                self.inner.ui.error_toast(keys::USER_LOAD_ERROR);
                self.inner.ui.navigator.force_navigate();
                ConnectionStatus::Failed
            }
        }
    }

    fn spawn_capabilities_load(&self, epoch: u64) {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(err) => {
                error!("cannot load capabilities without a tokio runtime: {}", err);
                return;
            }
        };

        let store = self.clone();
        let task = handle.spawn(async move {
            if let Err(err) = store.load_capabilities_in(Some(epoch)).await {
                warn!("failed to load wallet capabilities: {}", err);
            }
        });

        let mut session = self.inner.session.lock();
        if session.epoch != epoch {
            drop(session);
            task.abort();
            return;
        }
        let previous = session.capabilities_task.replace(task);
        drop(session);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Fetches the wallet capabilities into the configuration cache.
    pub async fn load_capabilities(&self) -> ServiceResult<()> {
        self.load_capabilities_in(None).await
    }

    async fn load_capabilities_in(&self, expected_epoch: Option<u64>) -> ServiceResult<()> {
        let (service, epoch) = {
            let mut session = self.inner.session.lock();
            if expected_epoch.is_some_and(|expected| expected != session.epoch) {
                debug!("skipping capabilities load: session was reset");
                return Ok(());
            }
            session.state.configuration.loading = true;
            let service = self.inner.services.with_wallet_id(&session.state.canister_id);
            (service, session.epoch)
        };

        let _loading = LoadingGuard::new(&self.inner, LoadingFlag::Configuration, epoch);
        let capabilities = service.capabilities().await?;

        {
            let mut session = self.inner.session.lock();
            if session.epoch == epoch {
                session.state.configuration.details = capabilities;
            }
        }
        Ok(())
    }

    /// Waits for the background capabilities load started by the last
    /// successful connect, if it is still running.
    pub async fn wait_for_capabilities(&self) {
        let task = self.inner.session.lock().capabilities_task.take();
        if let Some(task) = task {
            if let Err(err) = task.await {
                if !err.is_cancelled() {
                    warn!("capabilities task failed: {}", err);
                }
            }
        }
    }

    /// Returns the updated proposal, or `None` after raising a toast.
    pub async fn vote_on_proposal(
        &self,
        proposal_id: Uuid,
        decision: VoteDecision,
    ) -> Option<Proposal> {
        let input = VoteOnProposalInput {
            proposal_id,
            approve: decision.approve,
            reason: decision.reason,
        };

        match self.service().vote_on_proposal(input).await {
            Ok(proposal) => Some(proposal),
            Err(err) => {
                error!("failed to save vote on proposal {}: {}", proposal_id, err);
                self.inner.ui.error_toast(keys::PROPOSAL_FAILED_TO_SAVE);
                None
            }
        }
    }

    /// Proposes the first account of a freshly registered user, owned and
    /// approved by that user alone.
    pub async fn create_user_initial_account(&self, user_id: Uuid) -> ServiceResult<Proposal> {
        let owner_approval = ApprovalCriteria::ApprovalThreshold {
            threshold: 100,
            voters: UserSpecifier::Owner,
        };

        let input = CreateProposalInput {
            title: None,
            summary: None,
            execution_plan: Some(ExecutionSchedule::Immediate),
            operation: ProposalOperationInput::AddAccount(AddAccountOperationInput {
                name: self.inner.ui.translator.t(keys::INITIAL_ACCOUNT_NAME),
                blockchain: BLOCKCHAIN_INTERNET_COMPUTER.to_owned(),
                standard: STANDARD_NATIVE.to_owned(),
                metadata: Vec::new(),
                read_access_policy: AccessPolicy::restricted_to(vec![user_id]),
                transfer_access_policy: AccessPolicy::restricted_to(vec![user_id]),
                update_access_policy: AccessPolicy::restricted_to(vec![user_id]),
                update_approval_policy: Some(owner_approval.clone()),
                transfer_approval_policy: Some(owner_approval),
            }),
        };

        self.service().create_proposal(input).await
    }

    /// Asks the accounts worker to poll balances of `account_ids`.
    pub fn track_accounts_balance(&self, account_ids: Vec<Uuid>) {
        match self.inner.workers.post(WorkerMessage::Track { account_ids }) {
            Ok(()) => {}
            Err(WorkerError::NotRunning) => {
                debug!("no accounts worker running; balance tracking skipped");
            }
            Err(err) => warn!("failed to post to accounts worker: {}", err),
        }
    }
}
