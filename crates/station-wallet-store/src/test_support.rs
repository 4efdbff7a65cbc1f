//! Scripted collaborators for store tests.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use station_api_types::{
    AssetMetadata, Capabilities, CanisterId, CreateProposalInput, MarkNotificationsReadInput,
    MyUser, Notification, NotificationStatus, Proposal, ProposalStatus, User, UserPrivilege,
    UserStatus, VoteOnProposalInput, WalletAsset,
};
use station_client::{ServiceError, ServiceResult, WalletService, WalletServiceProvider};
use station_workers::{WalletWorkers, WorkerError, WorkerMessage};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;
use uuid::Uuid;

use crate::ui::{Navigator, NotificationSink, StaticCatalog, Toast, Translator, UiHooks};
use crate::{StoreConfig, WalletStore};

pub(crate) fn sample_user() -> MyUser {
    MyUser {
        me: User {
            id: Uuid::new_v4(),
            name: Some("Treasury Admin".to_owned()),
            status: UserStatus::Active,
            groups: Vec::new(),
            identities: vec!["2vxsx-fae".to_owned()],
            last_modification_timestamp: "2024-01-01T00:00:00Z".to_owned(),
        },
        privileges: vec![UserPrivilege::ListAccounts, UserPrivilege::ListProposals],
    }
}

pub(crate) fn sample_capabilities() -> Capabilities {
    Capabilities {
        version: "0.0.2-alpha.1".to_owned(),
        supported_assets: vec![WalletAsset {
            blockchain: "icp".to_owned(),
            standard: "native".to_owned(),
            symbol: "ICP".to_owned(),
            name: "Internet Computer".to_owned(),
            metadata: vec![AssetMetadata {
                key: "decimals".to_owned(),
                value: "8".to_owned(),
            }],
        }],
    }
}

pub(crate) struct Backend {
    my_user: Mutex<ServiceResult<Option<MyUser>>>,
    my_user_gate: Mutex<Option<Arc<Notify>>>,
    my_user_calls: AtomicUsize,
    capabilities: Mutex<ServiceResult<Capabilities>>,
    capabilities_gate: Mutex<Option<Arc<Notify>>>,
    capabilities_calls: AtomicUsize,
    notifications: Mutex<ServiceResult<Vec<Notification>>>,
    mark_read_calls: Mutex<Vec<MarkNotificationsReadInput>>,
    mark_read_failures: Mutex<HashSet<usize>>,
    mark_read_gate: Mutex<Option<Arc<Notify>>>,
    votes: Mutex<Vec<VoteOnProposalInput>>,
    fail_votes: Mutex<bool>,
    created_proposals: Mutex<Vec<CreateProposalInput>>,
    bound_wallets: Mutex<Vec<CanisterId>>,
    // the user a sample lookup returns stays stable across calls
    default_user: MyUser,
}

impl Backend {
    fn new() -> Self {
        let default_user = sample_user();
        Self {
            my_user: Mutex::new(Ok(Some(default_user.clone()))),
            my_user_gate: Mutex::new(None),
            my_user_calls: AtomicUsize::new(0),
            capabilities: Mutex::new(Ok(sample_capabilities())),
            capabilities_gate: Mutex::new(None),
            capabilities_calls: AtomicUsize::new(0),
            notifications: Mutex::new(Ok(Vec::new())),
            mark_read_calls: Mutex::new(Vec::new()),
            mark_read_failures: Mutex::new(HashSet::new()),
            mark_read_gate: Mutex::new(None),
            votes: Mutex::new(Vec::new()),
            fail_votes: Mutex::new(false),
            created_proposals: Mutex::new(Vec::new()),
            bound_wallets: Mutex::new(Vec::new()),
            default_user,
        }
    }

    pub(crate) fn default_user(&self) -> &MyUser {
        &self.default_user
    }

    pub(crate) fn set_my_user(&self, result: ServiceResult<Option<MyUser>>) {
        *self.my_user.lock() = result;
    }

    /// Makes `my_user` wait until the returned gate is notified.
    pub(crate) fn gate_my_user(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.my_user_gate.lock() = Some(gate.clone());
        gate
    }

    pub(crate) fn my_user_calls(&self) -> usize {
        self.my_user_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn set_capabilities(&self, result: ServiceResult<Capabilities>) {
        *self.capabilities.lock() = result;
    }

    /// Makes `capabilities` wait until the returned gate is notified.
    pub(crate) fn gate_capabilities(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.capabilities_gate.lock() = Some(gate.clone());
        gate
    }

    pub(crate) fn capabilities_calls(&self) -> usize {
        self.capabilities_calls.load(Ordering::SeqCst)
    }

    /// Makes every mark-as-read call wait on the returned gate once recorded.
    pub(crate) fn gate_mark_read(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.mark_read_gate.lock() = Some(gate.clone());
        gate
    }

    pub(crate) fn set_notifications(&self, result: ServiceResult<Vec<Notification>>) {
        *self.notifications.lock() = result;
    }

    /// Fails the n-th (1-based) mark-as-read call.
    pub(crate) fn fail_mark_read_call(&self, call: usize) {
        self.mark_read_failures.lock().insert(call);
    }

    pub(crate) fn mark_read_calls(&self) -> Vec<MarkNotificationsReadInput> {
        self.mark_read_calls.lock().clone()
    }

    pub(crate) fn fail_votes(&self) {
        *self.fail_votes.lock() = true;
    }

    pub(crate) fn votes(&self) -> Vec<VoteOnProposalInput> {
        self.votes.lock().clone()
    }

    pub(crate) fn created_proposals(&self) -> Vec<CreateProposalInput> {
        self.created_proposals.lock().clone()
    }

    pub(crate) fn bound_wallets(&self) -> Vec<CanisterId> {
        self.bound_wallets.lock().clone()
    }
}

fn proposal(id: Uuid, status: ProposalStatus) -> Proposal {
    Proposal {
        id,
        title: "Add account".to_owned(),
        summary: None,
        status,
        proposed_by: Uuid::nil(),
        votes: Vec::new(),
        created_at: Utc::now(),
    }
}

struct BoundService {
    wallet_id: CanisterId,
    backend: Arc<Backend>,
}

#[async_trait]
impl WalletService for BoundService {
    fn wallet_id(&self) -> &CanisterId {
        &self.wallet_id
    }

    async fn my_user(&self) -> ServiceResult<Option<MyUser>> {
        self.backend.my_user_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.backend.my_user_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.backend.my_user.lock().clone()
    }

    async fn capabilities(&self) -> ServiceResult<Capabilities> {
        self.backend.capabilities_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.backend.capabilities_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.backend.capabilities.lock().clone()
    }

    async fn create_proposal(&self, input: CreateProposalInput) -> ServiceResult<Proposal> {
        self.backend.created_proposals.lock().push(input);
        Ok(proposal(Uuid::new_v4(), ProposalStatus::Created))
    }

    async fn mark_notification_as_read(&self, input: MarkNotificationsReadInput) -> ServiceResult<()> {
        let call = {
            let mut calls = self.backend.mark_read_calls.lock();
            calls.push(input);
            calls.len()
        };
        let gate = self.backend.mark_read_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.backend.mark_read_failures.lock().contains(&call) {
            return Err(ServiceError::canister("notification update rejected"));
        }
        Ok(())
    }

    async fn vote_on_proposal(&self, input: VoteOnProposalInput) -> ServiceResult<Proposal> {
        let proposal_id = input.proposal_id;
        let approve = input.approve;
        self.backend.votes.lock().push(input);
        if *self.backend.fail_votes.lock() {
            return Err(ServiceError::canister("vote rejected"));
        }
        let status = if approve {
            ProposalStatus::Adopted
        } else {
            ProposalStatus::Rejected
        };
        Ok(proposal(proposal_id, status))
    }

    async fn list_notifications(&self) -> ServiceResult<Vec<Notification>> {
        self.backend.notifications.lock().clone()
    }
}

struct MockProvider(Arc<Backend>);

impl WalletServiceProvider for MockProvider {
    fn with_wallet_id(&self, wallet_id: &CanisterId) -> Arc<dyn WalletService> {
        self.0.bound_wallets.lock().push(wallet_id.clone());
        Arc::new(BoundService {
            wallet_id: wallet_id.clone(),
            backend: self.0.clone(),
        })
    }
}

type StartHook = Box<dyn FnOnce() + Send>;

#[derive(Default)]
pub(crate) struct MockWorkers {
    started: Mutex<Vec<CanisterId>>,
    stops: AtomicUsize,
    running: Mutex<bool>,
    posts: Mutex<Vec<WorkerMessage>>,
    on_start: Mutex<Option<StartHook>>,
}

impl MockWorkers {
    /// Runs `hook` once, inside the next `start`, after the worker is running.
    pub(crate) fn on_next_start(&self, hook: impl FnOnce() + Send + 'static) {
        *self.on_start.lock() = Some(Box::new(hook));
    }

    pub(crate) fn running(&self) -> bool {
        *self.running.lock()
    }

    pub(crate) fn started(&self) -> Vec<CanisterId> {
        self.started.lock().clone()
    }

    pub(crate) fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub(crate) fn posts(&self) -> Vec<WorkerMessage> {
        self.posts.lock().clone()
    }
}

impl WalletWorkers for MockWorkers {
    fn start(&self, wallet_id: &CanisterId) {
        self.started.lock().push(wallet_id.clone());
        *self.running.lock() = true;
        let hook = self.on_start.lock().take();
        if let Some(hook) = hook {
            hook();
        }
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        *self.running.lock() = false;
    }

    fn post(&self, message: WorkerMessage) -> Result<(), WorkerError> {
        if !*self.running.lock() {
            return Err(WorkerError::NotRunning);
        }
        self.posts.lock().push(message);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub(crate) fn all(&self) -> Vec<Toast> {
        self.toasts.lock().clone()
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.all().into_iter().map(|toast| toast.message).collect()
    }
}

impl NotificationSink for RecordingNotifier {
    fn send_notification(&self, toast: Toast) {
        self.toasts.lock().push(toast);
    }
}

#[derive(Default)]
pub(crate) struct CountingNavigator {
    count: AtomicUsize,
}

impl CountingNavigator {
    pub(crate) fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Navigator for CountingNavigator {
    fn force_navigate(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) struct Harness {
    pub(crate) store: WalletStore,
    pub(crate) backend: Arc<Backend>,
    pub(crate) workers: Arc<MockWorkers>,
    pub(crate) toasts: Arc<RecordingNotifier>,
    pub(crate) navigator: Arc<CountingNavigator>,
    catalog: StaticCatalog,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub(crate) fn with_config(config: StoreConfig) -> Self {
        let backend = Arc::new(Backend::new());
        let workers = Arc::new(MockWorkers::default());
        let toasts = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(CountingNavigator::default());
        let catalog = StaticCatalog::english();

        let ui = UiHooks {
            notifier: toasts.clone(),
            navigator: navigator.clone(),
            translator: Arc::new(catalog.clone()),
        };
        let store = WalletStore::new(
            Arc::new(MockProvider(backend.clone())),
            workers.clone(),
            ui,
            config,
        );

        Self {
            store,
            backend,
            workers,
            toasts,
            navigator,
            catalog,
        }
    }

    pub(crate) fn wallet() -> CanisterId {
        CanisterId::parse("ryjl3-tyaaa-aaaaa-aaaba-cai").expect("valid principal")
    }

    pub(crate) fn notification(created_at_secs: i64) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            title: format!("Proposal {created_at_secs} needs your vote"),
            message: None,
            status: NotificationStatus::Sent,
            target_user_id: Uuid::nil(),
            created_at: Utc
                .timestamp_opt(1_700_000_000 + created_at_secs, 0)
                .single()
                .expect("valid timestamp"),
        }
    }

    pub(crate) fn t(&self, key: &str) -> String {
        self.catalog.t(key)
    }
}
