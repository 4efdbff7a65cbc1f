use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use station_api_types::{
    AccountBalance, ApiErrorBody, Capabilities, CanisterId, CreateProposalInput,
    FetchAccountBalancesInput, MarkNotificationsReadInput, MyUser, Notification, Proposal,
    VoteOnProposalInput,
};
use station_client::{ServiceError, ServiceResult, WalletService, WalletServiceProvider};
use station_workers::BalanceSource;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:4943";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// JSON gateway in front of the wallet canisters.
///
/// Reads `STATION_API_URL` (default: `http://localhost:4943`) and
/// `STATION_HTTP_TIMEOUT_SECS` (default: 30) at construction time.
/// Each wallet lives under `{endpoint}/wallets/{wallet_id}`.
#[derive(Clone)]
pub struct HttpWalletGateway {
    endpoint: String,
    http: reqwest::Client,
}

impl Default for HttpWalletGateway {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HttpWalletGateway {
    pub fn new(endpoint: Option<String>) -> Self {
        let endpoint = endpoint
            .or_else(|| std::env::var("STATION_API_URL").ok())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let timeout_secs = std::env::var("STATION_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| match raw.trim().parse::<u64>() {
                Ok(secs) => Some(secs.max(1)),
                Err(_) => {
                    warn!("non-numeric STATION_HTTP_TIMEOUT_SECS '{}', using default", raw);
                    None
                }
            })
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|err| {
                warn!("failed to build HTTP client with timeout: {}", err);
                reqwest::Client::new()
            });

        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn wallet(&self, wallet_id: &CanisterId) -> HttpWalletService {
        HttpWalletService {
            base: format!("{}/wallets/{}", self.endpoint, wallet_id),
            wallet_id: wallet_id.clone(),
            http: self.http.clone(),
        }
    }
}

impl WalletServiceProvider for HttpWalletGateway {
    fn with_wallet_id(&self, wallet_id: &CanisterId) -> Arc<dyn WalletService> {
        Arc::new(self.wallet(wallet_id))
    }
}

#[async_trait]
impl BalanceSource for HttpWalletGateway {
    async fn fetch_balances(
        &self,
        wallet_id: &CanisterId,
        account_ids: &[Uuid],
    ) -> anyhow::Result<Vec<AccountBalance>> {
        self.wallet(wallet_id)
            .fetch_account_balances(account_ids.to_vec())
            .await
            .with_context(|| format!("fetch balances for {wallet_id}"))
    }
}

pub struct HttpWalletService {
    base: String,
    wallet_id: CanisterId,
    http: reqwest::Client,
}

impl HttpWalletService {
    pub async fn fetch_account_balances(
        &self,
        account_ids: Vec<Uuid>,
    ) -> ServiceResult<Vec<AccountBalance>> {
        self.post(
            "accounts/balances",
            &FetchAccountBalancesInput { account_ids },
        )
        .await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ServiceResult<T> {
        let url = format!("{}/{}", self.base, path);
        debug!("GET {}", url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| transport_error(path, err))?;
        let text = read_body(path, response).await?;
        decode(path, &text)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> ServiceResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let text = self.post_raw(path, body).await?;
        decode(path, &text)
    }

    async fn post_raw<B: Serialize + Sync>(&self, path: &str, body: &B) -> ServiceResult<String> {
        let url = format!("{}/{}", self.base, path);
        debug!("POST {}", url);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| transport_error(path, err))?;
        read_body(path, response).await
    }
}

#[async_trait]
impl WalletService for HttpWalletService {
    fn wallet_id(&self) -> &CanisterId {
        &self.wallet_id
    }

    async fn my_user(&self) -> ServiceResult<Option<MyUser>> {
        self.get("me").await
    }

    async fn capabilities(&self) -> ServiceResult<Capabilities> {
        self.get("capabilities").await
    }

    async fn create_proposal(&self, input: CreateProposalInput) -> ServiceResult<Proposal> {
        self.post("proposals", &input).await
    }

    async fn mark_notification_as_read(&self, input: MarkNotificationsReadInput) -> ServiceResult<()> {
        self.post_raw("notifications/read", &input).await.map(|_| ())
    }

    async fn vote_on_proposal(&self, input: VoteOnProposalInput) -> ServiceResult<Proposal> {
        self.post("proposals/vote", &input).await
    }

    async fn list_notifications(&self) -> ServiceResult<Vec<Notification>> {
        self.get("notifications").await
    }
}

/// Returns the body of a successful response, or the classified error.
async fn read_body(operation: &str, response: reqwest::Response) -> ServiceResult<String> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|err| transport_error(operation, err))?;

    if status.is_success() {
        return Ok(text);
    }

    // Structured rejections carry an error code; anything else is opaque.
    if let Ok(body) = serde_json::from_str::<ApiErrorBody>(&text) {
        return Err(ServiceError::Api(body.into()));
    }

    Err(ServiceError::canister(format!(
        "{operation} HTTP {status}: {text}"
    )))
}

fn decode<T: DeserializeOwned>(operation: &str, text: &str) -> ServiceResult<T> {
    serde_json::from_str(text)
        .map_err(|err| ServiceError::canister(format!("{operation} parse: {err}")))
}

fn transport_error(operation: &str, err: reqwest::Error) -> ServiceError {
    ServiceError::canister(format!("{operation} transport: {err}"))
}
