use async_trait::async_trait;
use station_api_types::{
    ApiErrorBody, Capabilities, CanisterId, CreateProposalInput, MarkNotificationsReadInput, MyUser,
    Notification, Proposal, VoteOnProposalInput,
};
use std::sync::Arc;

/// Error code the service uses when the caller's identity maps to no user.
pub const NOT_FOUND_USER_IDENTITY: &str = "NOT_FOUND_USER_IDENTITY";

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Structured rejection returned by the wallet service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct ApiError {
    pub code: String,
    pub message: Option<String>,
    pub details: Option<std::collections::BTreeMap<String, String>>,
}

impl ApiError {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: None,
            details: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl From<ApiErrorBody> for ApiError {
    fn from(body: ApiErrorBody) -> Self {
        Self {
            code: body.code,
            message: body.message,
            details: body.details,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The service processed the call and rejected it.
    #[error("wallet api error: {0}")]
    Api(#[from] ApiError),
    /// The call never produced a structured answer (transport, decoding, trap).
    #[error("canister call failed{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Canister { message: Option<String> },
}

impl ServiceError {
    pub fn canister(message: impl Into<String>) -> Self {
        Self::Canister {
            message: Some(message.into()),
        }
    }

    pub fn api_code(&self) -> Option<&str> {
        match self {
            Self::Api(err) => Some(err.code.as_str()),
            Self::Canister { .. } => None,
        }
    }
}

/// Calls against one wallet canister.
#[async_trait]
pub trait WalletService: Send + Sync {
    fn wallet_id(&self) -> &CanisterId;
    /// `Ok(None)` when the caller is not registered in this wallet.
    async fn my_user(&self) -> ServiceResult<Option<MyUser>>;
    async fn capabilities(&self) -> ServiceResult<Capabilities>;
    async fn create_proposal(&self, input: CreateProposalInput) -> ServiceResult<Proposal>;
    async fn mark_notification_as_read(&self, input: MarkNotificationsReadInput) -> ServiceResult<()>;
    async fn vote_on_proposal(&self, input: VoteOnProposalInput) -> ServiceResult<Proposal>;
    async fn list_notifications(&self) -> ServiceResult<Vec<Notification>>;
}

/// Hands out a service bound to a given wallet.
pub trait WalletServiceProvider: Send + Sync {
    fn with_wallet_id(&self, wallet_id: &CanisterId) -> Arc<dyn WalletService>;
}
