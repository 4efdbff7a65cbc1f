use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod opt_list;
mod principal;
mod proposal;

pub use principal::{ANONYMOUS_PRINCIPAL, CanisterId, ParseCanisterIdError};
pub use proposal::{
    AccessPolicy, AddAccountOperationInput, ApprovalCriteria, AuthScope, CreateProposalInput,
    ExecutionSchedule, Proposal, ProposalOperationInput, ProposalStatus, ProposalVote,
    ProposalVoteStatus, UserSpecifier, VoteOnProposalInput,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    #[default]
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserGroup {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct User {
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    pub status: UserStatus,
    #[serde(default)]
    pub groups: Vec<UserGroup>,
    #[serde(default)]
    pub identities: Vec<String>,
    #[serde(default)]
    pub last_modification_timestamp: String,
}

impl User {
    /// A user record only counts once the service assigned it an id.
    pub fn is_registered(&self) -> bool {
        !self.id.is_nil()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserPrivilege {
    Capabilities,
    ListAccounts,
    AddAccount,
    ListUsers,
    AddUser,
    ListUserGroups,
    AddUserGroup,
    ListAccessPolicies,
    ListProposalPolicies,
    AddProposalPolicy,
    ListAddressBookEntries,
    AddAddressBookEntry,
    ListProposals,
    ChangeCanister,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MyUser {
    pub me: User,
    #[serde(default)]
    pub privileges: Vec<UserPrivilege>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetMetadata {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalletAsset {
    pub blockchain: String,
    pub standard: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub metadata: Vec<AssetMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub version: String,
    #[serde(default)]
    pub supported_assets: Vec<WalletAsset>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Sent,
    Read,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub message: Option<String>,
    pub status: NotificationStatus,
    pub target_user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkNotificationsReadInput {
    pub notification_ids: Vec<Uuid>,
    pub read: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FetchAccountBalancesInput {
    pub account_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountBalance {
    pub account_id: Uuid,
    /// Raw amount in the asset's smallest unit, as decimal text.
    pub balance: String,
    pub decimals: u32,
    pub last_update_timestamp: DateTime<Utc>,
}

/// Error payload returned by the wallet service for rejected calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiErrorBody {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<std::collections::BTreeMap<String, String>>,
}
