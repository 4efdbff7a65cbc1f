use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AssetMetadata, opt_list};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Created,
    Adopted,
    Rejected,
    Cancelled,
    Scheduled,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProposalVoteStatus {
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProposalVote {
    pub user_id: Uuid,
    pub status: ProposalVoteStatus,
    #[serde(default)]
    pub status_reason: Option<String>,
    pub decided_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Proposal {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    pub status: ProposalStatus,
    pub proposed_by: Uuid,
    #[serde(default)]
    pub votes: Vec<ProposalVote>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteOnProposalInput {
    pub proposal_id: Uuid,
    pub approve: bool,
    #[serde(with = "opt_list", default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthScope {
    Public,
    Authenticated,
    Restricted,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessPolicy {
    pub auth_scope: AuthScope,
    #[serde(default)]
    pub user_groups: Vec<Uuid>,
    #[serde(default)]
    pub users: Vec<Uuid>,
}

impl AccessPolicy {
    /// Access limited to exactly the given users.
    pub fn restricted_to(users: Vec<Uuid>) -> Self {
        Self {
            auth_scope: AuthScope::Restricted,
            user_groups: Vec::new(),
            users,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserSpecifier {
    Any,
    Owner,
    Proposer,
    Group(Vec<Uuid>),
    Id(Vec<Uuid>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalCriteria {
    /// Percentage of the specified voters that must approve.
    ApprovalThreshold { threshold: u16, voters: UserSpecifier },
    MinimumVotes { minimum: u16, voters: UserSpecifier },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionSchedule {
    Immediate,
    Scheduled { execution_time: DateTime<Utc> },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddAccountOperationInput {
    pub name: String,
    pub blockchain: String,
    pub standard: String,
    #[serde(default)]
    pub metadata: Vec<AssetMetadata>,
    pub read_access_policy: AccessPolicy,
    pub transfer_access_policy: AccessPolicy,
    pub update_access_policy: AccessPolicy,
    #[serde(with = "opt_list", default)]
    pub update_approval_policy: Option<ApprovalCriteria>,
    #[serde(with = "opt_list", default)]
    pub transfer_approval_policy: Option<ApprovalCriteria>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProposalOperationInput {
    AddAccount(AddAccountOperationInput),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateProposalInput {
    #[serde(with = "opt_list", default)]
    pub title: Option<String>,
    #[serde(with = "opt_list", default)]
    pub summary: Option<String>,
    #[serde(with = "opt_list", default)]
    pub execution_plan: Option<ExecutionSchedule>,
    pub operation: ProposalOperationInput,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn vote_reason_is_sent_as_list() {
        let proposal_id = Uuid::new_v4();
        let without = VoteOnProposalInput {
            proposal_id,
            approve: true,
            reason: None,
        };
        let with = VoteOnProposalInput {
            proposal_id,
            approve: false,
            reason: Some("x".to_owned()),
        };

        assert_eq!(serde_json::to_value(&without).unwrap()["reason"], json!([]));
        assert_eq!(serde_json::to_value(&with).unwrap()["reason"], json!(["x"]));
    }

    #[test]
    fn vote_reason_list_decodes_back_to_option() {
        let raw = json!({
            "proposal_id": Uuid::nil(),
            "approve": true,
            "reason": ["looks good"],
        });
        let input: VoteOnProposalInput = serde_json::from_value(raw).unwrap();
        assert_eq!(input.reason.as_deref(), Some("looks good"));

        let too_many = json!({
            "proposal_id": Uuid::nil(),
            "approve": true,
            "reason": ["a", "b"],
        });
        assert!(serde_json::from_value::<VoteOnProposalInput>(too_many).is_err());
    }
}
