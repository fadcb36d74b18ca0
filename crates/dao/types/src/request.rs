//! Add-member requests: proposals to admit a candidate
//!
//! A request collects at most one vote per member and is resolved by a
//! majority of the eligible voting weight. Weights are read from the
//! ledger at tally time, so a voter's influence follows their current
//! balance (or current membership, under one-member-one-vote).

use crate::{Amount, DaoError, Identity, Ledger, RequestId};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A member's choice on a request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    Yes,
    No,
}

impl std::str::FromStr for VoteChoice {
    type Err = DaoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            _ => Err(DaoError::InvalidVote(s.to_string())),
        }
    }
}

impl std::fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yes => write!(f, "yes"),
            Self::No => write!(f, "no"),
        }
    }
}

/// Lifecycle of a request: `Pending` until resolved, then terminal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Approved => write!(f, "Approved"),
            Self::Rejected => write!(f, "Rejected"),
        }
    }
}

/// How votes are weighed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum VotingRule {
    /// Weight is the voter's current balance; eligible weight is the total supply
    #[default]
    TokenWeighted,
    /// Weight is 1 per current member; eligible weight is the member count
    OneMemberOneVote,
}

/// Weighted vote totals for one request
///
/// Weights are token amounts under the token-weighted rule, so they share
/// `Amount`'s decimal-string wire form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    pub yes: Amount,
    pub no: Amount,
    pub eligible: Amount,
}

impl Tally {
    /// Strict majority approves; a blocking half or more rejects
    pub fn outcome(&self) -> RequestStatus {
        let (yes, no, eligible) = (self.yes.0, self.no.0, self.eligible.0);
        if eligible == 0 {
            return RequestStatus::Pending;
        }
        if yes > eligible.saturating_sub(yes) {
            RequestStatus::Approved
        } else if no >= eligible.saturating_sub(no) {
            RequestStatus::Rejected
        } else {
            RequestStatus::Pending
        }
    }
}

/// A proposal to admit `candidate` as a new member
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub id: RequestId,
    pub requester: Identity,
    pub candidate: Identity,
    /// One entry per voter, in first-vote order
    pub votes: IndexMap<Identity, VoteChoice>,
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_height: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl AddMemberRequest {
    pub fn new(id: RequestId, requester: Identity, candidate: Identity) -> Self {
        Self {
            id,
            requester,
            candidate,
            votes: IndexMap::new(),
            status: RequestStatus::Pending,
            block_height: None,
            created_at: None,
        }
    }

    pub fn with_block_height(mut self, height: u64) -> Self {
        self.block_height = Some(height);
        self
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// Record a vote, replacing any earlier vote by the same voter.
    /// Returns the replaced choice.
    pub fn cast_vote(&mut self, voter: Identity, choice: VoteChoice) -> Option<VoteChoice> {
        self.votes.insert(voter, choice)
    }

    /// Weigh the recorded votes against the current ledger
    pub fn tally(&self, ledger: &Ledger, rule: VotingRule) -> Tally {
        let weight = |voter: &Identity| -> u128 {
            match rule {
                VotingRule::TokenWeighted => ledger.balance_of(voter).0,
                VotingRule::OneMemberOneVote => u128::from(ledger.is_member(voter)),
            }
        };
        let eligible = match rule {
            VotingRule::TokenWeighted => ledger.total_supply().0,
            VotingRule::OneMemberOneVote => ledger.member_count() as u128,
        };

        let (yes, no) = self
            .votes
            .iter()
            .fold((0u128, 0u128), |(yes, no), (voter, choice)| match choice {
                VoteChoice::Yes => (yes.saturating_add(weight(voter)), no),
                VoteChoice::No => (yes, no.saturating_add(weight(voter))),
            });

        Tally {
            yes: Amount(yes),
            no: Amount(no),
            eligible: Amount(eligible),
        }
    }
}
