//! Request Engine - add-member requests from submission to resolution
//!
//! The engine owns the rules (vote weighting and admission grant) but not
//! the data: requests and balances live in `DaoState`, which is passed in
//! per call. A vote is evaluated on a copy of its request; the copy is
//! written back only after any ledger grant has succeeded, so a failed
//! grant discards the vote as well.

use crate::config::DaoConfig;
use chrono::{DateTime, Utc};
use dao_types::{
    AddMemberRequest, Amount, DaoError, DaoResult, DaoState, Identity, RequestId, RequestStatus,
    Tally, VoteChoice, VotingRule,
};
use tracing::{debug, info, warn};

/// Tokens a new member receives on approval
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdmissionGrant {
    /// Moved from the treasury
    pub transfer: Amount,
    /// Newly minted
    pub mint: Amount,
}

impl AdmissionGrant {
    pub fn new(transfer: Amount, mint: Amount) -> Self {
        Self { transfer, mint }
    }

    /// What the new member ends up receiving in total
    pub fn total(&self) -> Amount {
        Amount(self.transfer.0.saturating_add(self.mint.0))
    }
}

/// How a request left `Pending`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Approved { member: Identity, granted: Amount },
    Rejected { candidate: Identity, reason: String },
}

/// Result of casting a vote
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteOutcome {
    pub request_id: RequestId,
    pub voter: Identity,
    pub choice: VoteChoice,
    pub previous: Option<VoteChoice>,
    pub status: RequestStatus,
    pub tally: Tally,
    /// Set when this vote resolved the request
    pub resolution: Option<Resolution>,
}

/// Submission details taken from the creating message
#[derive(Clone, Debug)]
pub struct Submission {
    pub id: RequestId,
    pub requester: Identity,
    pub candidate: Identity,
    pub block_height: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
}

/// The Request Engine - coordinates admission votes
#[derive(Clone, Debug)]
pub struct RequestEngine {
    rule: VotingRule,
    grant: AdmissionGrant,
}

impl RequestEngine {
    pub fn new(rule: VotingRule, grant: AdmissionGrant) -> Self {
        Self { rule, grant }
    }

    pub fn from_config(config: &DaoConfig) -> Self {
        Self::new(
            config.voting.rule,
            AdmissionGrant::new(
                Amount::from(config.admission.transfer_amount),
                Amount::from(config.admission.mint_amount),
            ),
        )
    }

    /// Create a pending request
    pub fn submit(&self, state: &mut DaoState, submission: Submission) -> DaoResult<RequestId> {
        if state.requests.contains_key(&submission.id) {
            return Err(DaoError::DuplicateRequest(submission.id));
        }
        if state.ledger.is_member(&submission.candidate) {
            return Err(DaoError::AlreadyMember(submission.candidate));
        }

        let mut request = AddMemberRequest::new(
            submission.id.clone(),
            submission.requester,
            submission.candidate,
        );
        if let Some(height) = submission.block_height {
            request = request.with_block_height(height);
        }
        if let Some(at) = submission.created_at {
            request = request.with_created_at(at);
        }

        info!(
            request_id = %request.id,
            requester = %request.requester,
            candidate = %request.candidate,
            "Add-member request submitted"
        );

        let id = request.id.clone();
        state.requests.insert(id.clone(), request);
        Ok(id)
    }

    /// Record a vote and resolve the request if the threshold is crossed
    pub fn vote(
        &self,
        state: &mut DaoState,
        request_id: &RequestId,
        voter: &Identity,
        choice: VoteChoice,
    ) -> DaoResult<VoteOutcome> {
        let current = state
            .requests
            .get(request_id)
            .ok_or_else(|| DaoError::RequestNotFound(request_id.clone()))?;

        if !current.is_pending() {
            return Err(DaoError::RequestNotPending {
                id: request_id.clone(),
                status: current.status,
            });
        }

        let mut request = current.clone();
        let previous = request.cast_vote(voter.clone(), choice);
        let tally = request.tally(&state.ledger, self.rule);

        debug!(
            request_id = %request_id,
            voter = %voter,
            vote = %choice,
            yes = %tally.yes,
            no = %tally.no,
            eligible = %tally.eligible,
            "Vote recorded"
        );

        let resolution = match tally.outcome() {
            RequestStatus::Pending => None,
            RequestStatus::Approved if state.ledger.is_member(&request.candidate) => {
                // Admitted through another request while this one was open.
                request.status = RequestStatus::Rejected;
                Some(Resolution::Rejected {
                    candidate: request.candidate.clone(),
                    reason: "Candidate is already a member".to_string(),
                })
            }
            RequestStatus::Approved => {
                state
                    .ledger
                    .grant(
                        &state.treasury,
                        &request.candidate,
                        self.grant.transfer,
                        self.grant.mint,
                    )
                    .inspect_err(|e| {
                        warn!(request_id = %request_id, error = %e, "Admission grant failed");
                    })?;
                request.status = RequestStatus::Approved;

                info!(
                    request_id = %request_id,
                    member = %request.candidate,
                    granted = %self.grant.total(),
                    "Member admitted"
                );

                Some(Resolution::Approved {
                    member: request.candidate.clone(),
                    granted: self.grant.total(),
                })
            }
            RequestStatus::Rejected => {
                request.status = RequestStatus::Rejected;
                info!(request_id = %request_id, candidate = %request.candidate, "Request rejected");
                Some(Resolution::Rejected {
                    candidate: request.candidate.clone(),
                    reason: "Majority voted against".to_string(),
                })
            }
        };

        let status = request.status;
        state.requests.insert(request_id.clone(), request);

        Ok(VoteOutcome {
            request_id: request_id.clone(),
            voter: voter.clone(),
            choice,
            previous,
            status,
            tally,
            resolution,
        })
    }

    /// All requests in creation order
    pub fn list<'a>(&self, state: &'a DaoState) -> Vec<&'a AddMemberRequest> {
        state.requests.values().collect()
    }
}
