//! Result records: what handling one message produced
//!
//! Handlers return an ordered list of records. Most actions produce a
//! single record; a resolving vote produces the vote acknowledgment
//! followed by the membership event. How records become the host's output
//! string is decided at the transport boundary, not here.

use crate::{
    AddMemberRequest, Amount, DaoError, Identity, OutboundMessage, RequestId, RequestStatus,
    Tally, VoteChoice,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Confirmation payload of a newly submitted request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub message: String,
    pub request_id: RequestId,
    pub candidate: Identity,
}

/// Acknowledgment of a recorded vote
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    pub request_id: RequestId,
    pub voter: Identity,
    pub vote: VoteChoice,
    /// True when this vote replaced an earlier one by the same voter
    pub replaced: bool,
    pub status: RequestStatus,
    pub tally: Tally,
}

/// A candidate admitted by an approved request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberAdmission {
    pub request_id: RequestId,
    pub member: Identity,
    pub granted: Amount,
    pub balance: Amount,
}

/// A request that can no longer pass
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRejection {
    pub request_id: RequestId,
    pub candidate: Identity,
    pub reason: String,
}

/// Structured results, serialized as `{"action": ..., "data": ...}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data")]
pub enum Event {
    RequestSubmitted(SubmissionReceipt),
    AddRequestsList(Vec<AddMemberRequest>),
    VoteRecorded(VoteReceipt),
    MemberAdded(MemberAdmission),
    RequestRejected(RequestRejection),
    Error(String),
}

/// One logical result of handling a message
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Record {
    /// Display text, emitted verbatim
    Text(String),
    /// The full ledger as identity → balance
    Balances(IndexMap<Identity, Amount>),
    Event(Event),
}

impl Record {
    pub fn error(err: &DaoError) -> Self {
        Self::Event(Event::Error(err.to_string()))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Event(Event::Error(_)))
    }
}

/// Everything handling one message produced, in order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reply {
    pub records: Vec<Record>,
    pub messages: Vec<OutboundMessage>,
}

impl Reply {
    /// No output at all (e.g. Init)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn record(record: Record) -> Self {
        Self {
            records: vec![record],
            messages: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::record(Record::Text(text.into()))
    }

    pub fn event(event: Event) -> Self {
        Self::record(Record::Event(event))
    }

    pub fn error(err: &DaoError) -> Self {
        Self::record(Record::error(err))
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn send(&mut self, message: OutboundMessage) {
        self.messages.push(message);
    }

    pub fn is_error(&self) -> bool {
        self.records.iter().any(Record::is_error)
    }
}
