//! Process-wide state
//!
//! Created exactly once by Init and owned by the runtime for the lifetime
//! of the process. It is serializable so a host memory handoff can be
//! modelled as snapshot and restore.

use crate::{AddMemberRequest, Identity, Ledger, RequestId, TokenMetadata};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaoState {
    pub metadata: TokenMetadata,
    /// Holder of the initial supply; admission transfers are drawn from it
    pub treasury: Identity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    pub ledger: Ledger,
    /// All requests, pending and resolved, in creation order
    pub requests: IndexMap<RequestId, AddMemberRequest>,
}

impl DaoState {
    pub fn new(metadata: TokenMetadata, treasury: Identity) -> Self {
        Self {
            metadata,
            treasury,
            unique_id: None,
            ledger: Ledger::new(),
            requests: IndexMap::new(),
        }
    }

    pub fn with_unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    pub fn request(&self, id: &RequestId) -> Option<&AddMemberRequest> {
        self.requests.get(id)
    }
}
