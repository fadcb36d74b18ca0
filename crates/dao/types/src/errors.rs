//! Error types for the DAO process
//!
//! Every variant is local to one message: it becomes an `Error` record for
//! the sender and never leaves the process in a half-applied state.

use crate::{Amount, Identity, RequestId, RequestStatus};

/// Errors that can occur while handling a message
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DaoError {
    /// Carries the full, action-specific denial text
    #[error("{0}")]
    Unauthorized(String),

    #[error("Process is not initialized")]
    NotInitialized,

    #[error("Process is already initialized")]
    AlreadyInitialized,

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Missing required tag: {0}")]
    MissingTag(String),

    #[error("Invalid value for tag {name}: {value}")]
    InvalidTag { name: String, value: String },

    #[error("Message has no Id")]
    MissingMessageId,

    #[error("Invalid vote: {0} (expected yes or no)")]
    InvalidVote(String),

    #[error("Request not found: {0}")]
    RequestNotFound(RequestId),

    #[error("Request {id} is not pending (status: {status})")]
    RequestNotPending { id: RequestId, status: RequestStatus },

    #[error("Request already exists: {0}")]
    DuplicateRequest(RequestId),

    #[error("Already a member: {0}")]
    AlreadyMember(Identity),

    #[error("Insufficient funds in {account}: required {required}, available {available}")]
    InsufficientFunds {
        account: Identity,
        required: Amount,
        available: Amount,
    },

    #[error("Token supply overflow")]
    SupplyOverflow,

    /// A restored state that breaks a ledger or request invariant
    #[error("Invalid state snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Result type alias for DAO operations
pub type DaoResult<T> = Result<T, DaoError>;
