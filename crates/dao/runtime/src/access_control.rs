//! Access Control - authorizes every message before its handler runs
//!
//! Three policies cover all actions: open to anyone, members only, and the
//! one-time owner-only Init. A denial is terminal for the message and
//! leaves state untouched.

use dao_types::{Action, DaoError, DaoResult, DaoState, Identity};
use tracing::warn;

/// Who may perform an action
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Policy {
    /// Any sender
    Open,
    /// Senders with a positive balance; `denial` is the fixed error text
    MemberOnly { denial: &'static str },
    /// The process owner, exactly once
    OwnerOnce,
}

impl Policy {
    pub fn for_action(action: Action) -> Self {
        match action {
            Action::Init => Self::OwnerOnce,
            Action::Info | Action::Balance => Self::Open,
            Action::GetBalances => Self::MemberOnly {
                denial: "Unauthorized: Only members can get balances",
            },
            Action::RequestAddMember => Self::MemberOnly {
                denial: "Unauthorized: Only members can request to add new members",
            },
            Action::GetAddRequests => Self::MemberOnly {
                denial: "Unauthorized: Only members can view add requests",
            },
            Action::VoteOnRequest => Self::MemberOnly {
                denial: "Unauthorized: You must have a positive balance to vote",
            },
        }
    }
}

/// Decide whether `sender` may perform `action`
///
/// `state` is `None` until Init has run.
pub fn authorize(
    action: Action,
    sender: &Identity,
    owner: &Identity,
    state: Option<&DaoState>,
) -> DaoResult<()> {
    match Policy::for_action(action) {
        Policy::OwnerOnce => {
            if state.is_some() {
                return Err(DaoError::AlreadyInitialized);
            }
            if sender != owner {
                warn!(sender = %sender, "Init from non-owner refused");
                return Err(DaoError::Unauthorized(
                    "Unauthorized: Only the process owner can initialize".to_string(),
                ));
            }
            Ok(())
        }
        Policy::Open => state.map(|_| ()).ok_or(DaoError::NotInitialized),
        Policy::MemberOnly { denial } => {
            let state = state.ok_or(DaoError::NotInitialized)?;
            if state.ledger.is_member(sender) {
                Ok(())
            } else {
                warn!(sender = %sender, action = %action, "Non-member refused");
                Err(DaoError::Unauthorized(denial.to_string()))
            }
        }
    }
}
