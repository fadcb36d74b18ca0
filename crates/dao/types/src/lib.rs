//! DAO Process Domain Types
//!
//! This crate defines the domain types for a membership-token DAO that runs
//! as a single message-driven process: a host delivers one message at a
//! time, and the process answers with result records.
//!
//! # Key Concepts
//!
//! - **Ledger**: identity → balance, with a tracked total supply. The ledger
//!   owns every supply invariant.
//! - **Membership**: derived, never stored. An identity is a member iff its
//!   balance is positive.
//! - **Add-member requests**: proposals to admit a candidate, resolved by a
//!   vote of the current members.
//! - **Records**: the typed results of handling one message. Turning them
//!   into the host's textual output is the runtime's job.
//!
//! # Architecture
//!
//! This is a pure types crate with no runtime dependencies. Identifiers use
//! the newtype pattern and implement `Display` and `new()`.

#![deny(unsafe_code)]

mod amount;
mod errors;
mod identity;
mod ledger;
mod message;
mod metadata;
mod record;
mod request;
mod state;

pub use amount::*;
pub use errors::*;
pub use identity::*;
pub use ledger::*;
pub use message::*;
pub use metadata::*;
pub use record::*;
pub use request::*;
pub use state::*;
