//! DAO Process Runtime
//!
//! Runs the membership DAO defined in `dao-types` as a message-driven
//! process:
//!
//! - `access_control`: who may perform which action
//! - `request_engine`: add-member requests, votes and admission grants
//! - `handlers`: one function per action
//! - `process`: the dispatcher that owns the state
//! - `transport`: encoding records into the host's output payload
//! - `config`: layered process configuration
//!
//! ```
//! use dao_runtime::{DaoConfig, DaoProcess};
//! use dao_types::{Action, Environment, Message, ProcessInfo};
//!
//! let env = Environment::new(ProcessInfo::new("AOS", "FOOBAR"));
//! let mut process = DaoProcess::new(env, DaoConfig::default());
//!
//! process.deliver(&Message::new("FOOBAR").with_action(Action::Init));
//! let result = process.deliver(&Message::new("AOS").with_action(Action::Balance));
//! assert_eq!(result.output.unwrap().data, "Your balance is 10000000000000 DAO");
//! ```

#![deny(unsafe_code)]

pub mod access_control;
pub mod config;
pub mod handlers;
pub mod process;
pub mod request_engine;
pub mod transport;

pub use access_control::{authorize, Policy};
pub use config::{AdmissionConfig, DaoConfig, LoggingConfig, TokenConfig, VotingConfig};
pub use process::DaoProcess;
pub use request_engine::{AdmissionGrant, RequestEngine, Resolution, Submission, VoteOutcome};
pub use transport::{encode_record, encode_records, HandleResult, Output};
