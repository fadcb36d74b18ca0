//! DAO Process - the message dispatcher
//!
//! One `DaoProcess` owns the whole DAO state. Messages are handled strictly
//! one at a time through `&mut self`: parse the action, authorize the
//! sender, run the handler. Any failure becomes a single `Error` record and
//! leaves the state as it was.

use crate::access_control::authorize;
use crate::config::DaoConfig;
use crate::handlers;
use crate::request_engine::RequestEngine;
use dao_types::{Action, DaoError, DaoResult, DaoState, Environment, Message, Reply};
use tracing::{debug, instrument, warn};

/// A single DAO process instance
#[derive(Clone, Debug)]
pub struct DaoProcess {
    env: Environment,
    config: DaoConfig,
    engine: RequestEngine,
    /// `None` until Init succeeds
    state: Option<DaoState>,
}

impl DaoProcess {
    pub fn new(env: Environment, config: DaoConfig) -> Self {
        let engine = RequestEngine::from_config(&config);
        Self {
            env,
            config,
            engine,
            state: None,
        }
    }

    /// Resume from a previously initialized state
    ///
    /// The snapshot is refused unless its balances add up to its total
    /// supply and every request is stored under its own id.
    pub fn from_state(env: Environment, config: DaoConfig, state: DaoState) -> DaoResult<Self> {
        if !state.ledger.is_consistent() {
            return Err(DaoError::InvalidSnapshot(format!(
                "balances do not add up to the total supply {}",
                state.ledger.total_supply()
            )));
        }
        if let Some((key, request)) = state.requests.iter().find(|(key, r)| **key != r.id) {
            return Err(DaoError::InvalidSnapshot(format!(
                "request {} is stored under id {}",
                request.id, key
            )));
        }

        let mut process = Self::new(env, config);
        process.state = Some(state);
        Ok(process)
    }

    pub fn state(&self) -> Option<&DaoState> {
        self.state.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Handle one message; errors are folded into the reply
    #[instrument(skip_all, fields(from = %msg.from, id = msg.id.as_deref().unwrap_or("-")))]
    pub fn handle(&mut self, msg: &Message) -> Reply {
        match self.try_handle(msg) {
            Ok(reply) => reply,
            Err(err) => {
                warn!(error = %err, "Message refused");
                Reply::error(&err)
            }
        }
    }

    /// Handle one message, surfacing the error instead of encoding it
    pub fn try_handle(&mut self, msg: &Message) -> DaoResult<Reply> {
        let action = msg.action()?;
        debug!(action = %action, "Dispatching");

        authorize(
            action,
            &msg.from,
            &self.env.process.owner,
            self.state.as_ref(),
        )?;

        if action == Action::Init {
            let state = handlers::init(&self.config, &self.env, msg)?;
            self.state = Some(state);
            return Ok(Reply::empty());
        }

        let state = self.state.as_mut().ok_or(DaoError::NotInitialized)?;
        match action {
            Action::Init => Err(DaoError::AlreadyInitialized),
            Action::Info => Ok(handlers::info(state)),
            Action::Balance => Ok(handlers::balance(state, msg)),
            Action::GetBalances => Ok(handlers::get_balances(state)),
            Action::RequestAddMember => handlers::request_add_member(&self.engine, state, msg),
            Action::GetAddRequests => Ok(handlers::get_add_requests(&self.engine, state)),
            Action::VoteOnRequest => handlers::vote_on_request(&self.engine, state, msg),
        }
    }
}
