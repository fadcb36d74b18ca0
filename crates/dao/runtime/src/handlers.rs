//! Per-action handlers
//!
//! Each handler runs after access control has accepted the message. They
//! are thin: the ledger and the request engine hold the actual rules.

use crate::config::DaoConfig;
use crate::request_engine::{RequestEngine, Resolution, Submission, VoteOutcome};
use dao_types::{
    DaoError, DaoResult, DaoState, Environment, Event, MemberAdmission, Message, OutboundMessage,
    Record, Reply, RequestId, RequestRejection, SubmissionReceipt, VoteChoice, VoteReceipt,
};
use tracing::info;

pub const SUBMITTED_MESSAGE: &str = "Request to add new member submitted successfully";

/// Build the initial state
///
/// Metadata starts from the configured defaults and is overridden by the
/// Init message's tags. Tags on the process itself are not consulted. The
/// whole initial supply goes to the process identity, which acts as the
/// treasury.
pub fn init(config: &DaoConfig, env: &Environment, msg: &Message) -> DaoResult<DaoState> {
    let mut metadata = config.token.metadata();

    if let Some(name) = msg.tag("Name").filter(|v| !v.trim().is_empty()) {
        metadata.name = name.to_string();
    }
    if let Some(ticker) = msg.tag("Ticker").filter(|v| !v.trim().is_empty()) {
        metadata.ticker = ticker.to_string();
    }

    if let Some(raw) = msg.tag("Denomination") {
        metadata.denomination = raw.trim().parse().map_err(|_| DaoError::InvalidTag {
            name: "Denomination".to_string(),
            value: raw.to_string(),
        })?;
    }

    let treasury = env.process.id.clone();
    let mut state = DaoState::new(metadata, treasury.clone());
    if let Some(unique_id) = msg.tag("UniqueID") {
        state = state.with_unique_id(unique_id);
    }
    state
        .ledger
        .credit(&treasury, config.token.initial_supply())?;

    info!(
        name = %state.metadata.name,
        ticker = %state.metadata.ticker,
        treasury = %treasury,
        supply = %state.ledger.total_supply(),
        "DAO initialized"
    );

    Ok(state)
}

pub fn info(state: &DaoState) -> Reply {
    let mut line = state.metadata.info_line();
    if let Some(unique_id) = &state.unique_id {
        line.push_str(&format!(" UniqueID: {}", unique_id));
    }
    Reply::text(line)
}

pub fn balance(state: &DaoState, msg: &Message) -> Reply {
    Reply::text(format!(
        "Your balance is {} {}",
        state.ledger.balance_of(&msg.from),
        state.metadata.ticker
    ))
}

pub fn get_balances(state: &DaoState) -> Reply {
    Reply::record(Record::Balances(state.ledger.all_balances().clone()))
}

pub fn request_add_member(
    engine: &RequestEngine,
    state: &mut DaoState,
    msg: &Message,
) -> DaoResult<Reply> {
    let candidate = msg.required_tag("Member_To_Add")?;
    // Trimmed the same way `required_tag` trims the `RequestId` of a vote.
    let id = msg
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(DaoError::MissingMessageId)?;

    let request_id = engine.submit(
        state,
        Submission {
            id: RequestId::new(id),
            requester: msg.from.clone(),
            candidate: candidate.into(),
            block_height: msg.block_height,
            created_at: msg.sent_at(),
        },
    )?;

    Ok(Reply::event(Event::RequestSubmitted(SubmissionReceipt {
        message: SUBMITTED_MESSAGE.to_string(),
        request_id,
        candidate: candidate.into(),
    })))
}

pub fn get_add_requests(engine: &RequestEngine, state: &DaoState) -> Reply {
    let requests = engine.list(state).into_iter().cloned().collect();
    Reply::event(Event::AddRequestsList(requests))
}

pub fn vote_on_request(
    engine: &RequestEngine,
    state: &mut DaoState,
    msg: &Message,
) -> DaoResult<Reply> {
    let request_id = RequestId::new(msg.required_tag("RequestId")?);
    let choice: VoteChoice = msg.required_tag("Vote")?.parse()?;

    let outcome = engine.vote(state, &request_id, &msg.from, choice)?;
    Ok(vote_reply(state, outcome))
}

/// Acknowledgment first, then the membership event if the vote resolved
/// the request
fn vote_reply(state: &DaoState, outcome: VoteOutcome) -> Reply {
    let mut reply = Reply::event(Event::VoteRecorded(VoteReceipt {
        request_id: outcome.request_id.clone(),
        voter: outcome.voter,
        vote: outcome.choice,
        replaced: outcome.previous.is_some(),
        status: outcome.status,
        tally: outcome.tally,
    }));

    match outcome.resolution {
        Some(Resolution::Approved { member, granted }) => {
            let balance = state.ledger.balance_of(&member);
            reply.send(
                OutboundMessage::new(member.clone())
                    .with_tag("Action", "Credit-Notice")
                    .with_tag("Sender", state.treasury.as_str())
                    .with_tag("Quantity", granted.to_string())
                    .with_tag("RequestId", outcome.request_id.as_str())
                    .with_data(format!(
                        "You were admitted to {} and received {} {}",
                        state.metadata.name, granted, state.metadata.ticker
                    )),
            );
            reply.push(Record::Event(Event::MemberAdded(MemberAdmission {
                request_id: outcome.request_id,
                member,
                granted,
                balance,
            })));
        }
        Some(Resolution::Rejected { candidate, reason }) => {
            reply.push(Record::Event(Event::RequestRejected(RequestRejection {
                request_id: outcome.request_id,
                candidate,
                reason,
            })));
        }
        None => {}
    }

    reply
}
