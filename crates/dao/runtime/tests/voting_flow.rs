//! End-to-end test: add-member requests and voting.
//!
//! Verifies that:
//! - members can submit requests and non-members cannot
//! - an approving vote admits the candidate with a 2e12 grant
//! - a resolved request never pays out twice
//! - re-votes replace earlier votes instead of adding to them
//! - one-member-one-vote counts heads instead of tokens
//! - any message sequence keeps the supply consistent

use dao_runtime::{DaoConfig, DaoProcess, HandleResult};
use dao_types::{
    Action, Amount, Environment, Identity, Message, ProcessInfo, RequestStatus, VotingRule,
};
use proptest::prelude::*;
use serde_json::Value;
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn initialized() -> DaoProcess {
    initialized_with(DaoConfig::default())
}

fn initialized_with(config: DaoConfig) -> DaoProcess {
    let env = Environment::new(ProcessInfo::new("AOS", "FOOBAR").with_tag("Name", "DAO Token"));
    let mut process = DaoProcess::new(env, config);
    process.deliver(
        &Message::new("FOOBAR")
            .with_id("init123")
            .with_block_height(1000)
            .with_action(Action::Init)
            .with_data("hello"),
    );
    process
}

fn request(from: &str, id: &str, candidate: &str) -> Message {
    Message::new(from)
        .with_id(id)
        .with_action(Action::RequestAddMember)
        .with_tag("Member_To_Add", candidate)
}

fn vote(from: &str, id: &str, choice: &str) -> Message {
    Message::new(from)
        .with_action(Action::VoteOnRequest)
        .with_tag("RequestId", id)
        .with_tag("Vote", choice)
}

fn query(from: &str, action: Action) -> Message {
    Message::new(from).with_action(action)
}

/// Every newline-separated JSON object in the output
fn parse_all(result: &HandleResult) -> Vec<Value> {
    result
        .output
        .as_ref()
        .map(|o| o.data.as_str())
        .unwrap_or("")
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn parse_one(result: &HandleResult) -> Value {
    let mut all = parse_all(result);
    assert_eq!(all.len(), 1, "expected a single record");
    all.remove(0)
}

fn balance(process: &DaoProcess, who: &str) -> Amount {
    process
        .state()
        .map(|s| s.ledger.balance_of(&Identity::new(who)))
        .unwrap_or_default()
}

/// AOS holds 9e12 and NEW_MEMBER 2e12 after one admission
fn with_second_member() -> DaoProcess {
    let mut process = initialized();
    process.deliver(&request("AOS", "request123", "NEW_MEMBER"));
    process.deliver(&vote("AOS", "request123", "yes"));
    assert_eq!(balance(&process, "NEW_MEMBER"), Amount::new(2_000_000_000_000));
    process
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn request_add_member_as_member() {
    let mut process = initialized();
    let result = parse_one(&process.deliver(&request("AOS", "request123", "NEW_MEMBER")));
    assert_eq!(result["action"], "RequestSubmitted");
    assert_eq!(
        result["data"]["message"],
        "Request to add new member submitted successfully"
    );
    assert_eq!(result["data"]["requestId"], "request123");
}

#[test]
fn request_add_member_as_non_member() {
    let mut process = initialized();
    let result = parse_one(&process.deliver(&request(
        "NOT A MEMBER",
        "BAD_REQUEST",
        "ANOTHER_NEW_MEMBER",
    )));
    assert_eq!(result["action"], "Error");
    assert_eq!(
        result["data"],
        "Unauthorized: Only members can request to add new members"
    );
    assert!(process.state().map(|s| s.requests.is_empty()).unwrap_or(false));
}

#[test]
fn full_admission_flow() {
    let mut process = initialized();
    process.deliver(&request("AOS", "request123", "NEW_MEMBER"));

    let list = parse_one(&process.deliver(&query("AOS", Action::GetAddRequests)));
    assert_eq!(list["action"], "AddRequestsList");
    assert_eq!(list["data"][0]["id"], "request123");
    assert_eq!(list["data"][0]["status"], "Pending");

    let result = process.deliver(&vote("AOS", "request123", "yes"));
    let records = parse_all(&result);
    let actions: Vec<_> = records.iter().map(|r| r["action"].clone()).collect();
    assert_eq!(actions, vec!["VoteRecorded", "MemberAdded"]);
    assert_eq!(records[1]["data"]["member"], "NEW_MEMBER");

    assert_eq!(result.messages.len(), 1);
    assert_eq!(result.messages[0].target, Identity::new("NEW_MEMBER"));

    let balances = parse_one(&process.deliver(&query("AOS", Action::GetBalances)));
    assert_eq!(balances["NEW_MEMBER"], "2000000000000");
    assert_eq!(balances["AOS"], "9000000000000");

    let own = process.deliver(&query("AOS", Action::Balance));
    assert_eq!(
        own.output.map(|o| o.data).as_deref(),
        Some("Your balance is 9000000000000 DAO")
    );

    let state = process.state().unwrap();
    assert_eq!(state.ledger.total_supply(), Amount::new(11_000_000_000_000));
    assert!(state.ledger.is_consistent());
}

#[test]
fn vote_as_non_member() {
    let mut process = initialized();
    process.deliver(&request("AOS", "request123", "NEW_MEMBER"));

    let result = parse_one(&process.deliver(&vote("NOT A MEMBER", "request123", "yes")));
    assert_eq!(result["action"], "Error");
    assert_eq!(
        result["data"],
        "Unauthorized: You must have a positive balance to vote"
    );
}

#[test]
fn get_add_requests_as_non_member() {
    let mut process = initialized();
    let result = parse_one(&process.deliver(&query("NOT A MEMBER", Action::GetAddRequests)));
    assert_eq!(result["data"], "Unauthorized: Only members can view add requests");
}

#[test]
fn resolved_request_pays_out_exactly_once() {
    let mut process = with_second_member();
    let before = process.state().cloned();

    for voter in ["AOS", "NEW_MEMBER"] {
        let result = parse_one(&process.deliver(&vote(voter, "request123", "yes")));
        assert_eq!(result["action"], "Error");
    }
    assert_eq!(process.state().cloned(), before);
}

#[test]
fn blocking_vote_rejects() {
    let mut process = with_second_member();
    process.deliver(&request("NEW_MEMBER", "request456", "CANDIDATE"));

    let records = parse_all(&process.deliver(&vote("AOS", "request456", "no")));
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["action"], "RequestRejected");
    assert_eq!(balance(&process, "CANDIDATE"), Amount::zero());
}

#[test]
fn minority_vote_leaves_request_pending() {
    let mut process = with_second_member();
    process.deliver(&request("AOS", "request456", "CANDIDATE"));

    let records = parse_all(&process.deliver(&vote("NEW_MEMBER", "request456", "yes")));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["data"]["status"], "Pending");

    let records = parse_all(&process.deliver(&vote("AOS", "request456", "yes")));
    assert_eq!(records[1]["action"], "MemberAdded");
    assert_eq!(balance(&process, "CANDIDATE"), Amount::new(2_000_000_000_000));
}

#[test]
fn duplicate_request_id_is_refused() {
    let mut process = initialized();
    process.deliver(&request("AOS", "request123", "NEW_MEMBER"));
    let result = parse_one(&process.deliver(&request("AOS", "request123", "OTHER")));
    assert_eq!(result["action"], "Error");
    assert_eq!(process.state().map(|s| s.requests.len()), Some(1));
}

#[test]
fn invalid_vote_value_is_refused() {
    let mut process = initialized();
    process.deliver(&request("AOS", "request123", "NEW_MEMBER"));
    let result = parse_one(&process.deliver(&vote("AOS", "request123", "maybe")));
    assert_eq!(result["action"], "Error");
    assert_eq!(
        process
            .state()
            .and_then(|s| s.request(&"request123".into()))
            .map(|r| r.status),
        Some(RequestStatus::Pending)
    );
}

proptest! {
    #[test]
    fn revotes_keep_one_vote_per_member(choices in prop::collection::vec(any::<bool>(), 1..12)) {
        let mut process = with_second_member();
        process.deliver(&request("AOS", "request456", "CANDIDATE"));

        for yes in &choices {
            let choice = if *yes { "yes" } else { "no" };
            process.deliver(&vote("NEW_MEMBER", "request456", choice));
        }

        let state = process.state().unwrap();
        let request = state.request(&"request456".into()).unwrap();
        prop_assert_eq!(request.votes.len(), 1);
        prop_assert!(request.is_pending());

        let tally = parse_all(&process.deliver(&vote("NEW_MEMBER", "request456", "yes")))[0]["data"]["tally"].clone();
        prop_assert_eq!(tally["yes"].as_str(), Some("2000000000000"));
        prop_assert_eq!(tally["no"].as_str(), Some("0"));
    }
}

#[test]
fn one_member_one_vote_outvotes_the_largest_holder() {
    let mut config = DaoConfig::default();
    config.voting.rule = VotingRule::OneMemberOneVote;
    let mut process = initialized_with(config);

    // AOS alone admits NEW_MEMBER, then both admit SECOND.
    process.deliver(&request("AOS", "r1", "NEW_MEMBER"));
    process.deliver(&vote("AOS", "r1", "yes"));
    process.deliver(&request("AOS", "r2", "SECOND"));
    let records = parse_all(&process.deliver(&vote("NEW_MEMBER", "r2", "yes")));
    assert_eq!(records[0]["data"]["status"], "Pending");
    assert_eq!(records[0]["data"]["tally"]["eligible"], "2");
    process.deliver(&vote("AOS", "r2", "yes"));
    assert_eq!(balance(&process, "SECOND"), Amount::new(2_000_000_000_000));

    // Two of three heads approve even though AOS holds most tokens.
    process.deliver(&request("NEW_MEMBER", "r3", "THIRD"));
    process.deliver(&vote("NEW_MEMBER", "r3", "yes"));
    let records = parse_all(&process.deliver(&vote("SECOND", "r3", "yes")));
    assert_eq!(records[0]["data"]["tally"]["yes"], "2");
    assert_eq!(records[1]["action"], "MemberAdded");
    assert_eq!(balance(&process, "THIRD"), Amount::new(2_000_000_000_000));
    assert_eq!(balance(&process, "AOS"), Amount::new(7_000_000_000_000));
}

const SENDERS: [&str; 5] = ["AOS", "NEW_MEMBER", "C1", "C2", "STRANGER"];
const CANDIDATES: [&str; 4] = ["C1", "C2", "C3", "NEW_MEMBER"];
const REQUEST_IDS: [&str; 4] = ["p0", "p1", "p2", "p3"];

#[derive(Clone, Debug)]
enum Step {
    Request { sender: usize, candidate: usize, id: usize },
    Vote { sender: usize, id: usize, yes: bool },
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0..SENDERS.len(), 0..CANDIDATES.len(), 0..REQUEST_IDS.len())
            .prop_map(|(sender, candidate, id)| Step::Request { sender, candidate, id }),
        (0..SENDERS.len(), 0..REQUEST_IDS.len(), any::<bool>())
            .prop_map(|(sender, id, yes)| Step::Vote { sender, id, yes }),
    ]
}

proptest! {
    #[test]
    fn any_message_sequence_keeps_supply_consistent(steps in prop::collection::vec(arb_step(), 1..40)) {
        let mut process = with_second_member();
        let mut grants: HashMap<String, usize> = HashMap::new();
        grants.insert("request123".to_string(), 1);

        for step in steps {
            let msg = match step {
                Step::Request { sender, candidate, id } => {
                    request(SENDERS[sender], REQUEST_IDS[id], CANDIDATES[candidate])
                }
                Step::Vote { sender, id, yes } => {
                    vote(SENDERS[sender], REQUEST_IDS[id], if yes { "yes" } else { "no" })
                }
            };

            for record in parse_all(&process.deliver(&msg)) {
                if record["action"] == "MemberAdded" {
                    let id = record["data"]["requestId"].as_str().unwrap_or_default().to_string();
                    *grants.entry(id).or_default() += 1;
                }
            }

            let state = process.state().unwrap();
            prop_assert!(state.ledger.is_consistent());
            prop_assert!(grants.values().all(|count| *count == 1));

            let admitted = grants.values().sum::<usize>() as u128;
            prop_assert_eq!(
                state.ledger.total_supply(),
                Amount::new(10_000_000_000_000 + admitted * 1_000_000_000_000)
            );
        }
    }
}
