//! Transport encoding
//!
//! Converts typed records into the host's textual output payload. Text
//! records pass through verbatim; everything else is one compact JSON
//! object. Multiple records are joined with `\n`.

use crate::process::DaoProcess;
use dao_types::{Event, Message, OutboundMessage, Record, Reply};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Textual output payload for the host
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub data: String,
}

/// What the host receives for one delivered message
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HandleResult {
    pub output: Option<Output>,
    #[serde(default)]
    pub messages: Vec<OutboundMessage>,
}

impl From<Reply> for HandleResult {
    fn from(reply: Reply) -> Self {
        Self {
            output: encode_records(&reply.records).map(|data| Output { data }),
            messages: reply.messages,
        }
    }
}

/// Encode a single record
pub fn encode_record(record: &Record) -> String {
    let encoded = match record {
        Record::Text(text) => return text.clone(),
        Record::Balances(balances) => serde_json::to_string(balances),
        Record::Event(event) => serde_json::to_string(event),
    };

    encoded.unwrap_or_else(|err| {
        error!(error = %err, "Failed to encode record");
        serde_json::to_string(&Event::Error(format!("Failed to encode output: {}", err)))
            .unwrap_or_default()
    })
}

/// Encode all records of one reply; `None` when there are none
pub fn encode_records(records: &[Record]) -> Option<String> {
    if records.is_empty() {
        return None;
    }
    Some(
        records
            .iter()
            .map(encode_record)
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

impl DaoProcess {
    /// Handle a message and encode the result for the host
    pub fn deliver(&mut self, msg: &Message) -> HandleResult {
        self.handle(msg).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dao_types::{Amount, DaoError, Identity, OutboundMessage};
    use indexmap::IndexMap;

    #[test]
    fn test_text_passes_through() {
        let record = Record::Text("Your balance is 0 DAO".to_string());
        assert_eq!(encode_record(&record), "Your balance is 0 DAO");
    }

    #[test]
    fn test_balances_are_a_bare_object() {
        let mut balances = IndexMap::new();
        balances.insert(Identity::new("AOS"), Amount::new(9_000_000_000_000));
        balances.insert(Identity::new("NEW_MEMBER"), Amount::new(2_000_000_000_000));

        assert_eq!(
            encode_record(&Record::Balances(balances)),
            r#"{"AOS":"9000000000000","NEW_MEMBER":"2000000000000"}"#
        );
    }

    #[test]
    fn test_error_shape() {
        let record = Record::error(&DaoError::Unauthorized(
            "Unauthorized: Only members can get balances".to_string(),
        ));
        let value: serde_json::Value = serde_json::from_str(&encode_record(&record)).unwrap();
        assert_eq!(value["action"], "Error");
        assert_eq!(value["data"], "Unauthorized: Only members can get balances");
    }

    #[test]
    fn test_records_are_newline_joined() {
        let records = vec![
            Record::Text("first".to_string()),
            Record::Text("second".to_string()),
        ];
        assert_eq!(encode_records(&records).as_deref(), Some("first\nsecond"));
        assert_eq!(encode_records(&[]), None);
    }

    #[test]
    fn test_handle_result_shape() {
        let mut reply = Reply::text("hello");
        reply.send(OutboundMessage::new(Identity::new("X")).with_tag("Action", "Credit-Notice"));

        let value = serde_json::to_value(HandleResult::from(reply)).unwrap();
        assert_eq!(value["Output"]["data"], "hello");
        assert_eq!(value["Messages"][0]["Target"], "X");

        let value = serde_json::to_value(HandleResult::from(Reply::empty())).unwrap();
        assert!(value["Output"].is_null());
    }
}
