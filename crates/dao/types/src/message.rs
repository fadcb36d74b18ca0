//! Host envelope: inbound messages, the process environment, and outbound
//! messages
//!
//! Field names follow the host's JSON shape (`From`, `Tags`,
//! `Block-Height`, ...). The host has already verified signatures and
//! addressing by the time a message is deserialized here.

use crate::{DaoError, DaoResult, Identity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A single `{name, value}` tag
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Look up a tag by exact name; when a name repeats, the last one wins
fn find_tag<'a>(tags: &'a [Tag], name: &str) -> Option<&'a str> {
    tags.iter()
        .rev()
        .find(|t| t.name == name)
        .map(|t| t.value.as_str())
}

/// An inbound message delivered by the host
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Message {
    pub from: Identity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub data: String,
    #[serde(
        rename = "Block-Height",
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub block_height: Option<u64>,
    /// Milliseconds since the Unix epoch
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
}

impl Message {
    pub fn new(from: impl Into<String>) -> Self {
        Self {
            from: Identity::new(from),
            target: None,
            owner: None,
            id: None,
            tags: Vec::new(),
            data: String::new(),
            block_height: None,
            timestamp: None,
            module: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(Identity::new(target));
        self
    }

    pub fn with_action(self, action: Action) -> Self {
        self.with_tag("Action", action.as_str())
    }

    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(Tag::new(name, value));
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = data.into();
        self
    }

    pub fn with_block_height(mut self, height: u64) -> Self {
        self.block_height = Some(height);
        self
    }

    pub fn with_timestamp(mut self, millis: i64) -> Self {
        self.timestamp = Some(millis);
        self
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        find_tag(&self.tags, name)
    }

    /// A tag that must be present and non-empty
    pub fn required_tag(&self, name: &str) -> DaoResult<&str> {
        self.tag(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| DaoError::MissingTag(name.to_string()))
    }

    /// The action this message asks for
    pub fn action(&self) -> DaoResult<Action> {
        self.tag("Action")
            .ok_or_else(|| DaoError::InvalidAction("<missing>".to_string()))?
            .parse()
    }

    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.and_then(DateTime::<Utc>::from_timestamp_millis)
    }
}

/// The actions the process understands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Init,
    Info,
    Balance,
    GetBalances,
    RequestAddMember,
    GetAddRequests,
    VoteOnRequest,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "Init",
            Self::Info => "Info",
            Self::Balance => "Balance",
            Self::GetBalances => "GetBalances",
            Self::RequestAddMember => "RequestAddMember",
            Self::GetAddRequests => "GetAddRequests",
            Self::VoteOnRequest => "VoteOnRequest",
        }
    }
}

impl std::str::FromStr for Action {
    type Err = DaoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Init" => Ok(Self::Init),
            "Info" => Ok(Self::Info),
            "Balance" => Ok(Self::Balance),
            "GetBalances" => Ok(Self::GetBalances),
            "RequestAddMember" => Ok(Self::RequestAddMember),
            "GetAddRequests" => Ok(Self::GetAddRequests),
            "VoteOnRequest" => Ok(Self::VoteOnRequest),
            other => Err(DaoError::InvalidAction(other.to_string())),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Process identity and tags, supplied once by the host at construction
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProcessInfo {
    pub id: Identity,
    pub owner: Identity,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl ProcessInfo {
    pub fn new(id: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            id: Identity::new(id),
            owner: Identity::new(owner),
            tags: Vec::new(),
        }
    }

    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(Tag::new(name, value));
        self
    }
}

/// Ambient environment handed over with every message
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Environment {
    pub process: ProcessInfo,
}

impl Environment {
    pub fn new(process: ProcessInfo) -> Self {
        Self { process }
    }
}

/// A message the process asks the host to send on its behalf
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutboundMessage {
    pub target: Identity,
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub data: String,
}

impl OutboundMessage {
    pub fn new(target: Identity) -> Self {
        Self {
            target,
            tags: Vec::new(),
            data: String::new(),
        }
    }

    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(Tag::new(name, value));
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = data.into();
        self
    }
}

/// Accept numbers that the host sends either as JSON numbers or as strings
fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr + Deserialize<'de>,
    T::Err: std::fmt::Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString<T> {
        Number(T),
        String(String),
    }

    match Option::<NumberOrString<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
