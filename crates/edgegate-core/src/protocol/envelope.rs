//! Envelope model: the routed message unit exchanged between clients, the
//! gateway, workers, and the master.
//!
//! Wire form is a JSON object:
//! `{"scheme":"s2s","tag":["slave"],"type":1,"sessionid":[7],"errorcode":0,"body":{..}}`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{EdgeError, Result};

/// Opaque transport-session identifier. `0` is never issued.
pub type SessionId = u64;

/// Per-opcode payload.
pub type Body = Map<String, Value>;

/// Error code asking the worker to acknowledge with a flow return.
pub const FLOW_ACK_EXPECTED: i64 = -1;

/// Where a message originated: a client socket or the internal control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Scheme {
    #[serde(rename = "c2s")]
    ClientToServer,
    #[default]
    #[serde(rename = "s2s")]
    ServerToServer,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::ClientToServer => f.write_str("c2s"),
            Scheme::ServerToServer => f.write_str("s2s"),
        }
    }
}

/// Intended handler category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Adapter,
    Master,
    Slave,
    Client,
}

impl Tag {
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Adapter => "adapter",
            Tag::Master => "master",
            Tag::Slave => "slave",
            Tag::Client => "client",
        }
    }
}

/// Closed opcode catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum MessageType {
    Heart,
    Deliver,
    KillClient,
    Slaves,
    SlaveCome,
    SlaveBye,
    SlaveChange,
    FlowReturn,
    AdapterHello,
    AdapterChange,
    ClientEnter,
    ClientLeave,
}

impl MessageType {
    pub fn code(self) -> i64 {
        match self {
            MessageType::Heart => 0,
            MessageType::Deliver => 1,
            MessageType::KillClient => 2,
            MessageType::Slaves => 10,
            MessageType::SlaveCome => 11,
            MessageType::SlaveBye => 12,
            MessageType::SlaveChange => 13,
            MessageType::FlowReturn => 20,
            MessageType::AdapterHello => 30,
            MessageType::AdapterChange => 31,
            MessageType::ClientEnter => 40,
            MessageType::ClientLeave => 41,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MessageType::Heart => "heart",
            MessageType::Deliver => "deliver",
            MessageType::KillClient => "kill_client",
            MessageType::Slaves => "slaves",
            MessageType::SlaveCome => "slave_come",
            MessageType::SlaveBye => "slave_bye",
            MessageType::SlaveChange => "slave_change",
            MessageType::FlowReturn => "flow_return",
            MessageType::AdapterHello => "adapter_hello",
            MessageType::AdapterChange => "adapter_change",
            MessageType::ClientEnter => "client_enter",
            MessageType::ClientLeave => "client_leave",
        }
    }
}

impl TryFrom<i64> for MessageType {
    type Error = EdgeError;

    fn try_from(code: i64) -> Result<Self> {
        let t = match code {
            0 => MessageType::Heart,
            1 => MessageType::Deliver,
            2 => MessageType::KillClient,
            10 => MessageType::Slaves,
            11 => MessageType::SlaveCome,
            12 => MessageType::SlaveBye,
            13 => MessageType::SlaveChange,
            20 => MessageType::FlowReturn,
            30 => MessageType::AdapterHello,
            31 => MessageType::AdapterChange,
            40 => MessageType::ClientEnter,
            41 => MessageType::ClientLeave,
            other => return Err(EdgeError::BadRequest(format!("unknown message type: {other}"))),
        };
        Ok(t)
    }
}

impl From<MessageType> for i64 {
    fn from(t: MessageType) -> Self {
        t.code()
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn known_tags<'de, D>(d: D) -> std::result::Result<Vec<Tag>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Value>::deserialize(d)?;
    Ok(raw
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect())
}

/// Routed message. Constructed per event and consumed by its handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub scheme: Scheme,
    /// Unknown tag names are dropped on decode.
    #[serde(rename = "tag", default, deserialize_with = "known_tags")]
    pub tags: Vec<Tag>,
    #[serde(rename = "type")]
    pub msg_type: MessageType,
    /// Explicit targets; absent means broadcast for deliver.
    #[serde(rename = "sessionid", default, skip_serializing_if = "Option::is_none")]
    pub session_ids: Option<Vec<SessionId>>,
    #[serde(rename = "errorcode", default)]
    pub error_code: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
}

impl Envelope {
    pub fn new(scheme: Scheme, msg_type: MessageType) -> Self {
        Self {
            scheme,
            tags: Vec::new(),
            msg_type,
            session_ids: None,
            error_code: 0,
            body: None,
        }
    }

    /// Server-to-server envelope (everything the gateway originates).
    pub fn s2s(msg_type: MessageType) -> Self {
        Self::new(Scheme::ServerToServer, msg_type)
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn with_sessions(mut self, ids: Vec<SessionId>) -> Self {
        self.session_ids = Some(ids);
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    /// First explicit target, if any.
    pub fn first_session(&self) -> Option<SessionId> {
        self.session_ids.as_ref().and_then(|ids| ids.first().copied())
    }
}
