use axum::extract::ws::Message;
use bytes::Bytes;

use edgegate_core::error::Result;
use edgegate_core::protocol::codec::{encode_body, encode_envelope};
use edgegate_core::protocol::{Body, Envelope};

/// Encoded frame cached for fan-out (serialize once, send N times).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedMsg(Bytes);

impl PreparedMsg {
    pub fn from_body(body: &Body) -> Result<Self> {
        encode_body(body).map(PreparedMsg)
    }

    pub fn from_envelope(env: &Envelope) -> Result<Self> {
        encode_envelope(env).map(PreparedMsg)
    }

    pub fn bytes(&self) -> Bytes {
        self.0.clone()
    }

    /// Convert to axum::ws::Message for transport.
    /// Payloads are JSON, so they normally go out as Text.
    pub fn to_ws_message(&self) -> Message {
        match std::str::from_utf8(&self.0) {
            Ok(s) => Message::Text(s.to_owned()),
            Err(_) => Message::Binary(self.0.to_vec()),
        }
    }
}
