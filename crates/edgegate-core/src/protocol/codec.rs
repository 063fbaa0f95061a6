//! JSON payload codec.
//!
//! Every frame on every transport (client socket, control link, local
//! datagram) carries exactly one JSON object. Framing is the transport's job.

use bytes::Bytes;
use serde_json::Value;

use crate::error::{EdgeError, Result};

use super::envelope::{Body, Envelope, Tag};
use super::keys;

/// Decode one frame into a message map.
pub fn decode_payload(raw: &[u8]) -> Result<Body> {
    let value: Value = serde_json::from_slice(raw)
        .map_err(|e| EdgeError::BadRequest(format!("invalid payload json: {e}")))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(EdgeError::NotAMessageMap),
    }
}

pub fn encode_body(body: &Body) -> Result<Bytes> {
    serde_json::to_vec(body)
        .map(Bytes::from)
        .map_err(|e| EdgeError::Internal(format!("json encode failed: {e}")))
}

/// Envelope -> message map (so callers can stamp extra keys before sending).
pub fn envelope_to_body(env: &Envelope) -> Result<Body> {
    match serde_json::to_value(env) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(EdgeError::Internal("envelope did not encode to a map".into())),
        Err(e) => Err(EdgeError::Internal(format!("envelope encode failed: {e}"))),
    }
}

pub fn envelope_from_body(body: Body) -> Result<Envelope> {
    serde_json::from_value(Value::Object(body))
        .map_err(|e| EdgeError::BadRequest(format!("invalid envelope: {e}")))
}

pub fn encode_envelope(env: &Envelope) -> Result<Bytes> {
    serde_json::to_vec(env)
        .map(Bytes::from)
        .map_err(|e| EdgeError::Internal(format!("envelope encode failed: {e}")))
}

/// Cheap tag check on an undecoded message map (no envelope parse).
pub fn payload_has_tag(body: &Body, tag: Tag) -> bool {
    body.get(keys::TAG)
        .and_then(Value::as_array)
        .map(|tags| tags.iter().any(|t| t.as_str() == Some(tag.as_str())))
        .unwrap_or(false)
}
