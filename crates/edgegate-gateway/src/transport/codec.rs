//! WebSocket frame classification.
//!
//! Text and binary frames both carry one JSON payload; ping/pong/close are
//! surfaced for lifecycle handling.

use axum::extract::ws::Message;
use bytes::Bytes;

#[derive(Debug, PartialEq, Eq)]
pub enum Inbound {
    Payload(Bytes),
    Ping(Vec<u8>),
    Pong,
    Close,
}

pub fn decode(msg: Message) -> Inbound {
    match msg {
        Message::Text(s) => Inbound::Payload(Bytes::from(s)),
        Message::Binary(b) => Inbound::Payload(Bytes::from(b)),
        Message::Ping(v) => Inbound::Ping(v),
        Message::Pong(_) => Inbound::Pong,
        Message::Close(_) => Inbound::Close,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_and_binary_are_payloads() {
        assert_eq!(
            decode(Message::Text("{}".into())),
            Inbound::Payload(Bytes::from_static(b"{}"))
        );
        assert_eq!(
            decode(Message::Binary(b"{}".to_vec())),
            Inbound::Payload(Bytes::from_static(b"{}"))
        );
        assert_eq!(decode(Message::Close(None)), Inbound::Close);
    }
}
