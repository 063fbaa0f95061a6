#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use serde_json::json;

use edgegate_core::protocol::codec::{
    decode_payload, encode_envelope, envelope_from_body, envelope_to_body, payload_has_tag,
};
use edgegate_core::protocol::{keys, Body, BodyReader, Envelope, MessageType, Tag};

fn body(v: serde_json::Value) -> Body {
    v.as_object().unwrap().clone()
}

#[test]
fn tag_check_reads_raw_payload() {
    let adapter = body(json!({"tag": ["client", "adapter"], "type": 0}));
    let data = body(json!({"tag": ["slave"], "cmd": "move"}));
    let untagged = body(json!({"cmd": "move"}));
    let wrong_shape = body(json!({"tag": "adapter"}));

    assert!(payload_has_tag(&adapter, Tag::Adapter));
    assert!(!payload_has_tag(&data, Tag::Adapter));
    assert!(!payload_has_tag(&untagged, Tag::Adapter));
    assert!(!payload_has_tag(&wrong_shape, Tag::Adapter));
}

#[test]
fn envelope_map_uses_wire_keys() {
    let env = Envelope::s2s(MessageType::Deliver)
        .with_tag(Tag::Slave)
        .with_body(body(json!({"x": 1})));
    let map = envelope_to_body(&env).unwrap();

    assert_eq!(map["scheme"], json!("s2s"));
    assert_eq!(map["tag"], json!(["slave"]));
    assert_eq!(map["type"], json!(1));
    assert_eq!(map["errorcode"], json!(0));
    assert!(!map.contains_key("sessionid"));

    let back = envelope_from_body(map).unwrap();
    assert_eq!(back, env);
}

#[test]
fn encoded_envelope_decodes_as_payload() {
    let env = Envelope::s2s(MessageType::FlowReturn)
        .with_tag(Tag::Adapter)
        .with_sessions(vec![5]);
    let raw = encode_envelope(&env).unwrap();
    let map = decode_payload(&raw).unwrap();
    assert!(payload_has_tag(&map, Tag::Adapter));
    assert_eq!(map["sessionid"], json!([5]));
}

#[test]
fn body_reader_is_lenient() {
    let b = body(json!({
        "sessionid": 17.0,
        "value": -3,
        "host": "10.0.0.2",
        "id": 4000000000u64,
        "list": [1, 0, -2, "x", 9],
    }));
    let r = BodyReader::new(&b);

    assert_eq!(r.u64_of(keys::SESSION_ID, 0), 17);
    assert_eq!(r.i64_of(keys::VALUE, 0), -3);
    assert_eq!(r.u64_of(keys::VALUE, 99), 99);
    assert_eq!(r.str_of(keys::HOST, ""), "10.0.0.2");
    assert_eq!(r.str_of(keys::UNIX_ADDR, ""), "");
    assert_eq!(r.i64_of(keys::ID, 0), 4_000_000_000);
    assert_eq!(r.session_ids("list"), Some(vec![1, 9]));
    assert_eq!(r.session_ids("missing"), None);
}

#[test]
fn unknown_tags_are_dropped_not_fatal() {
    let env = envelope_from_body(body(json!({
        "tag": ["adapter", "gate", 7],
        "type": 0
    })))
    .unwrap();
    assert_eq!(env.tags, vec![Tag::Adapter]);
    assert!(env.has_tag(Tag::Adapter));
}
