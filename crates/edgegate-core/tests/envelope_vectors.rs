//! Envelope vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use edgegate_core::protocol::codec::{decode_payload, envelope_from_body};
use edgegate_core::protocol::Envelope;
use edgegate_core::Result;

mod vector_loader;
use vector_loader::load;

fn decode(frame: &str) -> Result<Envelope> {
    let body = decode_payload(frame.as_bytes())?;
    envelope_from_body(body)
}

#[test]
fn envelope_vectors() {
    let files = [
        "flow_return.json",
        "deliver_multicast.json",
        "heart_c2s.json",
        "flow_ack_deliver.json",
        "not_a_map.json",
        "truncated_json.json",
        "unknown_type.json",
    ];

    for f in files {
        let v = load(f);
        let res = decode(&v.frame);

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.code().as_str(), err.code, "vector={}", v.description);
            continue;
        }

        let env = res.expect("expected ok envelope");
        let ex = v.expect.expect("missing expect block");

        let name = &v.description;
        assert_eq!(env.scheme.to_string(), ex["scheme"].as_str().unwrap(), "vector={name}");
        assert_eq!(env.msg_type.code(), ex["type"].as_i64().unwrap(), "vector={name}");
        assert_eq!(env.error_code, ex["errorcode"].as_i64().unwrap(), "vector={name}");

        let tags: Vec<&str> = env.tags.iter().map(|t| t.as_str()).collect();
        let ex_tags: Vec<&str> = ex["tags"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t.as_str().unwrap())
            .collect();
        assert_eq!(tags, ex_tags, "vector={}", v.description);

        if ex["sessionid"].is_null() {
            assert!(env.session_ids.is_none(), "vector={}", v.description);
        } else {
            let ids: Vec<u64> = ex["sessionid"]
                .as_array()
                .unwrap()
                .iter()
                .map(|i| i.as_u64().unwrap())
                .collect();
            assert_eq!(env.session_ids, Some(ids), "vector={}", v.description);
        }

        let mut keys: Vec<String> =
            env.body.map(|b| b.keys().cloned().collect()).unwrap_or_default();
        keys.sort();
        let mut ex_keys: Vec<String> = ex["body_keys"]
            .as_array()
            .unwrap()
            .iter()
            .map(|k| k.as_str().unwrap().to_string())
            .collect();
        ex_keys.sort();
        assert_eq!(keys, ex_keys, "vector={}", v.description);
    }
}
