#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod support;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use edgegate_core::protocol::{MessageType, Tag};
use edgegate_gateway::announce::{change_envelope, hello_envelope, Announcer};
use support::{attach_client, Harness};

#[test]
fn hello_carries_pid_clients_and_reply_socket() {
    let env = hello_envelope(321, 4, Some("/tmp/adapter_321.sock"));
    assert_eq!(env.msg_type, MessageType::AdapterHello);
    assert!(env.has_tag(Tag::Master));
    assert_eq!(
        serde_json::Value::Object(env.body.unwrap()),
        json!({ "id": 321, "value": 4, "unixaddr": "/tmp/adapter_321.sock" })
    );

    let tcp_only = hello_envelope(321, 0, None);
    assert!(tcp_only.body.unwrap().get("unixaddr").is_none());
}

#[test]
fn change_reports_client_count() {
    let env = change_envelope(12);
    assert_eq!(env.msg_type, MessageType::AdapterChange);
    assert!(env.has_tag(Tag::Master));
    assert_eq!(env.body.unwrap()["value"], json!(12));
}

#[tokio::test]
async fn say_hello_goes_over_control_link() {
    let h = Harness::new("edge-1");
    let _a = attach_client(h.ctx(), false);
    let _b = attach_client(h.ctx(), false);

    Announcer::new(h.router.clone(), 55).say_hello().unwrap();

    let sent = h.control.sent();
    assert_eq!(sent.len(), 1);
    let b = sent[0].body.clone().unwrap();
    assert_eq!(b["id"], json!(55));
    assert_eq!(b["value"], json!(2));
    assert_eq!(b["unixaddr"], json!("/tmp/adapter_test.sock"));
}

#[tokio::test]
async fn report_failure_is_returned_not_fatal() {
    let h = Harness::new("edge-1");
    h.control.set_failing(true);
    let announcer = Announcer::new(h.router.clone(), 1);
    assert!(announcer.report_state().is_err());

    h.control.set_failing(false);
    announcer.report_state().unwrap();
    assert_eq!(h.control.sent()[0].msg_type, MessageType::AdapterChange);
}

#[tokio::test]
async fn reporter_keeps_running() {
    let h = Harness::new("edge-1");
    let announcer = Arc::new(Announcer::new(h.router.clone(), 1));
    let task = announcer.spawn_reporter(Duration::from_millis(20));

    tokio::time::sleep(Duration::from_millis(110)).await;
    task.abort();

    let reports = h
        .control
        .sent()
        .iter()
        .filter(|e| e.msg_type == MessageType::AdapterChange)
        .count();
    assert!(reports >= 2, "only {reports} reports");
}
