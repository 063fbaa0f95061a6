//! In-memory uplinks and fixtures shared by the gateway integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tokio::sync::mpsc;

use edgegate_core::error::{EdgeError, Result};
use edgegate_core::protocol::{Body, Envelope};
use edgegate_gateway::dispatch::{Dispatcher, GatewayCtx};
use edgegate_gateway::handlers;
use edgegate_gateway::obs::GatewayMetrics;
use edgegate_gateway::realtime::{ClientConn, ClientHub, PreparedMsg};
use edgegate_gateway::registry::{LocalHost, WorkerInfo, WorkerRegistry};
use edgegate_gateway::routing::MessageRouter;
use edgegate_gateway::uplink::{ControlLink, LocalLink};

#[derive(Default)]
pub struct RecordingControl {
    sent: Mutex<Vec<Envelope>>,
    fail: AtomicBool,
}

impl RecordingControl {
    pub fn sent(&self) -> Vec<Envelope> {
        self.sent.lock().unwrap().clone()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl ControlLink for RecordingControl {
    fn send(&self, env: &Envelope) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(EdgeError::Unavailable("control link closed".into()));
        }
        self.sent.lock().unwrap().push(env.clone());
        Ok(())
    }
}

pub struct RecordingLocal {
    reply_addr: String,
    sent: Mutex<Vec<(String, Body)>>,
}

impl RecordingLocal {
    pub fn new(reply_addr: &str) -> Self {
        Self {
            reply_addr: reply_addr.to_string(),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<(String, Body)> {
        self.sent.lock().unwrap().clone()
    }
}

impl LocalLink for RecordingLocal {
    fn reply_addr(&self) -> &str {
        &self.reply_addr
    }

    fn send_to(&self, addr: &str, payload: &Body) -> Result<()> {
        self.sent.lock().unwrap().push((addr.to_string(), payload.clone()));
        Ok(())
    }
}

pub fn new_ctx(local_host: &str) -> GatewayCtx {
    GatewayCtx::new(
        Arc::new(WorkerRegistry::new()),
        Arc::new(ClientHub::new()),
        Arc::new(LocalHost::new(local_host)),
        Arc::new(GatewayMetrics::default()),
    )
}

pub fn builtin_dispatcher() -> Arc<Dispatcher> {
    let d = Dispatcher::new();
    handlers::register_builtin(&d);
    Arc::new(d)
}

pub struct Harness {
    pub router: Arc<MessageRouter>,
    pub control: Arc<RecordingControl>,
    pub local: Arc<RecordingLocal>,
}

impl Harness {
    pub fn new(local_host: &str) -> Self {
        let control = Arc::new(RecordingControl::default());
        let local = Arc::new(RecordingLocal::new("/tmp/adapter_test.sock"));
        let router = Arc::new(MessageRouter::new(
            new_ctx(local_host),
            builtin_dispatcher(),
            control.clone(),
            Some(local.clone() as Arc<dyn LocalLink>),
        ));
        Self { router, control, local }
    }

    pub fn without_local(local_host: &str) -> Self {
        let control = Arc::new(RecordingControl::default());
        let local = Arc::new(RecordingLocal::new(""));
        let router = Arc::new(MessageRouter::new(
            new_ctx(local_host),
            builtin_dispatcher(),
            control.clone(),
            None,
        ));
        Self { router, control, local }
    }

    pub fn ctx(&self) -> &GatewayCtx {
        self.router.ctx()
    }
}

/// Register a client directly in the hub (no lifecycle notifications).
pub fn attach_client(
    ctx: &GatewayCtx,
    flow_mode: bool,
) -> (Arc<ClientConn>, mpsc::Receiver<PreparedMsg>) {
    let (tx, rx) = mpsc::channel(16);
    let id = ctx.hub().sessions().next_id();
    let conn = Arc::new(ClientConn::new(id, format!("10.0.0.{id}:5000"), flow_mode, tx));
    ctx.hub().sessions().insert(conn.clone());
    (conn, rx)
}

pub fn worker(host: &str, capacity: i64, unix_addr: &str) -> WorkerInfo {
    WorkerInfo {
        process_id: 4242,
        host: host.to_string(),
        free_capacity: capacity,
        local_socket_address: unix_addr.to_string(),
    }
}

pub fn body(v: Value) -> Body {
    match v {
        Value::Object(m) => m,
        other => panic!("not a map: {other}"),
    }
}

pub fn received(rx: &mut mpsc::Receiver<PreparedMsg>) -> Vec<Value> {
    let mut out = Vec::new();
    while let Ok(m) = rx.try_recv() {
        out.push(serde_json::from_slice(&m.bytes()).unwrap());
    }
    out
}

pub fn data_request(text: &str) -> Body {
    body(json!({ "tag": ["client"], "text": text }))
}
