use async_trait::async_trait;
use serde_json::Value;

use edgegate_core::error::Result;
use edgegate_core::protocol::{keys, Body, BodyReader, Envelope, MessageType, SessionId};

use crate::dispatch::{ControlHandler, GatewayCtx};
use crate::registry::WorkerInfo;

/// Registration session and advertised state carried by membership bodies.
/// `None` when the session id is missing or zero.
fn parse_worker(body: &Body) -> Option<(SessionId, WorkerInfo)> {
    let r = BodyReader::new(body);
    let session = r.u64_of(keys::SESSION_ID, 0);
    if session == 0 {
        return None;
    }
    let info = WorkerInfo {
        process_id: r.i64_of(keys::ID, 0),
        host: r.str_of(keys::HOST, ""),
        free_capacity: r.i64_of(keys::VALUE, 0),
        local_socket_address: r.str_of(keys::UNIX_ADDR, ""),
    };
    Some((session, info))
}

/// Join (`SlaveCome`) and periodic capacity update (`SlaveChange`) share the
/// same body shape and both upsert.
pub struct WorkerUpsertHandler {
    msg_type: MessageType,
}

impl WorkerUpsertHandler {
    pub fn new(msg_type: MessageType) -> Self {
        Self { msg_type }
    }
}

#[async_trait]
impl ControlHandler for WorkerUpsertHandler {
    fn msg_type(&self) -> MessageType {
        self.msg_type
    }

    async fn handle(&self, ctx: &GatewayCtx, env: Envelope) -> Result<()> {
        let Some(body) = env.body else {
            return Ok(());
        };
        let Some((session, info)) = parse_worker(&body) else {
            return Ok(());
        };

        if self.msg_type == MessageType::SlaveCome {
            tracing::info!(
                worker = session,
                host = %info.host,
                pid = info.process_id,
                capacity = info.free_capacity,
                "worker joined"
            );
        } else {
            tracing::trace!(worker = session, capacity = info.free_capacity, "worker changed");
        }
        ctx.registry().upsert(session, info);
        Ok(())
    }
}

pub struct SlaveByeHandler;

#[async_trait]
impl ControlHandler for SlaveByeHandler {
    fn msg_type(&self) -> MessageType {
        MessageType::SlaveBye
    }

    async fn handle(&self, ctx: &GatewayCtx, env: Envelope) -> Result<()> {
        let Some(body) = env.body else {
            return Ok(());
        };
        let session = BodyReader::new(&body).u64_of(keys::SESSION_ID, 0);
        if session > 0 {
            ctx.registry().remove(session);
            tracing::info!(worker = session, "worker left");
        }
        Ok(())
    }
}

/// Full worker list from the master, sent once after the gateway says hello.
/// Also tells the gateway which hostname it runs on.
pub struct SlavesSnapshotHandler;

#[async_trait]
impl ControlHandler for SlavesSnapshotHandler {
    fn msg_type(&self) -> MessageType {
        MessageType::Slaves
    }

    async fn handle(&self, ctx: &GatewayCtx, env: Envelope) -> Result<()> {
        let Some(body) = env.body else {
            return Ok(());
        };
        let r = BodyReader::new(&body);

        if let Some(host) = r.get(keys::LOCAL_HOST).and_then(Value::as_str) {
            ctx.local_host().set(host);
        }

        let mut loaded = 0usize;
        for item in r.list_of(keys::VALUE).into_iter().flatten() {
            let Some((session, info)) = item.as_object().and_then(parse_worker) else {
                continue;
            };
            ctx.registry().upsert(session, info);
            loaded += 1;
        }

        tracing::info!(
            workers = loaded,
            local_host = %ctx.local_host().get(),
            "worker snapshot received"
        );
        Ok(())
    }
}
