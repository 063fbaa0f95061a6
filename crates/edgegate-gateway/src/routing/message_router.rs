use std::sync::Arc;

use serde_json::Value;

use edgegate_core::error::Result;
use edgegate_core::protocol::codec::{envelope_from_body, envelope_to_body, payload_has_tag};
use edgegate_core::protocol::{
    keys, Body, Envelope, MessageType, Scheme, SessionId, Tag, FLOW_ACK_EXPECTED,
};

use crate::dispatch::{Dispatcher, GatewayCtx};
use crate::realtime::ClientConn;
use crate::registry::WorkerInfo;
use crate::uplink::{ControlLink, LocalLink};

/// Central router shared by every ingress.
///
/// Client payloads arrive through a [`ClientPipeline`](super::ClientPipeline);
/// control-link and local-channel payloads through [`Self::on_server_payload`].
pub struct MessageRouter {
    ctx: GatewayCtx,
    dispatcher: Arc<Dispatcher>,
    control: Arc<dyn ControlLink>,
    local: Option<Arc<dyn LocalLink>>,
}

impl MessageRouter {
    pub fn new(
        ctx: GatewayCtx,
        dispatcher: Arc<Dispatcher>,
        control: Arc<dyn ControlLink>,
        local: Option<Arc<dyn LocalLink>>,
    ) -> Self {
        Self {
            ctx,
            dispatcher,
            control,
            local,
        }
    }

    pub fn ctx(&self) -> &GatewayCtx {
        &self.ctx
    }

    pub fn control(&self) -> &dyn ControlLink {
        self.control.as_ref()
    }

    /// Our local reply socket, when the local channel is enabled.
    pub fn reply_addr(&self) -> Option<&str> {
        self.local.as_deref().map(|l| l.reply_addr())
    }

    // --------------------
    // Client lifecycle
    // --------------------

    pub fn client_connected(&self, conn: Arc<ClientConn>) {
        let id = conn.id();
        self.ctx.hub().sessions().insert(Arc::clone(&conn));
        self.ctx.metrics().client_sessions.inc(&[]);
        tracing::info!(
            session = id,
            peer = %conn.source(),
            flow = conn.flow_mode(),
            "client connected"
        );
        self.notify_client(MessageType::ClientEnter, &conn);
    }

    pub fn client_disconnected(&self, id: SessionId) {
        let Some(conn) = self.ctx.hub().sessions().remove(id) else {
            return;
        };
        self.ctx.metrics().client_sessions.dec(&[]);
        tracing::info!(session = id, peer = %conn.source(), "client disconnected");
        self.notify_client(MessageType::ClientLeave, &conn);
    }

    /// Tell the workers about a client arriving or leaving. The event rides
    /// inside a Deliver so it takes the same path as a request.
    fn notify_client(&self, msg_type: MessageType, conn: &ClientConn) {
        let mut host = Body::new();
        host.insert(keys::HOST.into(), Value::String(conn.source().to_string()));
        let inner = Envelope::s2s(msg_type)
            .with_tag(Tag::Slave)
            .with_sessions(vec![conn.id()])
            .with_body(host);

        match envelope_to_body(&inner) {
            Ok(body) => {
                self.forward(deliver_to_worker(body));
            }
            Err(e) => tracing::warn!(
                session = conn.id(),
                msg_type = %msg_type,
                error = %e,
                "client notify not encoded"
            ),
        }
    }

    // --------------------
    // Ingress
    // --------------------

    /// Control-plane payload from any ingress. The scheme comes from where the
    /// payload arrived, never from the payload itself.
    pub async fn dispatch_payload(&self, scheme: Scheme, payload: Body) -> Result<()> {
        let mut env = envelope_from_body(payload)?;
        env.scheme = scheme;
        let msg_type = env.msg_type;
        let res = self.dispatcher.dispatch(&self.ctx, env).await;
        if let Err(e) = &res {
            tracing::warn!(
                scheme = %scheme,
                msg_type = %msg_type,
                code = e.code().as_str(),
                error = %e,
                "control message failed"
            );
        }
        res
    }

    /// Payload from the control link or the local channel.
    pub async fn on_server_payload(&self, payload: Body) {
        if payload_has_tag(&payload, Tag::Adapter) {
            // Already logged and counted.
            let _ = self.dispatch_payload(Scheme::ServerToServer, payload).await;
        } else {
            tracing::debug!("server payload without adapter tag ignored");
        }
    }

    /// Data-plane request from `conn`. The payload is already stamped with the
    /// originating session.
    ///
    /// In flow mode this waits for the connection's flow lock and keeps it
    /// held once the request is out; it is released by a flow return or a
    /// heartbeat. A request that never left releases it at once.
    pub async fn forward_request(&self, conn: &ClientConn, payload: Body) {
        let mut env = deliver_to_worker(payload);

        let flow = conn.flow_mode();
        if flow {
            conn.flow().lock().await;
            env.error_code = FLOW_ACK_EXPECTED;
            self.ctx.metrics().flow.inc(&[("event", "lock")]);
        }

        let sent = self.forward(env);

        if flow && !sent && conn.flow().unlock() {
            self.ctx.metrics().flow.inc(&[("event", "release")]);
            tracing::debug!(session = conn.id(), "flow lock released, request not sent");
        }
    }

    /// Hand `env` to the best worker. Returns whether an uplink accepted it.
    ///
    /// A colocated worker is reached over the local channel with our reply
    /// socket stamped under `unixaddr`; any other worker through the control
    /// link with `sessionid = [worker]`.
    pub fn forward(&self, mut env: Envelope) -> bool {
        let metrics = self.ctx.metrics();

        let Some((worker, info)) = self.ctx.registry().select_best() else {
            metrics.dropped.inc(&[("reason", "no_worker")]);
            tracing::debug!(msg_type = %env.msg_type, "no worker available, message dropped");
            return false;
        };

        let local_host = self.ctx.local_host().get();
        let res = match self.local.as_deref() {
            Some(local) if info.is_local_to(&local_host) => {
                send_local(local, &info, &env).map(|()| "local")
            }
            _ => {
                env.session_ids = Some(vec![worker]);
                self.control.send(&env).map(|()| "remote")
            }
        };

        match res {
            Ok(path) => {
                metrics.forwarded.inc(&[("path", path)]);
                tracing::trace!(worker, path, msg_type = %env.msg_type, "forwarded");
                true
            }
            Err(e) => {
                metrics.dropped.inc(&[("reason", "uplink_error")]);
                tracing::warn!(worker, host = %info.host, error = %e, "forward failed");
                false
            }
        }
    }
}

fn deliver_to_worker(body: Body) -> Envelope {
    Envelope::s2s(MessageType::Deliver)
        .with_tag(Tag::Slave)
        .with_body(body)
}

fn send_local(local: &dyn LocalLink, worker: &WorkerInfo, env: &Envelope) -> Result<()> {
    let mut body = envelope_to_body(env)?;
    body.insert(
        keys::UNIX_ADDR.into(),
        Value::String(local.reply_addr().to_string()),
    );
    local.send_to(&worker.local_socket_address, &body)
}
