use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use edgegate_core::error::{EdgeError, Result};
use edgegate_core::protocol::codec::payload_has_tag;
use edgegate_core::protocol::{keys, Body, Scheme, Tag};

use super::MessageRouter;
use crate::realtime::ClientConn;

/// Per-connection request path.
///
/// Control payloads (heartbeats) are dispatched inline so they still get
/// through while a flow lock is held; one that fails releases the lock.
/// Data payloads go through a bounded queue drained by one pump task, which
/// keeps them in order and is the only place that waits on the flow lock.
pub struct ClientPipeline {
    conn: Arc<ClientConn>,
    router: Arc<MessageRouter>,
    requests: mpsc::Sender<Body>,
    pump: JoinHandle<()>,
}

impl ClientPipeline {
    pub fn start(router: Arc<MessageRouter>, conn: Arc<ClientConn>, queue_limit: usize) -> Self {
        let (requests, mut rx) = mpsc::channel::<Body>(queue_limit);

        let pump = {
            let router = Arc::clone(&router);
            let conn = Arc::clone(&conn);
            tokio::spawn(async move {
                while let Some(payload) = rx.recv().await {
                    router.forward_request(&conn, payload).await;
                }
            })
        };

        Self {
            conn,
            router,
            requests,
            pump,
        }
    }

    /// Accept one decoded client payload.
    ///
    /// A full request queue drops the payload with `Unavailable`.
    pub async fn submit(&self, mut payload: Body) -> Result<()> {
        let id = self.conn.id();
        payload.insert(keys::SESSION_ID.into(), Value::from(vec![id]));

        if payload_has_tag(&payload, Tag::Adapter) {
            let res = self
                .router
                .dispatch_payload(Scheme::ClientToServer, payload)
                .await;
            // A control message that went nowhere must not leave the
            // connection waiting for an acknowledgement.
            if res.is_err() && self.conn.flow().unlock() {
                self.router
                    .ctx()
                    .metrics()
                    .flow
                    .inc(&[("event", "release")]);
            }
            return res;
        }

        self.requests.try_send(payload).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                self.router
                    .ctx()
                    .metrics()
                    .dropped
                    .inc(&[("reason", "queue_full")]);
                EdgeError::Unavailable(format!("session {id} request queue full"))
            }
            mpsc::error::TrySendError::Closed(_) => {
                EdgeError::Unavailable(format!("session {id} request pump stopped"))
            }
        })
    }
}

impl Drop for ClientPipeline {
    fn drop(&mut self) {
        self.pump.abort();
    }
}
