//! Transport-independent part of a client connection.

use std::sync::Arc;

use tokio::sync::mpsc;

use edgegate_core::protocol::codec::decode_payload;
use edgegate_core::protocol::SessionId;

use crate::app_state::AppState;
use crate::realtime::{ClientConn, PreparedMsg};
use crate::routing::{ClientPipeline, MessageRouter};

/// A registered client. Dropping it unregisters the session, notifies the
/// workers, and stops the request pump.
pub struct ClientSession {
    conn: Arc<ClientConn>,
    pipeline: ClientPipeline,
    router: Arc<MessageRouter>,
}

impl ClientSession {
    /// Register a new connection from `source`. Returns the session and the
    /// receiving end of its outbound queue.
    pub fn open(app: &AppState, source: String) -> (Self, mpsc::Receiver<PreparedMsg>) {
        let cfg = app.cfg();
        let router = Arc::clone(app.router());

        let (tx, rx) = mpsc::channel(cfg.limits.outbound_queue);
        let id = router.ctx().hub().sessions().next_id();
        let conn = Arc::new(ClientConn::new(id, source, cfg.flow.enabled, tx));

        router.client_connected(Arc::clone(&conn));
        let pipeline = ClientPipeline::start(
            Arc::clone(&router),
            Arc::clone(&conn),
            cfg.flow.queue_limit,
        );

        (Self { conn, pipeline, router }, rx)
    }

    pub fn id(&self) -> SessionId {
        self.conn.id()
    }

    pub fn conn(&self) -> Arc<ClientConn> {
        Arc::clone(&self.conn)
    }

    /// Decode one inbound frame and submit it. Errors are logged and counted
    /// here; the connection stays up.
    pub async fn handle_frame(&self, raw: &[u8]) {
        let payload = match decode_payload(raw) {
            Ok(p) => p,
            Err(e) => {
                self.router.ctx().metrics().decode_errors.inc(&[("source", "client")]);
                tracing::debug!(session = self.id(), error = %e, "client frame rejected");
                return;
            }
        };
        if let Err(e) = self.pipeline.submit(payload).await {
            tracing::debug!(session = self.id(), error = %e, "client payload not accepted");
        }
    }
}

impl Drop for ClientSession {
    fn drop(&mut self) {
        self.router.client_disconnected(self.conn.id());
    }
}
