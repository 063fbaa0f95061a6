use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{mpsc, Notify};

use edgegate_core::error::{EdgeError, Result};
use edgegate_core::protocol::SessionId;

use super::flow::FlowLock;
use crate::realtime::types::PreparedMsg;

/// One live client socket, as seen by the router.
///
/// The transport owns the socket; this handle exposes the outbound queue,
/// a close signal, and the flow lock.
#[derive(Debug)]
pub struct ClientConn {
    id: SessionId,
    source: String,
    flow_mode: bool,
    tx: mpsc::Sender<PreparedMsg>,
    flow: FlowLock,
    close: Notify,
}

impl ClientConn {
    pub fn new(
        id: SessionId,
        source: impl Into<String>,
        flow_mode: bool,
        tx: mpsc::Sender<PreparedMsg>,
    ) -> Self {
        Self {
            id,
            source: source.into(),
            flow_mode,
            tx,
            flow: FlowLock::new(),
            close: Notify::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Peer address as reported by the transport.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flow_mode(&self) -> bool {
        self.flow_mode
    }

    pub fn flow(&self) -> &FlowLock {
        &self.flow
    }

    /// Enqueue without waiting; a full queue drops the frame.
    pub fn send(&self, msg: PreparedMsg) -> Result<()> {
        self.tx.try_send(msg).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                EdgeError::Unavailable(format!("session {} outbound queue full", self.id))
            }
            mpsc::error::TrySendError::Closed(_) => {
                EdgeError::Unavailable(format!("session {} closed", self.id))
            }
        })
    }

    /// Ask the transport to drop the socket.
    pub fn close(&self) {
        // notify_one keeps a permit, so a close issued before the transport
        // starts waiting is not lost.
        self.close.notify_one();
    }

    /// Resolves once `close` has been called.
    pub async fn closed(&self) {
        self.close.notified().await
    }
}

/// Session registry: `session_id -> ClientConn`.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, Arc<ClientConn>>,
    seq: AtomicU64,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            seq: AtomicU64::new(1),
        }
    }

    /// Allocate a fresh session id (never 0).
    pub fn next_id(&self) -> SessionId {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    pub fn insert(&self, conn: Arc<ClientConn>) {
        self.sessions.insert(conn.id(), conn);
    }

    pub fn remove(&self, id: SessionId) -> Option<Arc<ClientConn>> {
        self.sessions.remove(&id).map(|(_, conn)| conn)
    }

    pub fn get(&self, id: SessionId) -> Option<Arc<ClientConn>> {
        self.sessions.get(&id).map(|r| Arc::clone(r.value()))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Point-in-time copy; shard locks are not held while callers send.
    pub fn all(&self) -> Vec<Arc<ClientConn>> {
        self.sessions.iter().map(|r| Arc::clone(r.value())).collect()
    }
}
