use std::sync::Arc;

use edgegate_core::error::{EdgeError, Result};
use edgegate_core::protocol::{Body, SessionId};

use super::session_registry::{ClientConn, SessionRegistry};
use crate::realtime::types::PreparedMsg;

/// ClientHub: egress engine (send to one / many / all clients, close).
///
/// Sends are lossy: a session whose queue is full or gone is skipped and
/// counted as not delivered.
#[derive(Debug, Default)]
pub struct ClientHub {
    sessions: SessionRegistry,
}

impl ClientHub {
    pub fn new() -> Self {
        Self {
            sessions: SessionRegistry::new(),
        }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn client_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn get(&self, id: SessionId) -> Option<Arc<ClientConn>> {
        self.sessions.get(id)
    }

    pub fn send_to(&self, id: SessionId, msg: PreparedMsg) -> Result<()> {
        let conn = self
            .sessions
            .get(id)
            .ok_or_else(|| EdgeError::Unavailable(format!("session {id} not connected")))?;
        conn.send(msg)
    }

    /// Send `body` to exactly the listed sessions. Returns how many accepted it.
    pub fn multicast(&self, ids: &[SessionId], body: &Body) -> Result<usize> {
        let prepared = PreparedMsg::from_body(body)?;
        let mut delivered = 0;
        for id in ids {
            match self.sessions.get(*id) {
                Some(conn) => match conn.send(prepared.clone()) {
                    Ok(()) => delivered += 1,
                    Err(e) => tracing::debug!(session = id, error = %e, "multicast send skipped"),
                },
                None => tracing::debug!(session = id, "multicast target not connected"),
            }
        }
        Ok(delivered)
    }

    /// Send `body` to every connected session.
    pub fn broadcast(&self, body: &Body) -> Result<usize> {
        let prepared = PreparedMsg::from_body(body)?;
        let mut delivered = 0;
        for conn in self.sessions.all() {
            match conn.send(prepared.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::debug!(session = conn.id(), error = %e, "broadcast send skipped")
                }
            }
        }
        Ok(delivered)
    }

    /// Signal the transport to drop this client.
    pub fn close(&self, id: SessionId) -> Result<()> {
        let conn = self
            .sessions
            .get(id)
            .ok_or_else(|| EdgeError::Unavailable(format!("session {id} not connected")))?;
        conn.close();
        Ok(())
    }

    /// Release the flow lock of `id`. False if unknown or not held.
    pub fn unlock_flow(&self, id: SessionId) -> bool {
        self.sessions
            .get(id)
            .map(|conn| conn.flow().unlock())
            .unwrap_or(false)
    }
}
