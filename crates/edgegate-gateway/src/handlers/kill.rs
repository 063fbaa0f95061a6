use async_trait::async_trait;

use edgegate_core::error::Result;
use edgegate_core::protocol::{keys, BodyReader, Envelope, MessageType};

use crate::dispatch::{ControlHandler, GatewayCtx};

/// Force-close the client sessions listed in `body.sessionid`.
/// Each close is independent; failures are logged, never returned.
pub struct KillClientHandler;

#[async_trait]
impl ControlHandler for KillClientHandler {
    fn msg_type(&self) -> MessageType {
        MessageType::KillClient
    }

    async fn handle(&self, ctx: &GatewayCtx, env: Envelope) -> Result<()> {
        let Some(body) = env.body else {
            return Ok(());
        };
        let Some(ids) = BodyReader::new(&body).session_ids(keys::SESSION_ID) else {
            return Ok(());
        };

        for id in ids {
            match ctx.hub().close(id) {
                Ok(()) => tracing::info!(session = id, "client kicked"),
                Err(e) => tracing::warn!(session = id, error = %e, "kick failed"),
            }
        }
        Ok(())
    }
}
