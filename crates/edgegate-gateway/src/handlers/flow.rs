use async_trait::async_trait;

use edgegate_core::error::{EdgeError, Result};
use edgegate_core::protocol::{keys, Envelope, MessageType};

use crate::dispatch::{ControlHandler, GatewayCtx};

/// Worker acknowledgement: release the flow lock of the named client.
pub struct FlowReturnHandler;

#[async_trait]
impl ControlHandler for FlowReturnHandler {
    fn msg_type(&self) -> MessageType {
        MessageType::FlowReturn
    }

    async fn handle(&self, ctx: &GatewayCtx, env: Envelope) -> Result<()> {
        let session = env
            .first_session()
            .ok_or(EdgeError::MissingKey(keys::SESSION_ID))?;

        if ctx.hub().unlock_flow(session) {
            ctx.metrics().flow.inc(&[("event", "release")]);
        } else {
            tracing::debug!(session, "flow return for unknown or unlocked session");
        }
        Ok(())
    }
}
