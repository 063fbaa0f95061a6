use async_trait::async_trait;

use edgegate_core::error::Result;
use edgegate_core::protocol::{Envelope, MessageType};

use crate::dispatch::{ControlHandler, GatewayCtx};
use crate::realtime::PreparedMsg;

/// Client heartbeat: echoed back as-is by the gateway and used as an
/// implicit flow unlock. Never reaches a worker.
pub struct HeartHandler;

#[async_trait]
impl ControlHandler for HeartHandler {
    fn msg_type(&self) -> MessageType {
        MessageType::Heart
    }

    async fn handle(&self, ctx: &GatewayCtx, env: Envelope) -> Result<()> {
        let Some(session) = env.first_session() else {
            return Ok(());
        };

        let echoed = match env.body {
            Some(_) => {
                PreparedMsg::from_envelope(&env).and_then(|msg| ctx.hub().send_to(session, msg))
            }
            None => Ok(()),
        };

        if ctx.hub().unlock_flow(session) {
            ctx.metrics().flow.inc(&[("event", "release")]);
        }
        echoed
    }
}
