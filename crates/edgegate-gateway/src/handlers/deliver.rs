use async_trait::async_trait;

use edgegate_core::error::Result;
use edgegate_core::protocol::{keys, BodyReader, Envelope, MessageType};

use crate::dispatch::{ControlHandler, GatewayCtx};

/// Worker -> client fan-out.
///
/// An explicit `sessionid` list in the body selects the targets (the key is
/// stripped before sending); otherwise every connected client receives it.
pub struct DeliverHandler;

#[async_trait]
impl ControlHandler for DeliverHandler {
    fn msg_type(&self) -> MessageType {
        MessageType::Deliver
    }

    async fn handle(&self, ctx: &GatewayCtx, env: Envelope) -> Result<()> {
        let Some(mut body) = env.body else {
            return Ok(());
        };
        ctx.metrics().deliver.inc(&[("stage", "in")]);

        // A present key means multicast even when nothing in it parses.
        let delivered = if body.contains_key(keys::SESSION_ID) {
            let ids = BodyReader::new(&body)
                .session_ids(keys::SESSION_ID)
                .unwrap_or_default();
            body.remove(keys::SESSION_ID);
            ctx.hub().multicast(&ids, &body)?
        } else {
            ctx.hub().broadcast(&body)?
        };

        ctx.metrics().deliver.add(&[("stage", "out")], delivered as u64);
        Ok(())
    }
}
