use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use dashmap::DashMap;

use edgegate_core::error::{EdgeError, Result};
use edgegate_core::protocol::{Envelope, MessageType, Scheme};

use super::context::GatewayCtx;

/// Handler for one adapter-tagged opcode.
#[async_trait]
pub trait ControlHandler: Send + Sync {
    fn msg_type(&self) -> MessageType;
    async fn handle(&self, ctx: &GatewayCtx, env: Envelope) -> Result<()>;
}

/// Handler table keyed by `(scheme, opcode)`, built once at startup.
#[derive(Default)]
pub struct Dispatcher {
    handlers: DashMap<(Scheme, MessageType), Arc<dyn ControlHandler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }

    pub fn register(&self, scheme: Scheme, handler: Arc<dyn ControlHandler>) {
        self.handlers.insert((scheme, handler.msg_type()), handler);
    }

    pub fn registered(&self) -> Vec<(Scheme, MessageType)> {
        self.handlers.iter().map(|e| *e.key()).collect()
    }

    pub async fn dispatch(&self, ctx: &GatewayCtx, env: Envelope) -> Result<()> {
        let (scheme, msg_type) = (env.scheme, env.msg_type);
        let handler = self
            .handlers
            .get(&(scheme, msg_type))
            .ok_or(EdgeError::UnknownHandler { scheme, msg_type })?
            .value()
            .clone();

        let started = Instant::now();
        let res = handler.handle(ctx, env).await;
        ctx.metrics()
            .dispatch_duration
            .observe(&[("type", msg_type.name())], started.elapsed());

        if let Err(e) = &res {
            ctx.metrics()
                .handler_errors
                .inc(&[("type", msg_type.name()), ("code", e.code().as_str())]);
        }
        res
    }
}
