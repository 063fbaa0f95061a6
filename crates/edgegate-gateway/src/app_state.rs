//! Shared application state handed to axum handlers and transports.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::obs::GatewayMetrics;
use crate::routing::MessageRouter;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    router: Arc<MessageRouter>,
}

impl AppState {
    pub fn new(cfg: GatewayConfig, router: Arc<MessageRouter>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { cfg, router }),
        }
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn router(&self) -> &Arc<MessageRouter> {
        &self.inner.router
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        self.inner.router.ctx().metrics()
    }

    pub fn is_draining(&self) -> bool {
        self.metrics().is_draining()
    }

    /// Point-in-time gauges that live outside the metrics registry. Connected
    /// clients are already counted by `edgegate_client_sessions_active`.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        let ctx = self.inner.router.ctx();
        vec![("edgegate_workers_registered", ctx.registry().len() as u64)]
    }
}
