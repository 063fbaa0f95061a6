use std::sync::Arc;

use crate::obs::GatewayMetrics;
use crate::realtime::ClientHub;
use crate::registry::{LocalHost, WorkerRegistry};

/// Shared services borrowed by control handlers.
#[derive(Clone)]
pub struct GatewayCtx {
    registry: Arc<WorkerRegistry>,
    hub: Arc<ClientHub>,
    local_host: Arc<LocalHost>,
    metrics: Arc<GatewayMetrics>,
}

impl GatewayCtx {
    pub fn new(
        registry: Arc<WorkerRegistry>,
        hub: Arc<ClientHub>,
        local_host: Arc<LocalHost>,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self {
            registry,
            hub,
            local_host,
            metrics,
        }
    }

    pub fn registry(&self) -> &WorkerRegistry {
        &self.registry
    }

    pub fn hub(&self) -> &ClientHub {
        &self.hub
    }

    pub fn local_host(&self) -> &LocalHost {
        &self.local_host
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.metrics
    }
}
