//! Lightweight in-process metrics (dependency-free).
//!
//! Counters for forwarding decisions, flow-control events, fan-out and
//! failures. Stored as atomics and rendered by the `/metrics` handler.

pub mod metrics;

pub use metrics::GatewayMetrics;
