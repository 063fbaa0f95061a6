//! Dispatcher module exports.
//!
//! Re-exports the handler table, the handler trait, and the context handed
//! to every control handler.

pub mod context;
pub mod dispatcher;

pub use context::GatewayCtx;
pub use dispatcher::{ControlHandler, Dispatcher};
