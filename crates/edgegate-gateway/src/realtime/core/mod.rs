//! Realtime core components for the gateway runtime.
//!
//! Session registry, per-connection flow lock, and the client hub shared by
//! the router and the control handlers.

mod flow;
mod hub;
mod session_registry;

pub use flow::FlowLock;
pub use hub::ClientHub;
pub use session_registry::{ClientConn, SessionRegistry};
