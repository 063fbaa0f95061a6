//! Client-facing egress for edgegate.
//!
//! Connected client sessions, their flow locks, and the send / multicast /
//! broadcast / close primitives used by control handlers.

pub mod core;
pub mod types;

pub use core::{ClientConn, ClientHub, FlowLock, SessionRegistry};
pub use types::PreparedMsg;
