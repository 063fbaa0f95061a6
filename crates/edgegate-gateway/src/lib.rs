//! edgegate gateway library entry.
//!
//! Client transports, the message router and its control handlers, the
//! worker registry, and the uplinks to the master and to colocated workers.
//! Consumed by the binary (`main.rs`) and by integration tests.

pub mod announce;
pub mod app_state;
pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod obs;
pub mod ops;
pub mod realtime;
pub mod registry;
pub mod router;
pub mod routing;
pub mod transport;
pub mod uplink;
