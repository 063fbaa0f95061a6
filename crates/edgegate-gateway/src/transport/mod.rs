//! Client transports.
//!
//! WebSocket (`/v1/ws`) and an optional raw TCP listener with length-prefixed
//! frames. Both decode each frame once into a message map and hand it to the
//! connection's [`ClientPipeline`](crate::routing::ClientPipeline).

pub mod codec;
pub mod session;
pub mod tcp;
pub mod ws;
