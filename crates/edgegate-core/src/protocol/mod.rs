//! Protocol modules.
//!
//! - `envelope`: the routed message unit and its closed enumerations.
//! - `keys`: body key catalogue.
//! - `body`: lenient typed reads over decoded bodies.
//! - `codec`: JSON payload codec.
//!
//! All decoders are panic-free: malformed input is reported as `EdgeError`
//! instead of panicking, keeping the gateway resilient to hostile traffic.

pub mod body;
pub mod codec;
pub mod envelope;
pub mod keys;

pub use body::BodyReader;
pub use envelope::{Body, Envelope, MessageType, Scheme, SessionId, Tag, FLOW_ACK_EXPECTED};
