//! Top-level facade crate for edgegate.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use edgegate_core::*;
}

pub mod gateway {
    pub use edgegate_gateway::*;
}
