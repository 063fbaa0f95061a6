//! edgegate core: transport-agnostic protocol primitives and error types.
//!
//! This crate defines the envelope model, the body key catalogue, and the JSON
//! payload codec shared by the gateway and worker-side tooling. It carries no
//! transport or runtime dependencies so it can be reused in multiple contexts.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed traffic surfaces as `EdgeError`, never as a crash.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{EdgeError, ErrorCode, Result};
