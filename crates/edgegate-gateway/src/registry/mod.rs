//! Worker pool state.
//!
//! `WorkerRegistry` tracks backend workers by the session they registered
//! through; `LocalHost` holds the gateway's own hostname, which decides
//! whether a worker is eligible for the local datagram fast path.

mod local_host;
mod workers;

pub use local_host::LocalHost;
pub use workers::{WorkerInfo, WorkerRegistry};
