//! Server-side links: the single control connection to the master and the
//! local datagram channel to colocated workers.
//!
//! Both are single logical byte streams shared by every connection, so each
//! implementation funnels sends through one writer task fed by a bounded
//! queue. `send` never waits: a full or closed queue is an `Unavailable`
//! error for the caller to log.

mod control;
mod local;

use edgegate_core::error::Result;
use edgegate_core::protocol::{Body, Envelope};

pub use control::{ControlReader, TcpControlLink};
pub use local::{LocalReader, UnixLocalLink};

/// Outbound control connection (master or relay).
pub trait ControlLink: Send + Sync {
    fn send(&self, env: &Envelope) -> Result<()>;
}

/// Local datagram channel to workers on this host.
pub trait LocalLink: Send + Sync {
    /// Our own reply socket, stamped into forwarded messages.
    fn reply_addr(&self) -> &str;

    fn send_to(&self, addr: &str, payload: &Body) -> Result<()>;
}
