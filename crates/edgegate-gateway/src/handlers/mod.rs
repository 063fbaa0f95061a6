//! Control-message handlers (adapter-tagged opcodes).
//!
//! Server-to-server: deliver, kill, flow return, worker membership.
//! Client-to-server: heartbeat.

mod deliver;
mod flow;
mod heart;
mod kill;
mod membership;

use std::sync::Arc;

use edgegate_core::protocol::{MessageType, Scheme};

use crate::dispatch::Dispatcher;

pub use deliver::DeliverHandler;
pub use flow::FlowReturnHandler;
pub use heart::HeartHandler;
pub use kill::KillClientHandler;
pub use membership::{SlaveByeHandler, SlavesSnapshotHandler, WorkerUpsertHandler};

/// Register every built-in handler.
pub fn register_builtin(dispatcher: &Dispatcher) {
    let s2s = Scheme::ServerToServer;
    dispatcher.register(s2s, Arc::new(FlowReturnHandler));
    dispatcher.register(s2s, Arc::new(DeliverHandler));
    dispatcher.register(s2s, Arc::new(KillClientHandler));
    dispatcher.register(s2s, Arc::new(SlavesSnapshotHandler));
    dispatcher.register(s2s, Arc::new(WorkerUpsertHandler::new(MessageType::SlaveCome)));
    dispatcher.register(s2s, Arc::new(WorkerUpsertHandler::new(MessageType::SlaveChange)));
    dispatcher.register(s2s, Arc::new(SlaveByeHandler));

    dispatcher.register(Scheme::ClientToServer, Arc::new(HeartHandler));
}
