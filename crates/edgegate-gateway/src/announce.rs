//! Self-announcement to the master: a hello once the control link is up,
//! then a periodic client-count report. Nothing is acknowledged.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinHandle;

use edgegate_core::error::Result;
use edgegate_core::protocol::{keys, Body, Envelope, MessageType, Tag};

use crate::routing::MessageRouter;

/// `AdapterHello` body: `{id, value, unixaddr?}`.
pub fn hello_envelope(pid: u32, clients: usize, reply_addr: Option<&str>) -> Envelope {
    let mut body = Body::new();
    body.insert(keys::ID.into(), Value::from(pid));
    body.insert(keys::VALUE.into(), Value::from(clients));
    if let Some(addr) = reply_addr {
        body.insert(keys::UNIX_ADDR.into(), Value::String(addr.to_string()));
    }
    Envelope::s2s(MessageType::AdapterHello)
        .with_tag(Tag::Master)
        .with_body(body)
}

/// `AdapterChange` body: `{value}`.
pub fn change_envelope(clients: usize) -> Envelope {
    let mut body = Body::new();
    body.insert(keys::VALUE.into(), Value::from(clients));
    Envelope::s2s(MessageType::AdapterChange)
        .with_tag(Tag::Master)
        .with_body(body)
}

pub struct Announcer {
    router: Arc<MessageRouter>,
    pid: u32,
}

impl Announcer {
    pub fn new(router: Arc<MessageRouter>, pid: u32) -> Self {
        Self { router, pid }
    }

    fn clients(&self) -> usize {
        self.router.ctx().hub().client_count()
    }

    pub fn say_hello(&self) -> Result<()> {
        let env = hello_envelope(self.pid, self.clients(), self.router.reply_addr());
        self.router.control().send(&env)?;
        tracing::info!(
            pid = self.pid,
            reply_addr = ?self.router.reply_addr(),
            "hello sent to master"
        );
        Ok(())
    }

    pub fn report_state(&self) -> Result<()> {
        let clients = self.clients();
        self.router.control().send(&change_envelope(clients))?;
        tracing::debug!(clients, "state reported");
        Ok(())
    }

    /// Report every `every`. Failures are logged; the loop keeps going.
    pub fn spawn_reporter(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(every);
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick fires immediately; the hello already covered it.
            tick.tick().await;
            loop {
                tick.tick().await;
                if let Err(e) = self.report_state() {
                    tracing::warn!(error = %e, "state report failed");
                }
            }
        })
    }
}
