use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// Per-connection backpressure flag.
///
/// Held from the moment a request is forwarded in flow mode until the
/// worker's flow return (or a heartbeat) releases it. No timeout.
#[derive(Debug, Default)]
pub struct FlowLock {
    locked: AtomicBool,
    released: Notify,
}

impl FlowLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    pub fn try_lock(&self) -> bool {
        self.locked
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Wait until the lock is free, then take it.
    pub async fn lock(&self) {
        loop {
            // Register interest before the check so a release racing with
            // it still wakes us.
            let released = self.released.notified();
            if self.try_lock() {
                return;
            }
            released.await;
        }
    }

    /// Release. Returns whether the lock was held.
    pub fn unlock(&self) -> bool {
        let was = self.locked.swap(false, Ordering::AcqRel);
        if was {
            self.released.notify_waiters();
        }
        was
    }
}
