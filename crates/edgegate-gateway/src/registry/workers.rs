use std::collections::HashMap;
use std::sync::Mutex;

use edgegate_core::protocol::SessionId;

/// One registered backend worker.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkerInfo {
    /// Worker pid (diagnostic only).
    pub process_id: i64,
    pub host: String,
    /// Self-reported availability; higher is better, may be <= 0.
    pub free_capacity: i64,
    /// Non-empty only when the worker listens on a local datagram socket.
    pub local_socket_address: String,
}

impl WorkerInfo {
    /// Colocated with a gateway running on `host` and reachable locally.
    pub fn is_local_to(&self, host: &str) -> bool {
        !host.is_empty() && self.host == host && !self.local_socket_address.is_empty()
    }
}

#[derive(Debug)]
struct Entry {
    info: WorkerInfo,
    /// Registration order; survives overwrites so tie-breaks stay stable.
    order: u64,
}

#[derive(Debug, Default)]
struct Table {
    entries: HashMap<SessionId, Entry>,
    next_order: u64,
}

/// Worker registry keyed by registration session.
///
/// One mutex guards the whole table. Registry size is the cluster's worker
/// count, and every operation is a bounded in-memory scan that never waits
/// on I/O. A poisoned lock degrades to "no selection" instead of panicking.
#[derive(Debug, Default)]
pub struct WorkerRegistry {
    inner: Mutex<Table>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. No validation of the advertised values.
    pub fn upsert(&self, id: SessionId, info: WorkerInfo) {
        let Ok(mut t) = self.inner.lock() else {
            tracing::error!(worker = id, "worker registry lock poisoned; upsert dropped");
            return;
        };
        if let Some(e) = t.entries.get_mut(&id) {
            e.info = info;
            return;
        }
        let order = t.next_order;
        t.next_order += 1;
        t.entries.insert(id, Entry { info, order });
    }

    /// Delete if present.
    pub fn remove(&self, id: SessionId) -> Option<WorkerInfo> {
        let Ok(mut t) = self.inner.lock() else {
            tracing::error!(worker = id, "worker registry lock poisoned; remove dropped");
            return None;
        };
        t.entries.remove(&id).map(|e| e.info)
    }

    /// Pick the worker with the largest positive free capacity.
    ///
    /// Ties go to the earliest-registered worker. When nobody advertises
    /// positive capacity the earliest-registered worker is returned anyway.
    pub fn select_best(&self) -> Option<(SessionId, WorkerInfo)> {
        let t = self.inner.lock().ok()?;

        let mut best: Option<(SessionId, &Entry)> = None;
        let mut first: Option<(SessionId, &Entry)> = None;

        for (id, e) in t.entries.iter() {
            if first.map_or(true, |(_, f)| e.order < f.order) {
                first = Some((*id, e));
            }
            if e.info.free_capacity <= 0 {
                continue;
            }
            let better = match best {
                None => true,
                Some((_, b)) => {
                    e.info.free_capacity > b.info.free_capacity
                        || (e.info.free_capacity == b.info.free_capacity && e.order < b.order)
                }
            };
            if better {
                best = Some((*id, e));
            }
        }

        best.or(first).map(|(id, e)| (id, e.info.clone()))
    }

    pub fn get(&self, id: SessionId) -> Option<WorkerInfo> {
        let t = self.inner.lock().ok()?;
        t.entries.get(&id).map(|e| e.info.clone())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|t| t.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All workers in registration order.
    pub fn snapshot(&self) -> Vec<(SessionId, WorkerInfo)> {
        let Ok(t) = self.inner.lock() else {
            return Vec::new();
        };
        let mut rows: Vec<(u64, SessionId, WorkerInfo)> = t
            .entries
            .iter()
            .map(|(id, e)| (e.order, *id, e.info.clone()))
            .collect();
        rows.sort_by_key(|(order, _, _)| *order);
        rows.into_iter().map(|(_, id, info)| (id, info)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worker(cap: i64) -> WorkerInfo {
        WorkerInfo {
            process_id: 100,
            host: "h1".into(),
            free_capacity: cap,
            local_socket_address: String::new(),
        }
    }

    #[test]
    fn empty_registry_selects_nothing() {
        let r = WorkerRegistry::new();
        assert!(r.select_best().is_none());
        assert!(r.is_empty());
    }

    #[test]
    fn overwrite_keeps_registration_order() {
        let r = WorkerRegistry::new();
        r.upsert(1, worker(5));
        r.upsert(2, worker(5));
        r.upsert(1, worker(5));
        assert_eq!(r.select_best().map(|(id, _)| id), Some(1));
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn local_eligibility_requires_host_and_socket() {
        let mut w = worker(1);
        assert!(!w.is_local_to("h1"));
        w.local_socket_address = "/tmp/slave_1.sock".into();
        assert!(w.is_local_to("h1"));
        assert!(!w.is_local_to("h2"));
        assert!(!w.is_local_to(""));
    }
}
