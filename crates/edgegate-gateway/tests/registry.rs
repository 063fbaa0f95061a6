#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use edgegate_gateway::registry::{WorkerInfo, WorkerRegistry};

fn worker(capacity: i64) -> WorkerInfo {
    WorkerInfo {
        process_id: 1,
        host: "node-a".into(),
        free_capacity: capacity,
        local_socket_address: String::new(),
    }
}

fn best(r: &WorkerRegistry) -> Option<u64> {
    r.select_best().map(|(id, _)| id)
}

#[test]
fn picks_largest_free_capacity() {
    let r = WorkerRegistry::new();
    r.upsert(10, worker(3));
    r.upsert(11, worker(9));
    r.upsert(12, worker(5));
    assert_eq!(best(&r), Some(11));
}

#[test]
fn ties_go_to_first_registered() {
    let r = WorkerRegistry::new();
    r.upsert(30, worker(7));
    r.upsert(20, worker(7));
    r.upsert(10, worker(7));
    assert_eq!(best(&r), Some(30));
}

#[test]
fn capacity_update_changes_choice() {
    let r = WorkerRegistry::new();
    r.upsert(1, worker(5));
    r.upsert(2, worker(4));
    assert_eq!(best(&r), Some(1));
    r.upsert(2, worker(6));
    assert_eq!(best(&r), Some(2));
}

#[test]
fn saturated_pool_falls_back_to_first_registered() {
    let r = WorkerRegistry::new();
    r.upsert(5, worker(0));
    r.upsert(6, worker(-3));
    assert_eq!(best(&r), Some(5));

    r.upsert(7, worker(1));
    assert_eq!(best(&r), Some(7));
}

#[test]
fn removed_worker_is_never_selected() {
    let r = WorkerRegistry::new();
    r.upsert(1, worker(2));
    r.upsert(2, worker(8));
    r.upsert(3, worker(4));

    assert_eq!(r.remove(2).map(|w| w.free_capacity), Some(8));
    assert_eq!(best(&r), Some(3));
    assert!(r.get(2).is_none());

    r.remove(3);
    r.remove(3);
    assert_eq!(best(&r), Some(1));

    r.remove(1);
    assert!(r.select_best().is_none());
    assert!(r.is_empty());
}

#[test]
fn join_then_leave_leaves_no_entry() {
    let r = WorkerRegistry::new();
    r.upsert(42, worker(100));
    r.remove(42);
    assert_eq!(r.len(), 0);
    assert!(r.select_best().is_none());
}

#[test]
fn snapshot_is_in_registration_order() {
    let r = WorkerRegistry::new();
    r.upsert(9, worker(1));
    r.upsert(3, worker(2));
    r.upsert(9, worker(3));
    let ids: Vec<u64> = r.snapshot().into_iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec![9, 3]);
}
