/// Identifier generation for columns and tasks.
///
/// Ids are 16 lowercase hex chars: SHA-256 over an atomic counter (intra-process
/// uniqueness) and a nanosecond timestamp, truncated to 8 bytes.
use std::sync::atomic::{AtomicU64, Ordering};

use sha2::{Digest, Sha256};

use crate::store::EntityStore;
use crate::types::{ColumnId, TaskId};

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a new random id (16 hex chars).
pub fn generate_id() -> String {
    let seq = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    let ts = std::time::SystemTime::now()
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut hasher = Sha256::new();
    hasher.update(seq.to_le_bytes());
    hasher.update(ts.to_le_bytes());
    let hash = hasher.finalize();
    hex::encode(&hash[..8])
}

/// Generate a column id not already present in `store`.
pub fn new_column_id(store: &EntityStore) -> ColumnId {
    loop {
        let id = ColumnId(generate_id());
        if store.column(&id).is_none() {
            return id;
        }
    }
}

/// Generate a task id not already present in `store`.
pub fn new_task_id(store: &EntityStore) -> TaskId {
    loop {
        let id = TaskId(generate_id());
        if store.task(&id).is_none() {
            return id;
        }
    }
}
