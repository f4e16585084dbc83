/// Background writer: a tokio task that persists the latest queued snapshot.
///
/// Queuing never blocks and never fails. Snapshots queued faster than they
/// can be written collapse into one write of the newest.
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{KeyValueStore, PersistSink, PersistenceBridge};
use crate::store::EntityStore;

pub struct PersistWriter<S: KeyValueStore + 'static> {
    tx: watch::Sender<Option<EntityStore>>,
    handle: JoinHandle<PersistenceBridge<S>>,
}

impl<S: KeyValueStore + 'static> PersistWriter<S> {
    /// Spawn the writer task on the current tokio runtime.
    pub fn spawn(mut bridge: PersistenceBridge<S>) -> Self {
        let (tx, mut rx) = watch::channel(None::<EntityStore>);

        let handle = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let latest = rx.borrow_and_update().clone();
                if let Some(store) = latest {
                    write(&mut bridge, &store);
                }
            }
            // sender gone; flush whatever was queued last
            let last = rx.borrow().clone();
            if let Some(store) = last {
                write(&mut bridge, &store);
            }
            log::debug!("[dragboard.persist] Writer stopped");
            bridge
        });

        Self { tx, handle }
    }

    /// Replace the pending snapshot.
    pub fn queue(&self, store: EntityStore) {
        self.tx.send_replace(Some(store));
    }

    /// Stop the task after it has written the last queued snapshot. Returns
    /// the bridge, or `None` if the task panicked.
    pub async fn shutdown(self) -> Option<PersistenceBridge<S>> {
        let Self { tx, handle } = self;
        drop(tx);
        match handle.await {
            Ok(bridge) => Some(bridge),
            Err(e) => {
                log::error!("[dragboard.persist] Writer task failed: {}", e);
                None
            }
        }
    }
}

fn write<S: KeyValueStore>(bridge: &mut PersistenceBridge<S>, store: &EntityStore) {
    if let Err(e) = bridge.save(store) {
        log::error!("[dragboard.persist] Background save failed: {}", e);
    }
}

impl<S: KeyValueStore + 'static> PersistSink for PersistWriter<S> {
    fn submit(&mut self, store: &EntityStore) {
        self.queue(store.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::{MemoryKeyValueStore, DEFAULT_COLUMNS_KEY};
    use crate::types::ColumnId;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_burst_collapses_to_last_snapshot() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let writer = PersistWriter::spawn(PersistenceBridge::new(kv.clone()));

        let mut store = EntityStore::new();
        for n in 0..50 {
            store = store
                .create_column(ColumnId::from(format!("c{}", n).as_str()), format!("Column {}", n))
                .unwrap();
            writer.queue(store.clone());
        }
        writer.shutdown().await.unwrap();

        let reloaded = PersistenceBridge::new(kv.clone()).load();
        assert_eq!(reloaded, store);
        // one write per key for the whole burst
        assert_eq!(kv.write_count(), 2);
    }

    #[tokio::test]
    async fn test_shutdown_without_submissions_writes_nothing() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let writer = PersistWriter::spawn(PersistenceBridge::new(kv.clone()));
        let bridge = writer.shutdown().await.unwrap();
        assert_eq!(kv.write_count(), 0);
        assert!(bridge.kv().get(DEFAULT_COLUMNS_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sink_submissions_are_written() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let mut writer = PersistWriter::spawn(PersistenceBridge::new(kv.clone()));
        let store = EntityStore::new()
            .create_column(ColumnId::from("c1"), "Todo".into())
            .unwrap();
        writer.submit(&store);
        // let the writer task run
        tokio::task::yield_now().await;
        writer.shutdown().await.unwrap();
        assert_eq!(PersistenceBridge::new(kv).load(), store);
    }
}
