use atlas_types::{CollabError, Record, RecordId, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory record registry with per-record locking.
///
/// The outer lock is held only for lookup and insert; each record carries
/// its own lock, so mutations of one record serialize against each other
/// without blocking operations on other records.
pub struct RecordStore {
    records: Arc<RwLock<HashMap<RecordId, Arc<RwLock<Record>>>>>,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn insert(&self, record: Record) {
        let mut records = self.records.write().await;
        records.insert(record.id, Arc::new(RwLock::new(record)));
    }

    /// Handle to one record's lock for a serialized read-modify-write.
    pub async fn entry(&self, id: RecordId) -> Result<Arc<RwLock<Record>>> {
        let records = self.records.read().await;
        records
            .get(&id)
            .cloned()
            .ok_or(CollabError::RecordNotFound(id))
    }

    /// Snapshot of one record's current state.
    pub async fn get(&self, id: RecordId) -> Result<Record> {
        let entry = self.entry(id).await?;
        let record = entry.read().await;
        Ok(record.clone())
    }

    pub async fn snapshot_all(&self) -> Vec<Record> {
        let entries: Vec<_> = {
            let records = self.records.read().await;
            records.values().cloned().collect()
        };
        let mut out = Vec::with_capacity(entries.len());
        for entry in entries {
            out.push(entry.read().await.clone());
        }
        out
    }

    pub async fn len(&self) -> usize {
        let records = self.records.read().await;
        records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Clone for RecordStore {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}
