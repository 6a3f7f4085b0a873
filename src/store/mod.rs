// store/mod.rs - In-memory record collection behind /api/data
//
// Records are kept in insertion order. Reads share the lock, every mutation
// takes the write lock so concurrent writers are serialized.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// A single stored record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Record {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }
}

/// How ids are assigned to new records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// `count + 1`; an id freed by a delete can be handed out again while
    /// a higher id is still live
    Sequential,
    /// One past the highest id ever assigned; never reused
    Monotonic,
}

#[derive(Debug)]
struct Inner {
    records: Vec<Record>,
    high_water: i64,
}

/// Shared handle to the record collection; clones share the same data
#[derive(Debug, Clone)]
pub struct RecordStore {
    inner: Arc<RwLock<Inner>>,
    strategy: IdStrategy,
}

impl RecordStore {
    pub fn new(strategy: IdStrategy) -> Self {
        Self::with_records(strategy, Vec::new())
    }

    /// Store pre-populated with the two demo records
    pub fn seeded(strategy: IdStrategy) -> Self {
        Self::with_records(
            strategy,
            vec![Record::new(1, "John Doe"), Record::new(2, "Jane Doe")],
        )
    }

    pub fn with_records(strategy: IdStrategy, records: Vec<Record>) -> Self {
        let high_water = records.iter().map(|r| r.id).max().unwrap_or(0);
        Self {
            inner: Arc::new(RwLock::new(Inner { records, high_water })),
            strategy,
        }
    }

    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    pub async fn list_all(&self) -> Vec<Record> {
        self.inner.read().await.records.clone()
    }

    pub async fn find_by_id(&self, id: i64) -> Option<Record> {
        let inner = self.inner.read().await;
        inner.records.iter().find(|r| r.id == id).cloned()
    }

    pub async fn create(&self, name: Option<String>) -> Record {
        let mut inner = self.inner.write().await;
        let id = match self.strategy {
            IdStrategy::Sequential => inner.records.len() as i64 + 1,
            IdStrategy::Monotonic => inner.high_water + 1,
        };
        inner.high_water = inner.high_water.max(id);

        let record = Record { id, name };
        inner.records.push(record.clone());
        tracing::debug!("Created record {} ({} total)", id, inner.records.len());
        record
    }

    /// Replace the name of the first record with `id`
    pub async fn update(&self, id: i64, name: Option<String>) -> Option<Record> {
        let mut inner = self.inner.write().await;
        let record = inner.records.iter_mut().find(|r| r.id == id)?;
        record.name = name;
        Some(record.clone())
    }

    /// Remove every record with `id`; absent ids are a no-op
    pub async fn delete(&self, id: i64) {
        let mut inner = self.inner.write().await;
        let before = inner.records.len();
        inner.records.retain(|r| r.id != id);
        tracing::debug!("Deleted {} record(s) with id {}", before - inner.records.len(), id);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::seeded(IdStrategy::Sequential)
    }
}
