use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use hindsight_core::{HindsightError, IntervalSet, Snapshot, SnapshotStore, Timestamp};
use tokio::sync::Mutex;

/// In-memory [`SnapshotStore`] mirroring the persisted layout of a real
/// backing engine: an info map keyed by cache key and a data map keyed by
/// (cache key, timestamp) with range-scan ordering.
///
/// Intended for tests and examples; nothing survives the process.
pub struct MemoryStore<T> {
    inner: Mutex<Inner<T>>,
}

struct Inner<T> {
    info: HashMap<String, IntervalSet>,
    data: BTreeMap<(String, Timestamp), Snapshot<T>>,
}

impl<T> MemoryStore<T> {
    /// Fresh, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                info: HashMap::new(),
                data: BTreeMap::new(),
            }),
        }
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> SnapshotStore<T> for MemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn interval_set(&self, key: &str) -> Result<Option<IntervalSet>, HindsightError> {
        let inner = self.inner.lock().await;
        Ok(inner.info.get(key).cloned())
    }

    async fn put_interval_set(&self, set: &IntervalSet) -> Result<(), HindsightError> {
        let mut inner = self.inner.lock().await;
        inner.info.insert(set.key.clone(), set.clone());
        Ok(())
    }

    async fn query(
        &self,
        key: &str,
        from: Timestamp,
        to: Timestamp,
        limit: usize,
    ) -> Result<Vec<Snapshot<T>>, HindsightError> {
        if to <= from {
            return Ok(Vec::new());
        }
        let inner = self.inner.lock().await;
        Ok(inner
            .data
            .range((key.to_string(), from)..(key.to_string(), to))
            .map(|(_, snap)| snap.clone())
            .take(limit)
            .collect())
    }

    async fn insert(&self, key: &str, snapshots: &[Snapshot<T>]) -> Result<(), HindsightError> {
        let mut inner = self.inner.lock().await;
        for snap in snapshots {
            // Idempotent on (key, timestamp): existing records win.
            inner
                .data
                .entry((key.to_string(), snap.timestamp))
                .or_insert_with(|| snap.clone());
        }
        Ok(())
    }

    async fn delete_key(&self, key: &str) -> Result<(), HindsightError> {
        let mut inner = self.inner.lock().await;
        inner.info.remove(key);
        inner.data.retain(|(k, _), _| k.as_str() != key);
        Ok(())
    }
}
