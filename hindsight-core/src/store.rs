use async_trait::async_trait;

use crate::HindsightError;
use crate::interval::IntervalSet;
use crate::types::{Snapshot, Timestamp};

/// Durable mapping from cache key to coverage metadata and from
/// (cache key, timestamp) to snapshot records.
///
/// The backing engine (connection lifecycle, indexing) is an external
/// collaborator; implementations typically keep an *info* table keyed by
/// cache key holding the serialized [`IntervalSet`] and a *data* table keyed
/// by (key, timestamp) indexed for range scans.
///
/// Conflicting writes must be serialized by the store itself; this workspace
/// adds no locking of its own around the persisted interval set.
#[async_trait]
pub trait SnapshotStore<T>: Send + Sync {
    /// Read the coverage metadata for `key`, if any was ever persisted.
    async fn interval_set(&self, key: &str) -> Result<Option<IntervalSet>, HindsightError>;

    /// Upsert the coverage metadata for its key.
    async fn put_interval_set(&self, set: &IntervalSet) -> Result<(), HindsightError>;

    /// Read persisted snapshots for `key` with timestamps in `[from, to)`,
    /// ascending, at most `limit` items.
    async fn query(
        &self,
        key: &str,
        from: Timestamp,
        to: Timestamp,
        limit: usize,
    ) -> Result<Vec<Snapshot<T>>, HindsightError>;

    /// Persist snapshots for `key`. Idempotent on (key, timestamp): records
    /// already present are skipped, not an error.
    async fn insert(&self, key: &str, snapshots: &[Snapshot<T>]) -> Result<(), HindsightError>;

    /// Drop all coverage metadata and records for `key`. Test and
    /// maintenance utility.
    async fn delete_key(&self, key: &str) -> Result<(), HindsightError>;
}
