use async_trait::async_trait;

use crate::HindsightError;
use crate::types::{Snapshot, SourceInfo, Timestamp};

/// A pluggable upstream series of time-stamped snapshots.
///
/// Implementations fetch and decode raw protocol data (subgraph queries,
/// archive-node calls, ...); the rest of the workspace treats their payloads
/// as opaque values keyed by timestamp.
#[async_trait]
pub trait SnapshotSource<T>: Send + Sync {
    /// Stable identifier used as the per-source key inside merged payloads.
    fn id(&self) -> &str;

    /// Stable cache key, unique per (chain, protocol, resolution, config).
    fn key(&self) -> &str;

    /// Static description of the series.
    fn info(&self) -> &SourceInfo;

    /// One-time setup (connection handshakes, metadata loads).
    async fn init(&self) -> Result<(), HindsightError>;

    /// Fetch snapshots with timestamps in `[from, to)` (event-resolution
    /// sources may include `to` itself), ascending, at most `limit` items.
    ///
    /// Returning exactly `limit` items signals "there may be more beyond
    /// this page".
    async fn fetch(
        &self,
        from: Timestamp,
        to: Timestamp,
        limit: usize,
    ) -> Result<Vec<Snapshot<T>>, HindsightError>;
}
