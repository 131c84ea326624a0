use async_trait::async_trait;

use crate::HindsightError;
use crate::types::{Resolution, Snapshot, Timestamp};

/// Result of one [`SeriesFetch::fetch`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedBatch<T> {
    /// Snapshots in ascending timestamp order.
    pub data: Vec<Snapshot<T>>,
    /// Whether the batch was served entirely from persisted data.
    pub cached: bool,
}

/// The fetch contract the backtest driver consumes, implemented by both the
/// range cache and the no-cache passthrough so the driver never has to know
/// which one wraps a series.
#[async_trait]
pub trait SeriesFetch<T>: Send + Sync {
    /// Source id of the wrapped series.
    fn source_id(&self) -> &str;

    /// Resolution of the wrapped series.
    fn resolution(&self) -> Resolution;

    /// Fetch `[from, to)`, serving from persisted data when possible.
    async fn fetch(
        &self,
        from: Timestamp,
        to: Timestamp,
        limit: usize,
    ) -> Result<CachedBatch<T>, HindsightError>;
}
