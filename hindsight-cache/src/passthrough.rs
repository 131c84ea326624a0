use std::sync::Arc;

use async_trait::async_trait;
use hindsight_core::{
    CachedBatch, HindsightError, Resolution, SeriesFetch, SnapshotSource, Timestamp,
};

/// Direct delegation to the upstream source with no persistence.
///
/// Used when a backtest opts out of caching. The `cached` flag on returned
/// batches is always `true`: downstream consumers treat every passthrough
/// batch as settled data, and nothing is ever written anywhere.
pub struct Passthrough<T> {
    source: Arc<dyn SnapshotSource<T>>,
}

impl<T> Passthrough<T> {
    /// Wrap `source` without any cache behind it.
    #[must_use]
    pub fn new(source: Arc<dyn SnapshotSource<T>>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl<T> SeriesFetch<T> for Passthrough<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn source_id(&self) -> &str {
        self.source.id()
    }

    fn resolution(&self) -> Resolution {
        self.source.info().resolution
    }

    async fn fetch(
        &self,
        from: Timestamp,
        to: Timestamp,
        limit: usize,
    ) -> Result<CachedBatch<T>, HindsightError> {
        let data = self.source.fetch(from, to, limit).await?;
        Ok(CachedBatch { data, cached: true })
    }
}
