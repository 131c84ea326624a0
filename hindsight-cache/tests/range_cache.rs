use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use hindsight_cache::RangeCache;
use hindsight_core::{
    Chain, HindsightError, IntervalSet, Protocol, Resolution, SeriesFetch, Snapshot,
    SnapshotSource, SnapshotStore, SourceInfo, TimeRange, Timestamp,
};
use hindsight_mock::{MemoryStore, MockSource};

const HOUR: i64 = 3_600;

struct CountingSource {
    inner: Arc<dyn SnapshotSource<f64>>,
    count: Arc<AtomicUsize>,
}

impl CountingSource {
    fn new(inner: Arc<dyn SnapshotSource<f64>>, count: Arc<AtomicUsize>) -> Self {
        Self { inner, count }
    }
}

#[async_trait::async_trait]
impl SnapshotSource<f64> for CountingSource {
    fn id(&self) -> &str {
        self.inner.id()
    }
    fn key(&self) -> &str {
        self.inner.key()
    }
    fn info(&self) -> &SourceInfo {
        self.inner.info()
    }
    async fn init(&self) -> Result<(), HindsightError> {
        self.inner.init().await
    }
    async fn fetch(
        &self,
        from: Timestamp,
        to: Timestamp,
        limit: usize,
    ) -> Result<Vec<Snapshot<f64>>, HindsightError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(from, to, limit).await
    }
}

fn hourly_info() -> SourceInfo {
    SourceInfo::new(Chain::Arbitrum, Protocol::Aave, Resolution::Hour)
}

fn hourly_cache() -> (RangeCache<f64>, Arc<MemoryStore<f64>>, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let source = Arc::new(CountingSource::new(
        Arc::new(MockSource::new(hourly_info())),
        count.clone(),
    ));
    let store = Arc::new(MemoryStore::new());
    let cache = RangeCache::new(source, store.clone());
    (cache, store, count)
}

fn timestamps(snapshots: &[Snapshot<f64>]) -> Vec<Timestamp> {
    snapshots.iter().map(|s| s.timestamp).collect()
}

#[tokio::test]
async fn simple_fetch_on_empty_cache() {
    let (cache, _, count) = hourly_cache();

    let batch = cache.fetch(0, 6 * HOUR, 1_000).await.unwrap();
    assert!(!batch.cached);
    assert_eq!(
        timestamps(&batch.data),
        vec![0, HOUR, 2 * HOUR, 3 * HOUR, 4 * HOUR, 5 * HOUR]
    );
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn refetch_is_served_from_cache() {
    let (cache, _, count) = hourly_cache();

    let first = cache.fetch(0, 6 * HOUR, 1_000).await.unwrap();
    assert!(!first.cached);
    let second = cache.fetch(0, 6 * HOUR, 1_000).await.unwrap();
    assert!(second.cached);
    assert_eq!(first.data, second.data);
    assert_eq!(count.load(Ordering::SeqCst), 1, "second call must not hit upstream");
}

#[tokio::test]
async fn adjacent_windows_concatenate() {
    let (cache, store, _) = hourly_cache();

    let first = cache.fetch(0, 6 * HOUR, 1_000).await.unwrap();
    let second = cache.fetch(6 * HOUR, 12 * HOUR, 1_000).await.unwrap();
    assert!(!first.cached);
    assert!(!second.cached);

    // One-period gap between the recorded ranges collapses into a single run.
    let set = store.interval_set(&hourly_info().cache_key()).await.unwrap().unwrap();
    assert_eq!(set.ranges, vec![TimeRange::new(0, 11 * HOUR)]);

    let whole = cache.fetch(0, 12 * HOUR, 1_000).await.unwrap();
    assert!(whole.cached);
    assert_eq!(whole.data.len(), 12);
    let concatenated: Vec<Snapshot<f64>> = first
        .data
        .into_iter()
        .chain(second.data.into_iter())
        .collect();
    assert_eq!(whole.data, concatenated);
}

#[tokio::test]
async fn mid_window_read_is_clamped_to_coverage() {
    let (cache, _, count) = hourly_cache();

    cache.fetch(0, 6 * HOUR, 1_000).await.unwrap();
    // Coverage ends at the last materialized sample (5h); a read reaching
    // past it is clamped to the next expected sample boundary (6h).
    let batch = cache.fetch(HOUR, 7 * HOUR, 1_000).await.unwrap();
    assert!(batch.cached);
    assert_eq!(
        timestamps(&batch.data),
        vec![HOUR, 2 * HOUR, 3 * HOUR, 4 * HOUR, 5 * HOUR]
    );
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn gap_is_not_bridged() {
    let (cache, _, _) = hourly_cache();

    cache.fetch(0, 6 * HOUR, 1_000).await.unwrap();
    cache.fetch(18 * HOUR, 24 * HOUR, 1_000).await.unwrap();

    // A 12-hour hole separates the two runs; a spanning read returns only
    // the first contiguous run instead of silently skipping the hole.
    let batch = cache.fetch(0, 24 * HOUR, 1_000).await.unwrap();
    assert!(batch.cached);
    assert_eq!(
        timestamps(&batch.data),
        vec![0, HOUR, 2 * HOUR, 3 * HOUR, 4 * HOUR, 5 * HOUR]
    );
}

#[tokio::test]
async fn unaligned_bounds_are_rejected() {
    let (cache, _, count) = hourly_cache();

    let err = cache.fetch(100, 2 * HOUR, 1_000).await.unwrap_err();
    assert!(matches!(err, HindsightError::Alignment { bound: "from", .. }));

    let err = cache.fetch(0, 5_000, 1_000).await.unwrap_err();
    assert!(matches!(err, HindsightError::Alignment { bound: "to", .. }));

    assert_eq!(count.load(Ordering::SeqCst), 0, "alignment errors are fatal before upstream");
}

#[tokio::test]
async fn empty_upstream_result_records_no_coverage() {
    let info = SourceInfo::new(Chain::Ethereum, Protocol::CurveDex, Resolution::Event);
    let source = Arc::new(MockSource::with_samples(info.clone(), vec![]));
    let store = Arc::new(MemoryStore::new());
    let cache = RangeCache::new(source, store.clone());

    let batch = cache.fetch(0, 1_000, 10).await.unwrap();
    assert!(!batch.cached);
    assert!(batch.data.is_empty());
    // "No data" cannot be told apart from "nothing to say", so nothing is claimed.
    assert!(store.interval_set(&info.cache_key()).await.unwrap().is_none());
}

#[tokio::test]
async fn coverage_without_records_self_heals() {
    let (cache, store, count) = hourly_cache();
    let key = hourly_info().cache_key();

    // Claim coverage by hand without persisting any records.
    let mut set = IntervalSet::new(key.clone());
    set.push(TimeRange::new(0, 5 * HOUR));
    store.put_interval_set(&set).await.unwrap();

    let healed = cache.fetch(0, 6 * HOUR, 1_000).await.unwrap();
    assert!(!healed.cached, "inconsistency is repaired by re-fetching, not reported");
    assert_eq!(healed.data.len(), 6);
    assert_eq!(count.load(Ordering::SeqCst), 1);

    let after = cache.fetch(0, 6 * HOUR, 1_000).await.unwrap();
    assert!(after.cached);
    assert_eq!(after.data, healed.data);
}

#[tokio::test]
async fn truncated_page_claims_optimistic_coverage() {
    let (cache, store, count) = hourly_cache();
    let key = hourly_info().cache_key();

    // limit == returned count: the true extent is unknown, so the whole
    // requested window is claimed.
    let first = cache.fetch(0, 6 * HOUR, 3).await.unwrap();
    assert!(!first.cached);
    assert_eq!(timestamps(&first.data), vec![0, HOUR, 2 * HOUR]);
    let set = store.interval_set(&key).await.unwrap().unwrap();
    assert_eq!(set.ranges, vec![TimeRange::new(0, 6 * HOUR)]);

    // Reading inside the over-claimed region finds no records and falls
    // back to upstream, correcting the cache as a side effect.
    let healed = cache.fetch(3 * HOUR, 6 * HOUR, 1_000).await.unwrap();
    assert!(!healed.cached);
    assert_eq!(
        timestamps(&healed.data),
        vec![3 * HOUR, 4 * HOUR, 5 * HOUR]
    );
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn event_series_serves_inclusive_coverage() {
    let info = SourceInfo::new(Chain::Ethereum, Protocol::UniswapDex, Resolution::Event);
    let source = Arc::new(MockSource::with_samples(
        info.clone(),
        vec![(10, vec![1.0]), (50, vec![2.0]), (100, vec![3.0])],
    ));
    let store = Arc::new(MemoryStore::new());
    let cache = RangeCache::new(source, store.clone());

    // Event fetches have no alignment constraint and include the upper bound.
    let first = cache.fetch(0, 100, 10).await.unwrap();
    assert!(!first.cached);
    assert_eq!(timestamps(&first.data), vec![10, 50, 100]);
    let set = store.interval_set(&info.cache_key()).await.unwrap().unwrap();
    assert_eq!(set.ranges, vec![TimeRange::new(0, 100)]);

    let inside = cache.fetch(50, 90, 10).await.unwrap();
    assert!(inside.cached);
    assert_eq!(timestamps(&inside.data), vec![50]);
}
