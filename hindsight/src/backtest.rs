use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
#[cfg(feature = "tracing")]
use std::time::Instant;

use futures::future::{BoxFuture, try_join_all};
use hindsight_cache::{Passthrough, RangeCache};
use hindsight_core::{
    HindsightError, Resolution, SeriesFetch, Snapshot, SnapshotSource, SnapshotStore, Timestamp,
};

/// Tunables for a backtest run.
#[derive(Debug, Clone)]
pub struct BacktestOptions {
    /// Serve repeat windows from the persistent cache. Requires a store.
    pub use_cache: bool,
    /// Page size for upstream and store queries. Too high and range scans
    /// against the store start to crawl.
    pub limit: usize,
}

impl Default for BacktestOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            limit: 3_000,
        }
    }
}

type DataHandler<T> =
    Box<dyn FnMut(Snapshot<T>) -> BoxFuture<'static, Result<(), HindsightError>> + Send>;
type LifecycleHandler = Box<dyn FnMut() -> BoxFuture<'static, Result<(), HindsightError>> + Send>;

/// Replays a `[start, end)` window of merged multi-source snapshots to a
/// consumer callback in strictly ascending timestamp order.
///
/// The finest-resolution series leads iteration and defines the page
/// windows; the remaining series follow, fetched concurrently over each
/// window the lead produced. See the crate docs for the full loop contract.
pub struct Backtest<T> {
    start: Timestamp,
    end: Timestamp,
    sources: Vec<Arc<dyn SnapshotSource<T>>>,
    store: Option<Arc<dyn SnapshotStore<T>>>,
    options: BacktestOptions,
    on_before: Option<LifecycleHandler>,
    on_data: Option<DataHandler<T>>,
    on_after: Option<LifecycleHandler>,
}

/// Builder for a [`Backtest`] run.
pub struct BacktestBuilder<T> {
    start: Timestamp,
    end: Timestamp,
    sources: Vec<Arc<dyn SnapshotSource<T>>>,
    store: Option<Arc<dyn SnapshotStore<T>>>,
    options: BacktestOptions,
}

impl<T> BacktestBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Start a builder over the half-open window `[start, end)`.
    #[must_use]
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self {
            start,
            end,
            sources: Vec::new(),
            store: None,
            options: BacktestOptions::default(),
        }
    }

    /// Register one upstream series. Registration order does not matter;
    /// the run sorts series by resolution, finest first.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn SnapshotSource<T>>) -> Self {
        self.sources.push(source);
        self
    }

    /// Store backing the range cache. Required unless caching is disabled.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn SnapshotStore<T>>) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the default options (cache on, page limit 3000).
    #[must_use]
    pub fn with_options(mut self, options: BacktestOptions) -> Self {
        self.options = options;
        self
    }

    /// Validate and build the run.
    ///
    /// # Errors
    /// Returns `HindsightError::InvalidArg` when no sources are registered,
    /// the window is inverted, the page limit is zero, or caching is enabled
    /// without a store.
    pub fn build(self) -> Result<Backtest<T>, HindsightError> {
        if self.sources.is_empty() {
            return Err(HindsightError::InvalidArg("no sources provided".into()));
        }
        if self.start > self.end {
            return Err(HindsightError::InvalidArg(format!(
                "window start {} is after end {}",
                self.start, self.end
            )));
        }
        if self.options.limit == 0 {
            return Err(HindsightError::InvalidArg("page limit must be > 0".into()));
        }
        if self.options.use_cache && self.store.is_none() {
            return Err(HindsightError::InvalidArg(
                "caching enabled but no store configured".into(),
            ));
        }
        Ok(Backtest {
            start: self.start,
            end: self.end,
            sources: self.sources,
            store: self.store,
            options: self.options,
            on_before: None,
            on_data: None,
            on_after: None,
        })
    }
}

impl<T> Backtest<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Start a builder over the half-open window `[start, end)`.
    #[must_use]
    pub fn builder(start: Timestamp, end: Timestamp) -> BacktestBuilder<T> {
        BacktestBuilder::new(start, end)
    }

    /// Register the hook run once before the first fetch.
    pub fn on_before<F, Fut>(&mut self, mut handler: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), HindsightError>> + Send + 'static,
    {
        self.on_before = Some(Box::new(move || Box::pin(handler())));
    }

    /// Register the per-record consumer. It is awaited before the next
    /// record is delivered, so it never observes two records concurrently.
    pub fn on_data<F, Fut>(&mut self, mut handler: F)
    where
        F: FnMut(Snapshot<T>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), HindsightError>> + Send + 'static,
    {
        self.on_data = Some(Box::new(move |snap| Box::pin(handler(snap))));
    }

    /// Register the hook run once after the window is exhausted.
    pub fn on_after<F, Fut>(&mut self, mut handler: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), HindsightError>> + Send + 'static,
    {
        self.on_after = Some(Box::new(move || Box::pin(handler())));
    }

    fn wrap(&self, source: Arc<dyn SnapshotSource<T>>) -> Box<dyn SeriesFetch<T>> {
        match (&self.store, self.options.use_cache) {
            (Some(store), true) => Box::new(RangeCache::new(source, Arc::clone(store))),
            _ => Box::new(Passthrough::new(source)),
        }
    }

    /// Drive the full window to completion.
    ///
    /// # Errors
    /// Propagates the first source or store failure, from the lead or any
    /// follower, aborting the run.
    pub async fn run(&mut self) -> Result<(), HindsightError> {
        try_join_all(self.sources.iter().map(|s| s.init())).await?;
        if let Some(hook) = self.on_before.as_mut() {
            hook().await?;
        }

        // Finest fixed-resolution series first; it becomes the lead and its
        // resolution sets the cursor step. Event series have no cadence to
        // pace the cursor and their samples can dry up long before the
        // window ends, so they always follow (the sort is stable, ties keep
        // registration order).
        let mut sources = self.sources.clone();
        sources.sort_by_key(|s| s.info().resolution.period_seconds().unwrap_or(i64::MAX));
        let step = sources[0].info().resolution.step_seconds();

        let series: Vec<Box<dyn SeriesFetch<T>>> =
            sources.into_iter().map(|s| self.wrap(s)).collect();
        let (lead, followers) = series
            .split_first()
            .expect("build() rejects empty source lists");

        let limit = self.options.limit;
        let mut from = self.start;
        #[cfg(feature = "tracing")]
        let mut page: u64 = 0;

        while from < self.end {
            #[cfg(feature = "tracing")]
            let page_started = Instant::now();

            let lead_batch = lead.fetch(from, self.end, limit).await?;
            if lead_batch.data.is_empty() {
                break;
            }
            // The lead page's last sample plus one step bounds the window
            // the followers must catch up to.
            let to = lead_batch.data[lead_batch.data.len() - 1].timestamp + step;

            #[cfg(feature = "tracing")]
            tracing::info!(
                page,
                from = %format_time(from),
                to = %format_time(to),
                cached = lead_batch.cached,
                "fetched lead page"
            );

            // A lead page boundary is generally not a multiple of a coarser
            // follower's period, so widen each follower's window outward to
            // its own grid before the cached fetch. The merge below filters
            // back to the lead window, so widening never leaks records
            // across pages.
            let follower_batches = try_join_all(followers.iter().map(|f| {
                let (f_from, f_to) = align_window(from, to, f.resolution());
                f.fetch(f_from, f_to, limit)
            }))
            .await?;

            // Union all timestamps and merge per-source payloads; BTreeMap
            // iteration gives the ascending delivery order for free.
            let mut merged: BTreeMap<Timestamp, BTreeMap<String, Vec<T>>> = BTreeMap::new();
            for snap in lead_batch
                .data
                .into_iter()
                .chain(follower_batches.into_iter().flat_map(|b| b.data))
            {
                // Samples outside the lead window come from widened follower
                // fetches and belong to other pages.
                if snap.timestamp < from || snap.timestamp >= to {
                    continue;
                }
                merged.entry(snap.timestamp).or_default().extend(snap.data);
            }

            #[cfg(feature = "tracing")]
            tracing::debug!(
                page,
                records = merged.len(),
                elapsed_ms = page_started.elapsed().as_millis() as u64,
                "page assembled"
            );

            if let Some(handler) = self.on_data.as_mut() {
                for (timestamp, data) in merged {
                    handler(Snapshot { timestamp, data }).await?;
                }
            }

            from = to;
            #[cfg(feature = "tracing")]
            {
                page += 1;
            }
        }

        if let Some(hook) = self.on_after.as_mut() {
            hook().await?;
        }
        Ok(())
    }
}

/// Round `from` down and `to` up to the resolution's sampling grid, so a
/// window handed to a cached fixed-resolution series satisfies its alignment
/// contract. Event resolutions are unconstrained and pass through.
fn align_window(
    from: Timestamp,
    to: Timestamp,
    resolution: Resolution,
) -> (Timestamp, Timestamp) {
    let Some(period) = resolution.period_seconds() else {
        return (from, to);
    };
    let aligned_from = from - from.rem_euclid(period);
    let rem = to.rem_euclid(period);
    let aligned_to = if rem == 0 { to } else { to - rem + period };
    (aligned_from, aligned_to)
}

#[cfg(feature = "tracing")]
fn format_time(ts: Timestamp) -> String {
    chrono::DateTime::from_timestamp(ts, 0).map_or_else(
        || ts.to_string(),
        |dt| dt.format("%Y-%m-%d %H:%M").to_string(),
    )
}
