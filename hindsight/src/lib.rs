//! Hindsight replays merged multi-source snapshot history to a backtest
//! consumer.
//!
//! Overview
//! - Drives any number of [`SnapshotSource`](hindsight_core::SnapshotSource)
//!   series across a time window, finest resolution first.
//! - Caches fetched ranges through
//!   [`RangeCache`](hindsight_cache::RangeCache) so repeated runs over the
//!   same window avoid redundant upstream calls.
//! - Unions per-timestamp payloads from all series into single records and
//!   delivers them to a consumer callback in strictly ascending timestamp
//!   order.
//!
//! Key behaviors and trade-offs
//! - The finest-resolution series leads iteration; followers are fetched
//!   concurrently over whatever window the lead page just produced, bounding
//!   memory to one page per series per iteration.
//! - The consumer callback is awaited per record; a slow consumer
//!   back-pressures the whole loop rather than buffering unboundedly.
//! - Any source or store failure, lead or follower, aborts the run. A
//!   silently-missing follower would produce misleadingly incomplete merged
//!   records, so there is no best-effort mode.
//!
//! Running a cached backtest over two mock series:
//! ```rust,ignore
//! use std::sync::Arc;
//! use hindsight::{Backtest, BacktestOptions};
//! use hindsight_core::{Chain, Protocol, Resolution, SourceInfo};
//! use hindsight_mock::{MemoryStore, MockSource};
//!
//! let hourly = Arc::new(MockSource::new(SourceInfo::new(
//!     Chain::Arbitrum, Protocol::Aave, Resolution::Hour,
//! )));
//! let daily = Arc::new(MockSource::new(SourceInfo::new(
//!     Chain::Ethereum, Protocol::CurveDex, Resolution::Day,
//! )));
//!
//! let mut bt = Backtest::builder(0, 86_400 * 7)
//!     .with_source(hourly)
//!     .with_source(daily)
//!     .with_store(Arc::new(MemoryStore::new()))
//!     .build()?;
//! bt.on_data(|snap| async move {
//!     println!("{} sources at t={}", snap.data.len(), snap.timestamp);
//!     Ok(())
//! });
//! bt.run().await?;
//! ```
#![warn(missing_docs)]

mod backtest;

pub use backtest::{Backtest, BacktestBuilder, BacktestOptions};
pub use hindsight_cache::{Passthrough, RangeCache};
pub use hindsight_core::{
    CachedBatch, Chain, HindsightError, IntervalSet, Protocol, Resolution, SeriesFetch, Snapshot,
    SnapshotSource, SnapshotStore, SourceInfo, TimeRange, Timestamp,
};
