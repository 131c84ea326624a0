//! hindsight-core
//!
//! Core types, traits, and utilities shared across the hindsight ecosystem.
//!
//! - `types`: common data structures (timestamps, resolutions, snapshots,
//!   source identity).
//! - `source`: the `SnapshotSource` trait implemented by upstream data
//!   providers.
//! - `store`: the `SnapshotStore` persistence boundary.
//! - `interval`: coverage tracking for cached series.
//! - `series`: the `SeriesFetch` seam between the backtest driver and the
//!   cache (or passthrough) wrappers.
//!
//! Async runtime (Tokio)
//! ---------------------
//! This crate assumes the Tokio ecosystem as the async runtime. All source,
//! store, and series-fetch operations are `async` trait methods; code that
//! drives them must run under a Tokio 1.x runtime.
//!
#![warn(missing_docs)]

mod error;
/// Coverage tracking for cached series.
pub mod interval;
/// The cache-or-passthrough fetch seam consumed by the backtest driver.
pub mod series;
/// The upstream source contract implemented by per-protocol collaborators.
pub mod source;
/// The persistence boundary for cached coverage metadata and records.
pub mod store;
pub mod types;

pub use error::HindsightError;
pub use interval::{IntervalSet, TimeRange};
pub use series::{CachedBatch, SeriesFetch};
pub use source::SnapshotSource;
pub use store::SnapshotStore;
pub use types::*;
