#![doc = include_str!("../README.md")]
//! hindsight-cache
//!
//! `SeriesFetch` wrappers around upstream sources.

mod passthrough;
mod range_cache;

pub use crate::passthrough::Passthrough;
pub use crate::range_cache::RangeCache;
