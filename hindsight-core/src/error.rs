use thiserror::Error;

use crate::types::Timestamp;

/// Unified error type for the hindsight workspace.
///
/// This wraps alignment violations, upstream source failures, persistence
/// failures, and argument/data validation errors. An inconsistency between
/// coverage metadata and persisted records is deliberately *not* represented
/// here: the cache repairs it by re-fetching instead of surfacing an error.
#[derive(Debug, Error)]
pub enum HindsightError {
    /// A query boundary is not an exact multiple of the series' fixed
    /// sampling period. Fatal to the call; never retried.
    #[error("unaligned {bound}: {value} is not a multiple of the {period}s period")]
    Alignment {
        /// Which boundary violated the constraint (`"from"` or `"to"`).
        bound: &'static str,
        /// The offending timestamp.
        value: Timestamp,
        /// The series' sampling period in seconds.
        period: i64,
    },

    /// An upstream source failed to initialize or fetch. Propagated
    /// unchanged; retries, if any, belong to the source itself.
    #[error("{source_id} failed: {msg}")]
    Source {
        /// Id of the source that failed.
        source_id: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A store operation failed. Propagated unchanged; an in-progress cache
    /// update may be left partially applied, which a later re-fetch heals.
    #[error("store failed: {msg}")]
    Store {
        /// Human-readable error message.
        msg: String,
    },

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Issues with the returned or expected data (missing fields, etc.).
    #[error("data issue: {0}")]
    Data(String),

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl HindsightError {
    /// Helper: build an `Alignment` error for a boundary and period.
    #[must_use]
    pub const fn alignment(bound: &'static str, value: Timestamp, period: i64) -> Self {
        Self::Alignment {
            bound,
            value,
            period,
        }
    }

    /// Helper: build a `Source` error with the source id and message.
    pub fn source(source_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Source {
            source_id: source_id.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `Store` error from a message.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store { msg: msg.into() }
    }
}
