//! Common data structures shared across the hindsight workspace.

use core::fmt;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Unix timestamp in whole seconds.
pub type Timestamp = i64;

/// Sampling cadence of a series: a fixed period or irregular ("event").
///
/// The resolution is a property of the series and fixed for its lifetime; it
/// determines alignment requirements and the coverage merge rule via
/// [`Resolution::spec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    /// One sample per minute.
    #[serde(rename = "1m")]
    Minute,
    /// One sample per hour.
    #[serde(rename = "1h")]
    Hour,
    /// One sample per day.
    #[serde(rename = "1d")]
    Day,
    /// Irregular, event-driven sampling (e.g. one sample per swap).
    #[serde(rename = "event")]
    Event,
}

impl Resolution {
    /// Fixed sampling period in seconds, or `None` for event-driven series.
    #[must_use]
    pub const fn period_seconds(self) -> Option<i64> {
        match self {
            Self::Minute => Some(60),
            Self::Hour => Some(3_600),
            Self::Day => Some(86_400),
            Self::Event => None,
        }
    }

    /// Step used when advancing a paging cursor past the last sample of a
    /// page: the sampling period, or one second for event series.
    #[must_use]
    pub const fn step_seconds(self) -> i64 {
        match self.period_seconds() {
            Some(p) => p,
            None => 1,
        }
    }

    /// Behavioral descriptor consumed uniformly by the interval set and the
    /// range cache instead of re-deriving behavior from the tag at each
    /// call site.
    #[must_use]
    pub const fn spec(self) -> ResolutionSpec {
        match self {
            Self::Event => ResolutionSpec {
                period_seconds: None,
                alignment: Alignment::Free,
                boundary_inclusive: true,
            },
            _ => ResolutionSpec {
                period_seconds: self.period_seconds(),
                alignment: Alignment::Exact,
                boundary_inclusive: false,
            },
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Minute => "1m",
            Self::Hour => "1h",
            Self::Day => "1d",
            Self::Event => "event",
        };
        f.write_str(s)
    }
}

/// Alignment constraint a resolution imposes on query boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Boundaries must be exact multiples of the sampling period.
    Exact,
    /// No alignment constraint.
    Free,
}

/// Behavior descriptor for one resolution.
///
/// Coverage ranges record the timestamp of the last materialized sample as
/// their upper bound. For fixed resolutions the *next* sample is expected one
/// period later, so a one-period gap between ranges is still contiguous and
/// the upper bound is exclusive for point-coverage checks. Event series have
/// no expected next sample; their upper bound is inclusive and adjacency is
/// one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionSpec {
    /// Fixed sampling period in seconds; `None` for irregular series.
    pub period_seconds: Option<i64>,
    /// Alignment constraint on query boundaries.
    pub alignment: Alignment,
    /// Whether point-coverage checks treat a range's upper bound as
    /// inclusive.
    pub boundary_inclusive: bool,
}

impl ResolutionSpec {
    /// Largest gap in seconds between two cached ranges that still counts as
    /// contiguous coverage: one sampling period, or one second for event
    /// series. The predicate encodes "no sample was skipped", not pure
    /// interval adjacency.
    #[must_use]
    pub const fn merge_gap(self) -> i64 {
        match self.period_seconds {
            Some(p) => p,
            None => 1,
        }
    }
}

/// Chains a source can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Chain {
    /// Ethereum mainnet.
    Ethereum,
    /// Arbitrum One.
    Arbitrum,
    /// OP mainnet.
    Optimism,
    /// Avalanche C-Chain.
    Avalanche,
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ethereum => "ethereum",
            Self::Arbitrum => "arbitrum",
            Self::Optimism => "optimism",
            Self::Avalanche => "avalanche",
        };
        f.write_str(s)
    }
}

/// Protocols with a snapshot source implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Protocol {
    /// Aave lending markets.
    Aave,
    /// Camelot AMM pools.
    CamelotDex,
    /// Camelot farm incentives.
    CamelotFarm,
    /// Velodrome AMM pools.
    VelodromeDex,
    /// Curve stable pools.
    CurveDex,
    /// Uniswap v3 pools.
    UniswapDex,
    /// Trader Joe v2 pools.
    JoesV2Dex,
    /// Sonne lending markets.
    Sonne,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Aave => "aave",
            Self::CamelotDex => "camelot-dex",
            Self::CamelotFarm => "camelot-farm",
            Self::VelodromeDex => "velodrome-dex",
            Self::CurveDex => "curve-dex",
            Self::UniswapDex => "uniswap-dex",
            Self::JoesV2Dex => "joes-v2-dex",
            Self::Sonne => "sonne",
        };
        f.write_str(s)
    }
}

/// Identity and configuration of one upstream series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Optional explicit source id; defaults to the protocol name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Chain the series observes.
    pub chain: Chain,
    /// Protocol the series observes.
    pub protocol: Protocol,
    /// Sampling cadence, fixed for the series' lifetime.
    pub resolution: Resolution,
    /// Source-specific configuration blob (pool addresses, markets, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

impl SourceInfo {
    /// Build an info without an explicit id or config.
    #[must_use]
    pub const fn new(chain: Chain, protocol: Protocol, resolution: Resolution) -> Self {
        Self {
            id: None,
            chain,
            protocol,
            resolution,
            config: None,
        }
    }

    /// Id used as the per-source key inside merged payloads: the explicit
    /// id when one is set, otherwise the protocol name.
    #[must_use]
    pub fn source_id(&self) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| self.protocol.to_string())
    }

    /// Stable cache key for the series, unique per
    /// (chain, protocol, resolution) plus the explicit id when one is set.
    #[must_use]
    pub fn cache_key(&self) -> String {
        match &self.id {
            Some(id) => format!("{}:{}:{}:{}", self.chain, self.protocol, self.resolution, id),
            None => format!("{}:{}:{}", self.chain, self.protocol, self.resolution),
        }
    }
}

/// One time-stamped sample of a series.
///
/// `data` maps a source id to the values that source observed at the instant.
/// A snapshot produced by a single source carries exactly one entry; the
/// merge driver unions several sources' entries into the same shape. The
/// payload type is opaque to this workspace, bound only by what persistence
/// and merging require.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<T> {
    /// Unix seconds.
    pub timestamp: Timestamp,
    /// Per-source values present at `timestamp`, keyed by source id.
    pub data: BTreeMap<String, Vec<T>>,
}

impl<T> Snapshot<T> {
    /// Build a snapshot carrying one source's values.
    #[must_use]
    pub fn single(timestamp: Timestamp, source_id: impl Into<String>, values: Vec<T>) -> Self {
        let mut data = BTreeMap::new();
        data.insert(source_id.into(), values);
        Self { timestamp, data }
    }
}
