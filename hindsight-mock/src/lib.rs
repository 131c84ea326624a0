use async_trait::async_trait;
use hindsight_core::{HindsightError, Snapshot, SnapshotSource, SourceInfo, Timestamp};

mod store;

pub use crate::store::MemoryStore;

/// Deterministic mock source for CI-safe tests and examples.
///
/// Fixed-resolution instances synthesize one sample per period inside the
/// queried window, with a single value derived from the timestamp, so two
/// fetches of the same window always agree. Event-resolution instances (or
/// any instance built via [`MockSource::with_samples`]) serve an explicit
/// seeded sample list instead.
pub struct MockSource {
    info: SourceInfo,
    id: String,
    key: String,
    samples: Option<Vec<Snapshot<f64>>>,
    fail: bool,
}

impl MockSource {
    /// Synthesizing source for a fixed-resolution series.
    #[must_use]
    pub fn new(info: SourceInfo) -> Self {
        let id = info.source_id();
        let key = info.cache_key();
        Self {
            info,
            id,
            key,
            samples: None,
            fail: false,
        }
    }

    /// Source serving exactly the given `(timestamp, values)` samples,
    /// filtered to the queried window. Samples must be provided in
    /// ascending timestamp order.
    #[must_use]
    pub fn with_samples(info: SourceInfo, samples: Vec<(Timestamp, Vec<f64>)>) -> Self {
        let id = info.source_id();
        let snapshots = samples
            .into_iter()
            .map(|(ts, values)| Snapshot::single(ts, id.clone(), values))
            .collect();
        let key = info.cache_key();
        Self {
            info,
            id,
            key,
            samples: Some(snapshots),
            fail: false,
        }
    }

    /// Source whose every fetch fails, for error-path tests.
    #[must_use]
    pub fn failing(info: SourceInfo) -> Self {
        let mut source = Self::new(info);
        source.fail = true;
        source
    }

    /// The deterministic value emitted for a synthesized sample at `ts`.
    #[must_use]
    pub fn value_at(ts: Timestamp) -> f64 {
        ts as f64 * 0.01
    }

    fn synthesize(&self, from: Timestamp, to: Timestamp, limit: usize) -> Vec<Snapshot<f64>> {
        let Some(period) = self.info.resolution.period_seconds() else {
            return Vec::new();
        };
        // Round `from` up to the sampling grid, like a real source would.
        // `to` itself stays exclusive; every grid point below it is a valid
        // sample.
        let rem = from.rem_euclid(period);
        let first = if rem == 0 { from } else { from - rem + period };

        let mut out = Vec::new();
        let mut ts = first;
        while ts < to && out.len() < limit {
            out.push(Snapshot::single(ts, self.id.clone(), vec![Self::value_at(ts)]));
            ts += period;
        }
        out
    }
}

#[async_trait]
impl SnapshotSource<f64> for MockSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn info(&self) -> &SourceInfo {
        &self.info
    }

    async fn init(&self) -> Result<(), HindsightError> {
        Ok(())
    }

    async fn fetch(
        &self,
        from: Timestamp,
        to: Timestamp,
        limit: usize,
    ) -> Result<Vec<Snapshot<f64>>, HindsightError> {
        if self.fail {
            return Err(HindsightError::source(&self.id, "forced failure: fetch"));
        }
        match &self.samples {
            Some(samples) => {
                let inclusive = self.info.resolution.spec().boundary_inclusive;
                let mut out: Vec<Snapshot<f64>> = samples
                    .iter()
                    .filter(|s| {
                        s.timestamp >= from
                            && if inclusive {
                                s.timestamp <= to
                            } else {
                                s.timestamp < to
                            }
                    })
                    .cloned()
                    .collect();
                out.truncate(limit);
                Ok(out)
            }
            None => Ok(self.synthesize(from, to, limit)),
        }
    }
}
