use serde::{Deserialize, Serialize};

use crate::types::{ResolutionSpec, Timestamp};

/// A closed time range `[start, end]` with `start <= end`.
///
/// The upper bound of a coverage range is the timestamp of the last
/// materialized sample, not an exclusive boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Inclusive lower bound.
    pub start: Timestamp,
    /// Inclusive upper bound.
    pub end: Timestamp,
}

impl TimeRange {
    /// Build a range. Callers must uphold `start <= end`.
    #[must_use]
    pub const fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }
}

/// The set of time ranges for which one series' samples are durably cached.
///
/// Invariants after [`IntervalSet::combine`]: ranges are sorted ascending by
/// `start`, non-overlapping, and no two are separated by less than one
/// resolution period. The empty set is valid and means "no coverage".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalSet {
    /// Cache key of the series this set covers.
    pub key: String,
    /// Coverage ranges. Kept normalized by [`IntervalSet::combine`].
    pub ranges: Vec<TimeRange>,
}

impl IntervalSet {
    /// Empty coverage for `key`.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ranges: Vec::new(),
        }
    }

    /// Whether the set records no coverage at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Append a range without normalizing. Callers follow up with
    /// [`IntervalSet::combine`] before persisting.
    pub fn push(&mut self, range: TimeRange) {
        self.ranges.push(range);
    }

    /// Normalize the set: sort by `start` and merge every pair of ranges
    /// whose gap is at most one sampling period (one second for event
    /// series). A fetch ending exactly at `t` and a later fetch starting at
    /// `t + period` represent contiguous coverage even though the numeric
    /// endpoints are not adjacent, since the next sample was expected at
    /// `t + period`. Zero ranges is a no-op.
    pub fn combine(&mut self, spec: ResolutionSpec) {
        if self.ranges.is_empty() {
            return;
        }
        self.ranges.sort_by_key(|r| r.start);
        let gap = spec.merge_gap();

        let mut combined = Vec::with_capacity(self.ranges.len());
        let mut current = self.ranges[0];
        for &next in &self.ranges[1..] {
            if next.start - gap <= current.end {
                // Keep the larger end so a contained range never shrinks
                // already-recorded coverage.
                current.end = current.end.max(next.end);
            } else {
                combined.push(current);
                current = next;
            }
        }
        combined.push(current);
        self.ranges = combined;
    }

    /// Find the range covering the instant `at`, honoring the resolution's
    /// boundary rule: the upper bound is inclusive for event series and
    /// exclusive for fixed ones (the sample *at* the bound is materialized,
    /// but the next one past it may not be).
    #[must_use]
    pub fn covering(&self, at: Timestamp, spec: ResolutionSpec) -> Option<TimeRange> {
        self.ranges.iter().copied().find(|r| {
            at >= r.start
                && if spec.boundary_inclusive {
                    at <= r.end
                } else {
                    at < r.end
                }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Resolution;

    fn hourly() -> ResolutionSpec {
        Resolution::Hour.spec()
    }

    fn event() -> ResolutionSpec {
        Resolution::Event.spec()
    }

    #[test]
    fn empty_set_is_a_noop() {
        let mut set = IntervalSet::new("k");
        set.combine(hourly());
        assert!(set.is_empty());
    }

    #[test]
    fn one_period_gap_is_contiguous() {
        let mut set = IntervalSet::new("k");
        set.push(TimeRange::new(0, 18_000));
        set.push(TimeRange::new(21_600, 39_600));
        set.combine(hourly());
        assert_eq!(set.ranges, vec![TimeRange::new(0, 39_600)]);
    }

    #[test]
    fn larger_gap_is_not_bridged() {
        let mut set = IntervalSet::new("k");
        set.push(TimeRange::new(0, 18_000));
        set.push(TimeRange::new(25_200, 39_600));
        set.combine(hourly());
        assert_eq!(
            set.ranges,
            vec![TimeRange::new(0, 18_000), TimeRange::new(25_200, 39_600)]
        );
    }

    #[test]
    fn event_adjacency_is_one_second() {
        let mut set = IntervalSet::new("k");
        set.push(TimeRange::new(0, 99));
        set.push(TimeRange::new(100, 150));
        set.push(TimeRange::new(152, 200));
        set.combine(event());
        assert_eq!(
            set.ranges,
            vec![TimeRange::new(0, 150), TimeRange::new(152, 200)]
        );
    }

    #[test]
    fn contained_range_does_not_shrink_coverage() {
        let mut set = IntervalSet::new("k");
        set.push(TimeRange::new(0, 36_000));
        set.push(TimeRange::new(7_200, 10_800));
        set.combine(hourly());
        assert_eq!(set.ranges, vec![TimeRange::new(0, 36_000)]);
    }

    #[test]
    fn covering_respects_boundary_rule() {
        let mut set = IntervalSet::new("k");
        set.push(TimeRange::new(0, 18_000));
        set.combine(hourly());
        assert!(set.covering(0, hourly()).is_some());
        assert!(set.covering(17_999, hourly()).is_some());
        // Fixed resolution: the bound itself is covered data, but a read
        // starting there may need the next, not-yet-materialized sample.
        assert!(set.covering(18_000, hourly()).is_none());
        assert!(set.covering(18_000, event()).is_some());
        assert!(set.covering(-1, hourly()).is_none());
    }
}
