//! Result aggregation
//!
//! Partial results are summed into the global triangle count. The exact path sums
//! the integer tallies of every group and divides the single-bucket tally by `p - 1`
//! once at the end; the real-valued path sums `f64` partials with compensated
//! summation and snaps the result to the nearest integer.

use tracing::warn;
use tripart_algorithms::{PartitionCount, WeightedCount};

/// Distance from an integer below which a real-valued total is snapped to it
const SNAP_EPSILON: f64 = 1e-6;

/// Exact accumulator over per-group weighted tallies
#[derive(Debug, Clone)]
pub struct ResultAggregator {
    partitions: PartitionCount,
    tally: WeightedCount,
    groups: usize,
    contributing: usize,
}

impl ResultAggregator {
    pub fn new(partitions: PartitionCount) -> Self {
        Self {
            partitions,
            tally: WeightedCount::default(),
            groups: 0,
            contributing: 0,
        }
    }

    /// Add one group's partial result
    pub fn add(&mut self, partial: WeightedCount) {
        self.groups += 1;
        if partial.is_zero() {
            return;
        }
        self.contributing += 1;
        self.tally += partial;
    }

    /// Groups seen so far
    pub fn groups(&self) -> usize {
        self.groups
    }

    /// Groups with a non-zero partial result
    pub fn contributing_groups(&self) -> usize {
        self.contributing
    }

    pub fn tally(&self) -> WeightedCount {
        self.tally
    }

    /// Global triangle count.
    ///
    /// Every single-bucket triangle is seen in exactly `p - 1` groups, so the
    /// single-bucket tally divides evenly when all groups were added.
    pub fn total(&self) -> u64 {
        let replicas = self.partitions.get() - 1;
        let WeightedCount {
            spanning,
            single_bucket,
        } = self.tally;

        if single_bucket % replicas != 0 {
            warn!(
                "Single-bucket tally {} is not a multiple of {}; some partition groups are missing",
                single_bucket, replicas
            );
            return spanning + (single_bucket + replicas / 2) / replicas;
        }
        spanning + single_bucket / replicas
    }

    /// Real-valued total, as the sum of every partial's weighted value
    pub fn value(&self) -> f64 {
        self.tally.value(self.partitions)
    }
}

impl Extend<WeightedCount> for ResultAggregator {
    fn extend<I: IntoIterator<Item = WeightedCount>>(&mut self, iter: I) {
        for partial in iter {
            self.add(partial);
        }
    }
}

/// Sum real-valued partial results.
///
/// Zero (and negative) partials are skipped. The result is rounded to the nearest
/// integer when it lies within a small distance of one.
pub fn sum<I>(partials: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    // Kahan summation
    let mut total = 0.0f64;
    let mut compensation = 0.0f64;
    for partial in partials.into_iter().filter(|&v| v > 0.0) {
        let y = partial - compensation;
        let t = total + y;
        compensation = (t - total) - y;
        total = t;
    }

    let rounded = total.round();
    if (total - rounded).abs() < SNAP_EPSILON {
        rounded
    } else {
        total
    }
}
