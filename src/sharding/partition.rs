//! Partition assignment
//!
//! An edge whose endpoints fall into buckets `x` and `y` is routed to:
//! - every pair group `{x, b}` (b != x) when `x == y`;
//! - the pair group `{x, y}` plus every triple group `{x, y, z}` otherwise.
//!
//! A triangle spanning three buckets is then complete in exactly one triple group,
//! one spanning two buckets in exactly one pair group, and one inside a single
//! bucket in `p - 1` pair groups.

use serde::{Deserialize, Serialize};
use std::fmt;
use tripart_algorithms::{PartitionCount, VertexId};

/// An undirected edge, canonicalized so that `node1 >= node2`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub node1: VertexId,
    pub node2: VertexId,
}

impl Edge {
    pub fn new(a: VertexId, b: VertexId) -> Self {
        if a >= b {
            Edge { node1: a, node2: b }
        } else {
            Edge { node1: b, node2: a }
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.node1 == self.node2
    }

    pub fn as_pair(&self) -> (VertexId, VertexId) {
        (self.node1, self.node2)
    }
}

impl From<(VertexId, VertexId)> for Edge {
    fn from((a, b): (VertexId, VertexId)) -> Self {
        Edge::new(a, b)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.node1, self.node2)
    }
}

/// Grouping key: 2 or 3 distinct buckets, sorted ascending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PartitionKey {
    Pair(u64, u64),
    Triple(u64, u64, u64),
}

impl PartitionKey {
    /// Pair key from two distinct buckets, in any order
    pub fn pair(a: u64, b: u64) -> Self {
        debug_assert_ne!(a, b);
        PartitionKey::Pair(a.min(b), a.max(b))
    }

    /// Triple key from three distinct buckets, in any order
    pub fn triple(a: u64, b: u64, c: u64) -> Self {
        let mut buckets = [a, b, c];
        buckets.sort_unstable();
        debug_assert!(buckets[0] < buckets[1] && buckets[1] < buckets[2]);
        PartitionKey::Triple(buckets[0], buckets[1], buckets[2])
    }

    pub fn buckets(&self) -> Vec<u64> {
        match *self {
            PartitionKey::Pair(a, b) => vec![a, b],
            PartitionKey::Triple(a, b, c) => vec![a, b, c],
        }
    }

    pub fn contains(&self, bucket: u64) -> bool {
        match *self {
            PartitionKey::Pair(a, b) => bucket == a || bucket == b,
            PartitionKey::Triple(a, b, c) => bucket == a || bucket == b || bucket == c,
        }
    }

    pub fn is_triple(&self) -> bool {
        matches!(self, PartitionKey::Triple(..))
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionKey::Pair(a, b) => write!(f, "{},{}", a, b),
            PartitionKey::Triple(a, b, c) => write!(f, "{},{},{}", a, b, c),
        }
    }
}

/// Groups an edge must be replicated into.
///
/// The returned keys are distinct. Self-loops can never close a triangle and are
/// routed nowhere.
pub fn assign(edge: Edge, partitions: PartitionCount) -> Vec<PartitionKey> {
    if edge.is_self_loop() {
        return Vec::new();
    }

    let p = partitions.get();
    let x = partitions.bucket(edge.node1);
    let y = partitions.bucket(edge.node2);

    if x == y {
        (0..p)
            .filter(|&b| b != x)
            .map(|b| PartitionKey::pair(x, b))
            .collect()
    } else {
        let mut keys = Vec::with_capacity(replication_factor(partitions));
        keys.push(PartitionKey::pair(x, y));
        keys.extend(
            (0..p)
                .filter(|&z| z != x && z != y)
                .map(|z| PartitionKey::triple(x, y, z)),
        );
        keys
    }
}

/// Every group key that exists for `p` buckets, in ascending order.
///
/// Keys are produced lazily: the number of groups grows with `p^3`.
pub fn all_keys(partitions: PartitionCount) -> impl Iterator<Item = PartitionKey> {
    let p = partitions.get();
    let pairs = (0..p).flat_map(move |a| ((a + 1)..p).map(move |b| PartitionKey::Pair(a, b)));
    let triples = (0..p).flat_map(move |a| {
        ((a + 1)..p).flat_map(move |b| ((b + 1)..p).map(move |c| PartitionKey::Triple(a, b, c)))
    });
    pairs.chain(triples)
}

/// Number of partition groups: C(p, 2) + C(p, 3).
///
/// `None` when the count does not fit in a `u128`.
pub fn group_count(partitions: PartitionCount) -> Option<u128> {
    let p = partitions.get() as u128;
    // p (p - 1) is always even, and p (p - 1) (p - 2) divisible by 6
    let pairs = p.checked_mul(p - 1)? / 2;
    let triples = p.checked_mul(p - 1)?.checked_mul(p - 2)? / 6;
    pairs.checked_add(triples)
}

/// Number of groups every non-loop edge is copied into
pub fn replication_factor(partitions: PartitionCount) -> usize {
    partitions.get() as usize - 1
}
