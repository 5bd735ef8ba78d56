//! Graph topology analysis algorithms
//!
//! Exact single-machine triangle counting, used to verify partitioned runs.

use super::common::{Graph, VertexId};
use rustc_hash::FxHashMap;

/// Triangle Counting
///
/// Returns total number of triangles in the graph. Each triangle is counted once
/// and self-loops never take part in one.
pub fn count_triangles(graph: &Graph) -> u64 {
    let mut triangle_count = 0;

    // For each edge (u, v), find common neighbors of u and v.
    // To avoid overcounting, we only consider indices u < v < w.
    for u in 0..graph.vertex_count() {
        let u_neighbors = graph.neighbor_indices(u);

        for &v in u_neighbors {
            if v <= u {
                continue;
            }

            for &w in graph.neighbor_indices(v) {
                if w <= v {
                    continue;
                }

                // Neighbor lists are sorted, so membership is a binary search
                if u_neighbors.binary_search(&w).is_ok() {
                    triangle_count += 1;
                }
            }
        }
    }

    triangle_count
}

/// NodeIterator++ triangle counting over a raw edge stream.
///
/// Runs as three keyed passes, the same shape a map-reduce engine would execute:
/// 1. every edge is oriented from its lower to its higher endpoint and grouped by
///    the lower one; each apex then emits its edges plus one wedge for every pair
///    of its higher neighbors
/// 2. wedges are joined with edges on their open endpoint pair; a wedge closes a
///    triangle when that pair is itself an edge
/// 3. closed wedges are summed
///
/// A triangle `a < b < c` closes exactly one wedge (apex `a`, pair `(b, c)`).
/// Duplicate edges collapse and self-loops are ignored.
pub fn node_iterator_pp<I>(edges: I) -> u64
where
    I: IntoIterator<Item = (VertexId, VertexId)>,
{
    // Pass 1: orient and group by the lower endpoint
    let mut higher: FxHashMap<VertexId, Vec<VertexId>> = FxHashMap::default();
    for (u, v) in edges {
        if u == v {
            continue;
        }
        higher.entry(u.min(v)).or_default().push(u.max(v));
    }

    // Pass 2 input: (pair) -> (is an edge, open wedges over it)
    let mut joined: FxHashMap<(VertexId, VertexId), (bool, u64)> = FxHashMap::default();
    for (apex, mut neighbors) in higher {
        neighbors.sort_unstable();
        neighbors.dedup();

        for &n in &neighbors {
            joined.entry((apex, n)).or_default().0 = true;
        }
        for (i, &x) in neighbors.iter().enumerate() {
            for &y in &neighbors[i + 1..] {
                joined.entry((x, y)).or_default().1 += 1;
            }
        }
    }

    // Pass 3
    joined
        .into_values()
        .filter(|&(is_edge, _)| is_edge)
        .map(|(_, wedges)| wedges)
        .sum()
}
