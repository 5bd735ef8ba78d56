//! Weighted compact-forward triangle counting
//!
//! Vertices are ranked by non-increasing degree (ties broken by ascending vertex id)
//! and every triangle is discovered exactly once, from its lowest-ranked vertex `v`
//! through an earlier-ranked neighbor `u`, by merging the sorted neighbor ranks of
//! `v` and `u` that precede `u`.
//!
//! Each discovered triangle is weighted by how its vertices fall into buckets
//! (`vertex mod p`): a triangle whose three vertices share one bucket is replicated
//! into `p - 1` partition groups, so it contributes `1 / (p - 1)` per group. Every
//! other triangle lives in exactly one group and contributes `1`.

use super::common::{Graph, PartitionCount, VertexId};
use std::cmp::Ordering;
use std::ops::{Add, AddAssign};

/// Weighted partial triangle count of one partition group.
///
/// Kept as two integer tallies so the real value can be reconstructed exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightedCount {
    /// Triangles spanning two or three buckets (weight 1)
    pub spanning: u64,
    /// Triangles whose vertices all share one bucket (weight 1 / (p - 1))
    pub single_bucket: u64,
}

impl WeightedCount {
    /// Real-valued contribution of this tally
    pub fn value(&self, partitions: PartitionCount) -> f64 {
        self.spanning as f64 + self.single_bucket as f64 / (partitions.get() - 1) as f64
    }

    pub fn is_zero(&self) -> bool {
        self.spanning == 0 && self.single_bucket == 0
    }

    /// Number of triangles discovered, ignoring weights
    pub fn discovered(&self) -> u64 {
        self.spanning + self.single_bucket
    }
}

impl Add for WeightedCount {
    type Output = WeightedCount;

    fn add(self, rhs: Self) -> Self::Output {
        WeightedCount {
            spanning: self.spanning + rhs.spanning,
            single_bucket: self.single_bucket + rhs.single_bucket,
        }
    }
}

impl AddAssign for WeightedCount {
    fn add_assign(&mut self, rhs: Self) {
        self.spanning += rhs.spanning;
        self.single_bucket += rhs.single_bucket;
    }
}

impl std::iter::Sum for WeightedCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(WeightedCount::default(), Add::add)
    }
}

/// Degree ordering of a graph with rank-indexed adjacency.
///
/// `order[r]` is the dense vertex index holding rank `r`; `ranked[r]` holds the
/// sorted ranks of that vertex's neighbors.
pub struct DegreeOrder {
    order: Vec<usize>,
    ranked: Vec<Vec<usize>>,
}

impl DegreeOrder {
    pub fn new(graph: &Graph) -> Self {
        Self::with_tie_break(graph, |a, b| a.cmp(&b))
    }

    /// Degree order whose equal-degree vertices are ranked by `tie_break`
    pub(crate) fn with_tie_break<F>(graph: &Graph, tie_break: F) -> Self
    where
        F: Fn(VertexId, VertexId) -> Ordering,
    {
        let n = graph.vertex_count();

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_unstable_by(|&a, &b| {
            graph
                .index_degree(b)
                .cmp(&graph.index_degree(a))
                .then_with(|| tie_break(graph.vertex_at(a), graph.vertex_at(b)))
        });

        let mut rank = vec![0usize; n];
        for (r, &idx) in order.iter().enumerate() {
            rank[idx] = r;
        }

        let ranked = order
            .iter()
            .map(|&idx| {
                let mut ranks: Vec<usize> = graph
                    .neighbor_indices(idx)
                    .iter()
                    .map(|&n| rank[n])
                    .collect();
                ranks.sort_unstable();
                ranks
            })
            .collect();

        DegreeOrder { order, ranked }
    }

    /// Dense vertex index at a given rank
    pub fn index_at(&self, rank: usize) -> usize {
        self.order[rank]
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Visit every triangle once as `(i, l, j)` ranks with `j < l < i`.
    pub fn for_each_triangle<F>(&self, mut visit: F)
    where
        F: FnMut(usize, usize, usize),
    {
        for (i, v_ranks) in self.ranked.iter().enumerate() {
            // Only earlier-ranked neighbors; the list is sorted so stop at the first l >= i
            for &l in v_ranks.iter().take_while(|&&l| l < i) {
                let u_ranks = &self.ranked[l];
                let (mut a, mut b) = (0, 0);
                while a < v_ranks.len() && b < u_ranks.len() {
                    let j = v_ranks[a];
                    let k = u_ranks[b];
                    if j >= l || k >= l {
                        break;
                    }
                    match j.cmp(&k) {
                        Ordering::Less => a += 1,
                        Ordering::Greater => b += 1,
                        Ordering::Equal => {
                            visit(i, l, j);
                            a += 1;
                            b += 1;
                        }
                    }
                }
            }
        }
    }
}

/// Compact-forward weighted triangle count of one group's graph
pub fn compact_forward(graph: &Graph, partitions: PartitionCount) -> WeightedCount {
    if graph.vertex_count() < 3 {
        return WeightedCount::default();
    }
    weighted_count(graph, &DegreeOrder::new(graph), partitions)
}

fn weighted_count(graph: &Graph, order: &DegreeOrder, partitions: PartitionCount) -> WeightedCount {
    let mut count = WeightedCount::default();
    let buckets: Vec<u64> = (0..order.len())
        .map(|r| partitions.bucket(graph.vertex_at(order.index_at(r))))
        .collect();

    order.for_each_triangle(|v, u, w| {
        if buckets[v] == buckets[u] && buckets[u] == buckets[w] {
            count.single_bucket += 1;
        } else {
            count.spanning += 1;
        }
    });

    count
}

/// List every triangle of the graph once, each as vertex ids sorted ascending
pub fn list_triangles(graph: &Graph) -> Vec<[VertexId; 3]> {
    let order = DegreeOrder::new(graph);
    let mut triangles = Vec::new();
    order.for_each_triangle(|v, u, w| {
        let mut triangle = [v, u, w].map(|r| graph.vertex_at(order.index_at(r)));
        triangle.sort_unstable();
        triangles.push(triangle);
    });
    triangles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::count_triangles;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    fn partitions(p: u64) -> PartitionCount {
        PartitionCount::new(p).unwrap()
    }

    fn complete_graph(vertices: &[VertexId]) -> Graph {
        let mut graph = Graph::new();
        for (i, &u) in vertices.iter().enumerate() {
            for &v in &vertices[i + 1..] {
                graph.add_edge(u, v);
            }
        }
        graph
    }

    #[test]
    fn test_empty_and_tiny_graphs() {
        assert!(compact_forward(&Graph::new(), partitions(2)).is_zero());

        let mut path = Graph::new();
        path.add_edge(1, 2);
        path.add_edge(2, 3);
        assert!(compact_forward(&path, partitions(2)).is_zero());
    }

    #[test]
    fn test_single_triangle_two_buckets() {
        // Buckets under p = 2: 1 -> 1, 2 -> 0, 3 -> 1
        let graph = Graph::from_edges(vec![(1, 2), (2, 3), (3, 1)]);
        let count = compact_forward(&graph, partitions(2));

        assert_eq!(count, WeightedCount { spanning: 1, single_bucket: 0 });
        assert_eq!(count.value(partitions(2)), 1.0);
    }

    #[test]
    fn test_single_bucket_triangle_weight() {
        // 0, 3, 6 all land in bucket 0 under p = 3
        let graph = Graph::from_edges(vec![(0, 3), (3, 6), (6, 0)]);
        let count = compact_forward(&graph, partitions(3));

        assert_eq!(count, WeightedCount { spanning: 0, single_bucket: 1 });
        assert_eq!(count.value(partitions(3)), 0.5);
    }

    #[test]
    fn test_complete_graph() {
        // K5 has C(5, 3) = 10 triangles
        let graph = complete_graph(&[1, 2, 3, 4, 5]);
        let count = compact_forward(&graph, partitions(7));
        assert_eq!(count.discovered(), 10);
    }

    #[test]
    fn test_self_loops_ignored() {
        let mut graph = Graph::from_edges(vec![(1, 2), (2, 3), (3, 1)]);
        graph.add_edge(1, 1);
        graph.add_edge(2, 2);

        assert_eq!(compact_forward(&graph, partitions(5)).discovered(), 1);
    }

    #[test]
    fn test_list_triangles_each_once() {
        let graph = Graph::from_edges(vec![
            (1, 2), (2, 3), (3, 1),
            (3, 4), (4, 1),
            (10, 11), (11, 12), (12, 10),
            (12, 13),
        ]);

        let triangles = list_triangles(&graph);
        let unique: HashSet<_> = triangles.iter().copied().collect();

        assert_eq!(triangles.len(), unique.len());
        assert_eq!(
            unique,
            HashSet::from([[1, 2, 3], [1, 3, 4], [10, 11, 12]])
        );
    }

    #[test]
    fn test_matches_brute_force_on_random_graphs() {
        let mut rng = StdRng::seed_from_u64(0x7121);
        for _ in 0..20 {
            let edges: Vec<(VertexId, VertexId)> = (0..150)
                .map(|_| (rng.gen_range(-20..20), rng.gen_range(-20..20)))
                .collect();
            let graph = Graph::from_edges(edges);

            let count = compact_forward(&graph, partitions(4));
            assert_eq!(count.discovered(), count_triangles(&graph));
        }
    }

    #[test]
    fn test_tie_break_does_not_change_count() {
        let mut rng = StdRng::seed_from_u64(0x51de);
        for _ in 0..20 {
            // Dense small graphs have many equal degrees
            let edges: Vec<(VertexId, VertexId)> = (0..60)
                .map(|_| (rng.gen_range(-8..8), rng.gen_range(-8..8)))
                .collect();
            let graph = Graph::from_edges(edges);

            let ascending = DegreeOrder::new(&graph);
            let descending = DegreeOrder::with_tie_break(&graph, |a, b| b.cmp(&a));
            for p in [2, 3, 5] {
                assert_eq!(
                    weighted_count(&graph, &ascending, partitions(p)),
                    weighted_count(&graph, &descending, partitions(p))
                );
            }
        }
    }

    #[test]
    fn test_weighted_count_sum() {
        let total: WeightedCount = vec![
            WeightedCount { spanning: 2, single_bucket: 1 },
            WeightedCount { spanning: 0, single_bucket: 3 },
        ]
        .into_iter()
        .sum();

        assert_eq!(total, WeightedCount { spanning: 2, single_bucket: 4 });
        assert_eq!(total.value(partitions(5)), 3.0);
    }
}
