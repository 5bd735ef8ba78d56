//! Per-group graph construction and counting

use super::partition::{Edge, PartitionKey};
use crate::error::TriangleResult;
use tracing::debug;
use tripart_algorithms::{compact_forward, Graph, PartitionCount, WeightedCount};

/// Accumulates the edges routed to one partition group.
///
/// Delivery order does not matter and duplicate edges collapse when the graph is built.
#[derive(Debug, Clone)]
pub struct GroupGraphBuilder {
    key: PartitionKey,
    edges: Vec<Edge>,
}

impl GroupGraphBuilder {
    pub fn new(key: PartitionKey) -> Self {
        Self {
            key,
            edges: Vec::new(),
        }
    }

    pub fn key(&self) -> PartitionKey {
        self.key
    }

    pub fn push(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// Number of edges delivered so far, duplicates included
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Materialize the group's graph
    pub fn build(&self) -> Graph {
        Graph::from_edges(self.edges.iter().map(Edge::as_pair))
    }

    /// Build the graph and run the weighted counter over it
    pub fn count(&self, partitions: PartitionCount) -> WeightedCount {
        let graph = self.build();
        let partial = compact_forward(&graph, partitions);
        debug!(
            "Group {}: {} vertices, {} edges, {} triangles found",
            self.key,
            graph.vertex_count(),
            graph.edge_count(),
            partial.discovered()
        );
        partial
    }
}

impl Extend<Edge> for GroupGraphBuilder {
    fn extend<I: IntoIterator<Item = Edge>>(&mut self, iter: I) {
        self.edges.extend(iter);
    }
}

/// Weighted count of one group, given the edges routed to it
pub fn count_group<I>(edges: I, partitions: PartitionCount) -> WeightedCount
where
    I: IntoIterator<Item = Edge>,
{
    let graph = Graph::from_edges(edges.into_iter().map(|e| e.as_pair()));
    compact_forward(&graph, partitions)
}

/// Real-valued weighted triangle count of one group.
///
/// Fails with a configuration error when `partitions <= 1`.
pub fn count_weighted_triangles<I>(edges: I, partitions: u64) -> TriangleResult<f64>
where
    I: IntoIterator<Item = Edge>,
{
    let partitions = PartitionCount::new(partitions)?;
    Ok(count_group(edges, partitions).value(partitions))
}
