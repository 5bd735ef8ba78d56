//! Shared graph structure for the counting algorithms
//!
//! Provides a mutable, undirected adjacency structure over 64-bit vertex identifiers.
//! Vertices live in a dense arena (0..N) and every neighbor set is kept as a sorted
//! sequence of arena indices, so the counting algorithms can merge adjacency lists
//! without hashing.

use rustc_hash::FxHashMap;
use thiserror::Error;

/// Vertex identifier type (i64)
pub type VertexId = i64;

/// Errors that can occur during graph operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Vertex {0} not found")]
    VertexNotFound(VertexId),

    #[error("Invalid partition count {0}: must be greater than 1")]
    InvalidPartitionCount(u64),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Number of buckets vertices are hashed into.
///
/// Always greater than 1; the only way to obtain one is through [`PartitionCount::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u64", into = "u64"))]
pub struct PartitionCount(u64);

impl PartitionCount {
    pub fn new(partitions: u64) -> GraphResult<Self> {
        // Buckets are computed in the signed vertex domain
        if partitions <= 1 || partitions > i64::MAX as u64 {
            return Err(GraphError::InvalidPartitionCount(partitions));
        }
        Ok(PartitionCount(partitions))
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// Bucket of a vertex: `v mod p`, always in `[0, p)` even for negative ids
    pub fn bucket(&self, vertex: VertexId) -> u64 {
        vertex.rem_euclid(self.0 as i64) as u64
    }
}

impl TryFrom<u64> for PartitionCount {
    type Error = GraphError;

    fn try_from(partitions: u64) -> GraphResult<Self> {
        PartitionCount::new(partitions)
    }
}

impl From<PartitionCount> for u64 {
    fn from(partitions: PartitionCount) -> Self {
        partitions.0
    }
}

/// Mutable undirected graph backed by a dense vertex arena.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Mapping from VertexId to dense index
    index_of: FxHashMap<VertexId, usize>,
    /// Mapping from dense index (0..N) back to VertexId
    vertices: Vec<VertexId>,
    /// Sorted neighbor indices for each dense index
    adjacency: Vec<Vec<usize>>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph with room for `capacity` vertices
    pub fn with_capacity(capacity: usize) -> Self {
        Graph {
            index_of: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            vertices: Vec::with_capacity(capacity),
            adjacency: Vec::with_capacity(capacity),
        }
    }

    /// Build a graph from an edge list in one pass.
    ///
    /// Equivalent to calling [`Graph::add_edge`] for every pair, but sorts and
    /// deduplicates each neighbor list once at the end instead of on every insert.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (VertexId, VertexId)>,
    {
        let mut graph = Graph::new();
        for (u, v) in edges {
            let a = graph.intern(u);
            let b = graph.intern(v);
            graph.adjacency[a].push(b);
            graph.adjacency[b].push(a);
        }
        for neighbors in &mut graph.adjacency {
            neighbors.sort_unstable();
            neighbors.dedup();
        }
        graph
    }

    fn intern(&mut self, v: VertexId) -> usize {
        if let Some(&idx) = self.index_of.get(&v) {
            return idx;
        }
        let idx = self.vertices.len();
        self.vertices.push(v);
        self.adjacency.push(Vec::new());
        self.index_of.insert(v, idx);
        idx
    }

    fn index(&self, v: VertexId) -> GraphResult<usize> {
        self.index_of
            .get(&v)
            .copied()
            .ok_or(GraphError::VertexNotFound(v))
    }

    /// Ensure `v` exists (idempotent)
    pub fn add_vertex(&mut self, v: VertexId) {
        self.intern(v);
    }

    /// Delete a vertex and every edge touching it
    pub fn remove_vertex(&mut self, v: VertexId) -> GraphResult<()> {
        let idx = self.index_of.remove(&v).ok_or(GraphError::VertexNotFound(v))?;

        let neighbors = std::mem::take(&mut self.adjacency[idx]);
        for &n in &neighbors {
            if n != idx {
                remove_sorted(&mut self.adjacency[n], idx);
            }
        }

        // Fill the hole with the last vertex and patch every reference to it
        let last = self.vertices.len() - 1;
        self.vertices.swap_remove(idx);
        self.adjacency.swap_remove(idx);
        if idx != last {
            let moved = self.vertices[idx];
            self.index_of.insert(moved, idx);
            let moved_neighbors = self.adjacency[idx].clone();
            for n in moved_neighbors {
                let target = if n == last { idx } else { n };
                let list = &mut self.adjacency[target];
                remove_sorted(list, last);
                insert_sorted(list, idx);
            }
        }
        Ok(())
    }

    /// Add an undirected edge, creating missing endpoints
    pub fn add_edge(&mut self, u: VertexId, v: VertexId) {
        let a = self.intern(u);
        let b = self.intern(v);
        insert_sorted(&mut self.adjacency[a], b);
        insert_sorted(&mut self.adjacency[b], a);
    }

    /// Remove the undirected edge between `u` and `v`, if any
    pub fn remove_edge(&mut self, u: VertexId, v: VertexId) -> GraphResult<()> {
        let a = self.index(u)?;
        let b = self.index(v)?;
        remove_sorted(&mut self.adjacency[a], b);
        remove_sorted(&mut self.adjacency[b], a);
        Ok(())
    }

    pub fn is_adjacent(&self, u: VertexId, v: VertexId) -> GraphResult<bool> {
        let a = self.index(u)?;
        Ok(match self.index_of.get(&v) {
            Some(b) => self.adjacency[a].binary_search(b).is_ok(),
            None => false,
        })
    }

    pub fn contains_vertex(&self, v: VertexId) -> bool {
        self.index_of.contains_key(&v)
    }

    /// Neighbors of `v`. The iterator can be cloned to restart it.
    pub fn neighbors(
        &self,
        v: VertexId,
    ) -> GraphResult<impl Iterator<Item = VertexId> + Clone + '_> {
        let idx = self.index(v)?;
        Ok(self.adjacency[idx].iter().map(move |&n| self.vertices[n]))
    }

    /// Every vertex, in arena order
    pub fn all_vertices(&self) -> impl Iterator<Item = VertexId> + Clone + '_ {
        self.vertices.iter().copied()
    }

    pub fn degree(&self, v: VertexId) -> GraphResult<usize> {
        let idx = self.index(v)?;
        Ok(self.adjacency[idx].len())
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of distinct undirected edges (a self-loop counts once)
    pub fn edge_count(&self) -> usize {
        self.adjacency
            .iter()
            .enumerate()
            .map(|(a, neighbors)| neighbors.iter().filter(|&&b| b >= a).count())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Get the vertex stored at a dense index
    pub fn vertex_at(&self, idx: usize) -> VertexId {
        self.vertices[idx]
    }

    /// Get the degree of a vertex (by index)
    pub fn index_degree(&self, idx: usize) -> usize {
        self.adjacency[idx].len()
    }

    /// Get sorted neighbor indices of a vertex (by index)
    pub fn neighbor_indices(&self, idx: usize) -> &[usize] {
        &self.adjacency[idx]
    }
}

impl PartialEq for Graph {
    /// Two graphs are equal when they hold the same vertices and the same edges,
    /// regardless of arena layout.
    fn eq(&self, other: &Self) -> bool {
        if self.vertex_count() != other.vertex_count() {
            return false;
        }
        self.vertices.iter().enumerate().all(|(idx, &v)| {
            let Ok(theirs) = other.neighbors(v) else {
                return false;
            };
            let mut mine: Vec<VertexId> = self.adjacency[idx]
                .iter()
                .map(|&n| self.vertices[n])
                .collect();
            let mut theirs: Vec<VertexId> = theirs.collect();
            mine.sort_unstable();
            theirs.sort_unstable();
            mine == theirs
        })
    }
}

impl Eq for Graph {}

fn insert_sorted(list: &mut Vec<usize>, value: usize) {
    if let Err(pos) = list.binary_search(&value) {
        list.insert(pos, value);
    }
}

fn remove_sorted(list: &mut Vec<usize>, value: usize) {
    if let Ok(pos) = list.binary_search(&value) {
        list.remove(pos);
    }
}
