//! Tripart
//!
//! Exact triangle counting for undirected graphs whose edge list is too large for
//! one machine. Work is split into independent partition groups that can be
//! counted in parallel and summed.
//!
//! # Architecture
//!
//! - `sharding`: assigns each edge to the partition groups that need it and builds
//!   one graph per group
//! - `tripart_algorithms`: the graph arena and the weighted compact-forward counter
//! - `aggregate`: sums per-group partial results into the exact global count
//! - `engine`: runs map → shuffle → reduce → aggregate in-process on a thread pool
//! - `input` / `config`: edge-list reading and job configuration
//!
//! ## Example Usage
//!
//! ```rust
//! use tripart::{Edge, JobConfig, LocalEngine};
//!
//! let engine = LocalEngine::new(JobConfig::new(3)).unwrap();
//! let edges = vec![(1, 2), (2, 3), (3, 1), (3, 4)];
//!
//! let report = engine.run(edges.into_iter().map(Edge::from));
//! assert_eq!(report.triangles, 1);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod sharding;

// Re-export main types for convenience
pub use aggregate::{sum, ResultAggregator};
pub use config::JobConfig;
pub use engine::{GroupOutcome, JobReport, LocalEngine, Shuffle};
pub use error::{TriangleError, TriangleResult};
pub use input::{open_edge_file, parse_edge, EdgeReader, ParseMode};
pub use sharding::{
    all_keys, assign, count_group, count_weighted_triangles, group_count, replication_factor,
    Edge, GroupGraphBuilder, PartitionKey,
};

pub use tripart_algorithms::{
    compact_forward, count_triangles, list_triangles, node_iterator_pp, Graph, GraphError,
    GraphResult, PartitionCount, VertexId, WeightedCount,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
