pub mod common;
pub mod topology;
pub mod triangles;

pub use common::{Graph, GraphError, GraphResult, PartitionCount, VertexId};
pub use topology::{count_triangles, node_iterator_pp};
pub use triangles::{compact_forward, list_triangles, DegreeOrder, WeightedCount};
