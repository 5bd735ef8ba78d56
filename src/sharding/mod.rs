//! Partition assignment and per-group graph construction
//!
//! Every edge is replicated into the partition groups that need it, so that each
//! triangle is fully present (all three edges) in the groups that count it.

pub mod group;
pub mod partition;

pub use group::{count_group, count_weighted_triangles, GroupGraphBuilder};
pub use partition::{all_keys, assign, group_count, replication_factor, Edge, PartitionKey};
