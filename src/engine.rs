//! In-process execution engine
//!
//! Runs the partitioned pipeline end to end on one machine:
//! 1. map: every edge is routed to its partition groups
//! 2. shuffle: emissions are grouped by key
//! 3. reduce: each group's graph is built and counted, optionally on a thread pool
//! 4. aggregate: partial results are summed into the global count
//!
//! Groups share no state, so the reduce step parallelizes without locks.

use crate::aggregate::{sum, ResultAggregator};
use crate::config::JobConfig;
use crate::error::{TriangleError, TriangleResult};
use crate::input::EdgeReader;
use crate::sharding::{assign, group_count, Edge, GroupGraphBuilder, PartitionKey};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use tracing::{debug, info};
use tripart_algorithms::{PartitionCount, WeightedCount};

/// Output of the map and shuffle phases
#[derive(Debug, Default)]
pub struct Shuffle {
    groups: FxHashMap<PartitionKey, GroupGraphBuilder>,
    edges_in: usize,
    self_loops: usize,
    emitted: usize,
}

impl Shuffle {
    /// Route one edge to every group that needs it
    pub fn emit(&mut self, edge: Edge, partitions: PartitionCount) {
        self.edges_in += 1;
        let keys = assign(edge, partitions);
        if keys.is_empty() {
            self.self_loops += 1;
            debug!("Dropping self-loop {}", edge);
            return;
        }
        self.emitted += keys.len();
        for key in keys {
            self.groups
                .entry(key)
                .or_insert_with(|| GroupGraphBuilder::new(key))
                .push(edge);
        }
    }

    /// Groups that received at least one edge
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn group(&self, key: &PartitionKey) -> Option<&GroupGraphBuilder> {
        self.groups.get(key)
    }

    /// Edges routed into the shuffle, self-loops included
    pub fn edges_in(&self) -> usize {
        self.edges_in
    }

    /// Edge copies emitted across all groups
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    pub fn self_loops(&self) -> usize {
        self.self_loops
    }
}

/// Partial result of one partition group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupOutcome {
    pub key: PartitionKey,
    /// Edges delivered to the group, duplicates included
    pub edges: usize,
    pub partial: WeightedCount,
    /// Weighted real value of `partial`
    pub value: f64,
}

/// Summary of a complete job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobReport {
    pub partitions: u64,
    /// Exact global triangle count
    pub triangles: u64,
    /// Real-valued sum of the per-group partials
    pub weighted_sum: f64,
    /// Groups that received edges
    pub groups: usize,
    /// Groups with a non-zero partial result
    pub contributing_groups: usize,
    pub edges_read: usize,
    pub records_skipped: usize,
    pub self_loops: usize,
    /// Edge copies emitted by the map phase
    pub replicated_edges: usize,
    /// Per-group results, ordered by key
    pub partials: Vec<GroupOutcome>,
}

/// Runs triangle counting jobs locally
pub struct LocalEngine {
    config: JobConfig,
    partitions: PartitionCount,
    pool: Option<rayon::ThreadPool>,
}

impl LocalEngine {
    /// Create an engine. The configuration is validated before anything else happens.
    pub fn new(config: JobConfig) -> TriangleResult<Self> {
        let partitions = config.validate()?;

        let pool = match (config.parallel, config.threads) {
            (true, Some(threads)) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| TriangleError::Configuration(e.to_string()))?,
            ),
            _ => None,
        };

        Ok(Self {
            config,
            partitions,
            pool,
        })
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    pub fn partitions(&self) -> PartitionCount {
        self.partitions
    }

    /// Map and shuffle an edge stream
    pub fn shuffle<I>(&self, edges: I) -> Shuffle
    where
        I: IntoIterator<Item = Edge>,
    {
        let mut shuffle = Shuffle::default();
        for edge in edges {
            shuffle.emit(edge, self.partitions);
        }
        shuffle
    }

    /// Count every shuffled group, returning outcomes ordered by key
    pub fn reduce(&self, shuffle: Shuffle) -> Vec<GroupOutcome> {
        let partitions = self.partitions;
        let groups: Vec<GroupGraphBuilder> = shuffle.groups.into_values().collect();

        let count = |group: &GroupGraphBuilder| {
            let partial = group.count(partitions);
            GroupOutcome {
                key: group.key(),
                edges: group.len(),
                partial,
                value: partial.value(partitions),
            }
        };

        let mut outcomes: Vec<GroupOutcome> = if !self.config.parallel {
            groups.iter().map(count).collect()
        } else if let Some(pool) = &self.pool {
            pool.install(|| groups.par_iter().map(count).collect())
        } else {
            groups.par_iter().map(count).collect()
        };

        outcomes.sort_unstable_by_key(|outcome| outcome.key);
        outcomes
    }

    /// Run a job over an in-memory edge stream
    pub fn run<I>(&self, edges: I) -> JobReport
    where
        I: IntoIterator<Item = Edge>,
    {
        self.log_start();
        let shuffle = self.shuffle(edges);
        self.finish(shuffle, 0)
    }

    /// Run a job over an edge-list reader, honoring the configured parse mode
    pub fn run_reader<R: BufRead>(&self, reader: R) -> TriangleResult<JobReport> {
        self.log_start();
        let mut edges = EdgeReader::new(reader, self.config.parse_mode);
        let mut shuffle = Shuffle::default();
        for edge in edges.by_ref() {
            shuffle.emit(edge?, self.partitions);
        }
        Ok(self.finish(shuffle, edges.skipped()))
    }

    fn log_start(&self) {
        match group_count(self.partitions) {
            Some(groups) => info!(
                "Starting triangle count: {} partitions, {} possible groups, parallel: {}",
                self.partitions.get(),
                groups,
                self.config.parallel
            ),
            None => info!(
                "Starting triangle count: {} partitions, parallel: {}",
                self.partitions.get(),
                self.config.parallel
            ),
        }
    }

    fn finish(&self, shuffle: Shuffle, records_skipped: usize) -> JobReport {
        info!(
            "Shuffled {} edges into {} groups ({} copies)",
            shuffle.edges_in(),
            shuffle.group_count(),
            shuffle.emitted()
        );
        if records_skipped > 0 {
            info!("Skipped {} malformed records", records_skipped);
        }

        let edges_read = shuffle.edges_in();
        let self_loops = shuffle.self_loops();
        let replicated_edges = shuffle.emitted();
        let groups = shuffle.group_count();

        let partials = self.reduce(shuffle);

        let mut aggregator = ResultAggregator::new(self.partitions);
        aggregator.extend(partials.iter().map(|outcome| outcome.partial));
        let weighted_sum = sum(partials.iter().map(|outcome| outcome.value));
        let triangles = aggregator.total();

        info!(
            "Counted {} triangles across {} contributing groups",
            triangles,
            aggregator.contributing_groups()
        );

        JobReport {
            partitions: self.partitions.get(),
            triangles,
            weighted_sum,
            groups,
            contributing_groups: aggregator.contributing_groups(),
            edges_read,
            records_skipped,
            self_loops,
            replicated_edges,
            partials,
        }
    }
}
