//! End-to-end tests for the partitioned counting pipeline
//!
//! Every job result is cross-checked against the single-machine brute-force count.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use tripart::{
    assign, count_group, count_triangles, count_weighted_triangles, node_iterator_pp,
    open_edge_file, sum, Edge, Graph, JobConfig, JobReport, LocalEngine, ParseMode, PartitionKey,
    PartitionCount, TriangleError, WeightedCount,
};

fn edges(pairs: &[(i64, i64)]) -> Vec<Edge> {
    pairs.iter().map(|&pair| Edge::from(pair)).collect()
}

fn run(pairs: &[(i64, i64)], p: u64) -> JobReport {
    LocalEngine::new(JobConfig::new(p)).unwrap().run(edges(pairs))
}

fn brute_force(pairs: &[(i64, i64)]) -> u64 {
    count_triangles(&Graph::from_edges(pairs.iter().copied()))
}

/// K_n on vertices 0..n
fn complete(n: i64) -> Vec<(i64, i64)> {
    let mut pairs = Vec::new();
    for a in 0..n {
        for b in (a + 1)..n {
            pairs.push((a, b));
        }
    }
    pairs
}

/// Simulate a job by hand: route, group, count and sum the real partials
fn manual_job(pairs: &[(i64, i64)], p: u64) -> f64 {
    let partitions = PartitionCount::new(p).unwrap();
    sum(route(&edges(pairs), partitions)
        .into_values()
        .map(|group| count_weighted_triangles(group, p).unwrap()))
}

#[test]
fn test_triangle_with_pendant_p2() {
    let pairs = [(1, 2), (2, 3), (3, 1), (3, 4)];
    let report = run(&pairs, 2);

    assert_eq!(report.triangles, 1);
    assert_eq!(report.weighted_sum, 1.0);
    assert_eq!(report.edges_read, 4);
    assert_eq!(report.self_loops, 0);
    assert_eq!(report.replicated_edges, 4);
    assert_eq!(manual_job(&pairs, 2), 1.0);
}

#[test]
fn test_result_independent_of_partition_count() {
    let pairs = complete(7);
    let expected = brute_force(&pairs);
    assert_eq!(expected, 35);

    for p in [2, 3, 5] {
        let report = run(&pairs, p);
        assert_eq!(report.triangles, expected, "p = {}", p);
        assert_eq!(report.weighted_sum, expected as f64, "p = {}", p);
        assert_eq!(manual_job(&pairs, p), expected as f64, "p = {}", p);
    }
}

#[test]
fn test_triangle_free_graphs() {
    // Empty input, a star and an even cycle
    assert_eq!(run(&[], 3).triangles, 0);
    assert_eq!(run(&[], 3).groups, 0);

    let star: Vec<(i64, i64)> = (1..20).map(|leaf| (0, leaf)).collect();
    assert_eq!(run(&star, 4).triangles, 0);

    let cycle: Vec<(i64, i64)> = (0..10).map(|v| (v, (v + 1) % 10)).collect();
    let report = run(&cycle, 3);
    assert_eq!(report.triangles, 0);
    assert_eq!(report.contributing_groups, 0);
}

#[test]
fn test_matches_brute_force_on_mixed_graph() {
    let mut pairs = complete(5);
    // Wheel around vertex 100 plus a few chords
    for v in 10..18 {
        pairs.push((100, v));
        pairs.push((v, if v == 17 { 10 } else { v + 1 }));
    }
    pairs.extend([(10, 14), (-3, -6), (-6, -9), (-9, -3), (-3, 0)]);

    let expected = brute_force(&pairs);
    assert_eq!(node_iterator_pp(pairs.iter().copied()), expected);
    for p in 2..=6 {
        assert_eq!(run(&pairs, p).triangles, expected, "p = {}", p);
    }
}

#[test]
fn test_duplicates_and_self_loops_do_not_change_count() {
    let clean = [(1, 2), (2, 3), (3, 1)];
    let noisy = [(1, 2), (2, 1), (2, 3), (3, 1), (1, 3), (3, 3), (2, 2)];

    let report = run(&noisy, 3);
    assert_eq!(report.triangles, run(&clean, 3).triangles);
    assert_eq!(report.self_loops, 2);
    assert_eq!(report.edges_read, 7);
}

/// Route edges through the assigner and collect each group's edges
fn route(edges: &[Edge], partitions: PartitionCount) -> BTreeMap<PartitionKey, Vec<Edge>> {
    let mut groups: BTreeMap<PartitionKey, Vec<Edge>> = BTreeMap::new();
    for &edge in edges {
        for key in assign(edge, partitions) {
            groups.entry(key).or_default().push(edge);
        }
    }
    groups
}

#[test]
fn test_per_group_weights() {
    let partitions = PartitionCount::new(3).unwrap();

    // 0, 3, 6 all fall into bucket 0: complete in both pair groups containing 0
    let groups = route(&edges(&[(0, 3), (3, 6), (6, 0)]), partitions);
    assert_eq!(
        groups.keys().copied().collect::<Vec<_>>(),
        vec![PartitionKey::Pair(0, 1), PartitionKey::Pair(0, 2)]
    );
    for (key, group) in &groups {
        let partial = count_group(group.iter().copied(), partitions);
        assert_eq!(partial, WeightedCount { spanning: 0, single_bucket: 1 }, "group {}", key);
        assert!((partial.value(partitions) - 0.5).abs() < 1e-12);
    }

    // 1, 4 in bucket 1 and 2 in bucket 2: complete only in {1, 2}
    let groups = route(&edges(&[(1, 4), (4, 2), (2, 1)]), partitions);
    for (key, group) in &groups {
        let partial = count_group(group.iter().copied(), partitions);
        if *key == PartitionKey::Pair(1, 2) {
            assert_eq!(group.len(), 3);
            assert_eq!(partial, WeightedCount { spanning: 1, single_bucket: 0 });
        } else {
            assert!(partial.is_zero(), "group {}", key);
        }
    }

    // One vertex per bucket: complete only in {0, 1, 2}
    let groups = route(&edges(&[(0, 1), (1, 2), (2, 0)]), partitions);
    for (key, group) in &groups {
        let partial = count_group(group.iter().copied(), partitions);
        if *key == PartitionKey::Triple(0, 1, 2) {
            assert_eq!(partial, WeightedCount { spanning: 1, single_bucket: 0 });
        } else {
            assert!(partial.is_zero(), "group {}", key);
        }
    }

    let report = run(&[(0, 3), (3, 6), (6, 0)], 3);
    assert_eq!(report.triangles, 1);
    assert_eq!(report.contributing_groups, 2);
}

#[test]
fn test_negative_vertex_ids() {
    let pairs = [(-1, -2), (-2, -3), (-3, -1), (-1, 4), (4, -2)];
    let expected = brute_force(&pairs);
    assert_eq!(expected, 2);
    for p in [2, 3, 4] {
        assert_eq!(run(&pairs, p).triangles, expected);
    }
}

#[test]
fn test_invalid_partition_count_is_rejected() {
    assert!(matches!(
        LocalEngine::new(JobConfig::new(0)),
        Err(TriangleError::Configuration(_))
    ));
    assert!(matches!(
        count_weighted_triangles(edges(&[(1, 2)]), 1),
        Err(TriangleError::Configuration(_))
    ));
}

#[test]
fn test_edge_list_file_lenient_and_strict() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.txt");
    let mut file = File::create(&path).unwrap();
    writeln!(file, "# K4 plus junk").unwrap();
    for (a, b) in complete(4) {
        writeln!(file, "{}\t{}", a, b).unwrap();
    }
    writeln!(file, "7 seven").unwrap();
    drop(file);

    let engine = LocalEngine::new(JobConfig::new(3)).unwrap();
    let report = engine.run_reader(open_edge_file(&path).unwrap()).unwrap();
    assert_eq!(report.triangles, 4);
    assert_eq!(report.records_skipped, 1);
    assert_eq!(report.edges_read, 6);

    let mut strict = JobConfig::new(3);
    strict.parse_mode = ParseMode::Strict;
    let engine = LocalEngine::new(strict).unwrap();
    let result = engine.run_reader(open_edge_file(&path).unwrap());
    assert!(matches!(result, Err(TriangleError::MalformedRecord { line: 8, .. })));
}

#[test]
fn test_gzip_edge_list() {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.txt.gz");
    let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::fast());
    for (a, b) in complete(6) {
        writeln!(encoder, "{} {}", a, b).unwrap();
    }
    encoder.finish().unwrap();

    let engine = LocalEngine::new(JobConfig::new(4)).unwrap();
    let report = engine.run_reader(open_edge_file(&path).unwrap()).unwrap();
    assert_eq!(report.triangles, 20);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = open_edge_file(dir.path().join("missing.txt"));
    assert!(matches!(result, Err(TriangleError::Io(_))));
}

#[test]
fn test_config_file_drives_job() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job.yaml");
    std::fs::write(&path, "partitions: 5\nparallel: false\n").unwrap();

    let config = JobConfig::from_yaml_file(&path).unwrap();
    let engine = LocalEngine::new(config).unwrap();
    assert_eq!(engine.partitions().get(), 5);

    let report = engine.run(edges(&complete(5)));
    assert_eq!(report.triangles, 10);
    assert_eq!(report.partitions, 5);
}

#[test]
fn test_report_serializes_to_json() {
    let report = run(&[(1, 2), (2, 3), (3, 1)], 2);
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["triangles"], 1);
    assert_eq!(json["partitions"], 2);
    assert_eq!(json["partials"].as_array().map(|p| p.len()), Some(1));

    let back: JobReport = serde_json::from_value(json).unwrap();
    assert_eq!(back, report);
}
