//! Tripart CLI: command-line interface for partitioned triangle counting
//!
//! Runs jobs on the in-process engine of the `tripart` crate.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tripart::{
    all_keys, assign, group_count, node_iterator_pp, open_edge_file, replication_factor, Edge,
    EdgeReader, JobConfig, JobReport, LocalEngine, ParseMode, PartitionCount, PartitionKey,
    TriangleResult, WeightedCount,
};

#[derive(Parser)]
#[command(name = "tripart", version, about = "Exact partitioned triangle counting")]
struct Cli {
    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Count the triangles of an edge-list file (plain or .gz)
    Count {
        /// Edge list: two integers per line
        input: PathBuf,

        /// Number of buckets (overrides the config file)
        #[arg(short, long)]
        partitions: Option<u64>,

        /// YAML job configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Fail on malformed records instead of skipping them
        #[arg(long)]
        strict: bool,

        /// Reduce groups on the calling thread only
        #[arg(long)]
        sequential: bool,

        /// Worker threads for the reduce phase
        #[arg(long)]
        threads: Option<usize>,

        /// Print every partition group's partial result
        #[arg(long)]
        show_groups: bool,

        /// Cross-check the result against a NodeIterator++ count of the same input
        #[arg(long)]
        verify: bool,
    },
    /// Show the groups an edge is replicated into
    Assign {
        u: i64,
        v: i64,

        #[arg(short, long, default_value_t = 3)]
        partitions: u64,
    },
    /// Show the partition groups that exist for a bucket count
    Groups {
        #[arg(short, long, default_value_t = 3)]
        partitions: u64,

        /// Maximum number of group keys to list
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Count {
            input,
            partitions,
            config,
            strict,
            sequential,
            threads,
            show_groups,
            verify,
        } => {
            let config = build_config(config.as_deref(), partitions, strict, sequential, threads);
            config.and_then(|config| run_count(&input, config, show_groups, verify, &cli.format))
        }
        Commands::Assign { u, v, partitions } => run_assign(u, v, partitions, &cli.format),
        Commands::Groups { partitions, limit } => run_groups(partitions, limit, &cli.format),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn build_config(
    path: Option<&Path>,
    partitions: Option<u64>,
    strict: bool,
    sequential: bool,
    threads: Option<usize>,
) -> Result<JobConfig> {
    let mut config = match path {
        Some(path) => JobConfig::from_yaml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => JobConfig::default(),
    };

    if let Some(p) = partitions {
        config.partitions = p;
    }
    if strict {
        config.parse_mode = ParseMode::Strict;
    }
    if sequential {
        config.parallel = false;
    }
    if threads.is_some() {
        config.threads = threads;
    }

    config.validate()?;
    Ok(config)
}

fn run_count(
    input: &Path,
    config: JobConfig,
    show_groups: bool,
    verify: bool,
    format: &OutputFormat,
) -> Result<()> {
    let parse_mode = config.parse_mode;
    let engine = LocalEngine::new(config)?;

    let reader = open_edge_file(input).with_context(|| format!("opening {}", input.display()))?;
    let report = engine.run_reader(reader)?;

    let expected = if verify {
        info!("Verifying against NodeIterator++ count");
        Some(reference_count(input, parse_mode)?)
    } else {
        None
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Csv => print!("{}", report_csv(&report)),
        OutputFormat::Table => print_report(&report, show_groups),
    }

    if let Some(expected) = expected {
        if expected != report.triangles {
            bail!(
                "verification failed: partitioned count {} != NodeIterator++ count {}",
                report.triangles,
                expected
            );
        }
        eprintln!("Verified: NodeIterator++ count is {}", expected);
    }

    Ok(())
}

/// Independent exact count of the same input, through the wedge-join counter
fn reference_count(input: &Path, mode: ParseMode) -> Result<u64> {
    let reader = EdgeReader::new(open_edge_file(input)?, mode);
    let edges = reader.collect::<TriangleResult<Vec<Edge>>>()?;
    Ok(node_iterator_pp(edges.iter().map(Edge::as_pair)))
}

fn print_report(report: &JobReport, show_groups: bool) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Partitions".to_string(), report.partitions.to_string()]);
    table.add_row(vec!["Edges read".to_string(), report.edges_read.to_string()]);
    table.add_row(vec!["Records skipped".to_string(), report.records_skipped.to_string()]);
    table.add_row(vec!["Self-loops".to_string(), report.self_loops.to_string()]);
    table.add_row(vec!["Edge copies".to_string(), report.replicated_edges.to_string()]);
    table.add_row(vec!["Groups".to_string(), report.groups.to_string()]);
    table.add_row(vec![
        "Contributing groups".to_string(),
        report.contributing_groups.to_string(),
    ]);
    table.add_row(vec!["Triangles".to_string(), report.triangles.to_string()]);
    println!("{}", table);

    if show_groups {
        let mut groups = Table::new();
        groups.set_content_arrangement(ContentArrangement::Dynamic);
        groups.set_header(vec!["Group", "Edges", "Spanning", "Single-bucket", "Value"]);
        for outcome in &report.partials {
            groups.add_row(vec![
                outcome.key.to_string(),
                outcome.edges.to_string(),
                outcome.partial.spanning.to_string(),
                outcome.partial.single_bucket.to_string(),
                format!("{:.4}", outcome.value),
            ]);
        }
        println!("{}", groups);
    }
}

fn run_assign(u: i64, v: i64, partitions: u64, format: &OutputFormat) -> Result<()> {
    let partitions = PartitionCount::new(partitions)?;
    let edge = Edge::new(u, v);
    let keys = assign(edge, partitions);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&keys)?);
        }
        OutputFormat::Csv => print!("{}", keys_csv(&keys)),
        OutputFormat::Table => {
            println!(
                "Edge {} (buckets {} and {}) -> {} group(s)",
                edge,
                partitions.bucket(edge.node1),
                partitions.bucket(edge.node2),
                keys.len()
            );
            for key in keys {
                println!("  {{{}}}", key);
            }
        }
    }
    Ok(())
}

fn run_groups(partitions: u64, limit: usize, format: &OutputFormat) -> Result<()> {
    let partitions = PartitionCount::new(partitions)?;
    let groups = group_count(partitions);
    let keys: Vec<PartitionKey> = all_keys(partitions).take(limit).collect();
    let truncated = groups.map_or(true, |n| n > keys.len() as u128);

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "partitions": partitions.get(),
                "groups": groups.and_then(|n| u64::try_from(n).ok()),
                "replication_factor": replication_factor(partitions),
                "truncated": truncated,
                "keys": keys,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Csv => print!("{}", keys_csv(&keys)),
        OutputFormat::Table => {
            let groups = groups.map_or_else(|| "more than 2^128".to_string(), |n| n.to_string());
            println!("Partitions:         {}", partitions.get());
            println!("Groups:             {}", groups);
            println!("Copies per edge:    {}", replication_factor(partitions));
            for key in &keys {
                println!("  {{{}}}", key);
            }
            if truncated {
                println!("  ... (first {} shown, raise --limit for more)", keys.len());
            }
        }
    }
    Ok(())
}

/// One row per group, then a `total` row carrying the global count
fn report_csv(report: &JobReport) -> String {
    let mut out = String::from("group,edges,spanning,single_bucket,value\n");
    for outcome in &report.partials {
        out.push_str(&format!(
            "\"{}\",{},{},{},{}\n",
            outcome.key,
            outcome.edges,
            outcome.partial.spanning,
            outcome.partial.single_bucket,
            outcome.value
        ));
    }
    let tally: WeightedCount = report.partials.iter().map(|o| o.partial).sum();
    out.push_str(&format!(
        "total,{},{},{},{}\n",
        report.replicated_edges, tally.spanning, tally.single_bucket, report.triangles
    ));
    out
}

fn keys_csv(keys: &[PartitionKey]) -> String {
    let mut out = String::from("group,kind\n");
    for key in keys {
        let kind = if key.is_triple() { "triple" } else { "pair" };
        out.push_str(&format!("\"{}\",{}\n", key, kind));
    }
    out
}
