//! `ringctl` — inspect a consistent hashing ring from the command line.
//!
//! # Usage
//!
//! ```text
//! ringctl -c ring.toml resolve user:42 user:43   # which node owns each key
//! ringctl --node a --node b nodes                # members in ring order
//! ringctl -c ring.toml distribution -n 100000    # keys per node
//! ringctl -c ring.toml rebalance --add d -n 1000 # keys that would move
//! ```

mod config;

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ringmap_placement::{Ring, RingView};
use tracing::{debug, info};

use config::{CliConfig, HashKind};

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "ringctl",
    version,
    about = "Resolve keys against a consistent hashing ring"
)]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Node on the ring. Replaces the config node list; repeatable.
    #[arg(long, global = true)]
    node: Vec<String>,

    /// Hash algorithm for node and key positions.
    #[arg(long, global = true, value_enum)]
    hash: Option<HashKind>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the node that owns each key.
    Resolve {
        /// Keys to resolve.
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// List ring members with their positions.
    Nodes,

    /// Resolve synthetic keys and count how many land on each node.
    Distribution {
        /// Number of keys to resolve.
        #[arg(short = 'n', long, default_value = "10000")]
        count: usize,
    },

    /// Show which synthetic keys move after a membership change.
    Rebalance {
        /// Node to add; repeatable.
        #[arg(long)]
        add: Vec<String>,

        /// Node to remove; repeatable.
        #[arg(long)]
        remove: Vec<String>,

        /// Number of keys to check.
        #[arg(short = 'n', long, default_value = "10000")]
        count: usize,
    },
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;

    setup_tracing(&config.log.level);

    // CLI args override config file values.
    if !cli.node.is_empty() {
        config.ring.nodes = cli.node;
    }
    if let Some(hash) = cli.hash {
        config.ring.hash = hash;
    }
    config.validate()?;

    let ring = config.build_ring();
    info!(nodes = ring.len(), hash = ?config.ring.hash, "ring built");

    match cli.command {
        Commands::Resolve { keys } => cmd_resolve(&ring, &keys),
        Commands::Nodes => cmd_nodes(&ring),
        Commands::Distribution { count } => cmd_distribution(&ring, count),
        Commands::Rebalance { add, remove, count } => cmd_rebalance(&ring, &add, &remove, count),
    }
}

/// Initialize the `tracing` subscriber with the given level filter.
///
/// Respects `RUST_LOG` env var if set, otherwise uses the config value.
/// Logs go to stderr so command output stays pipeable.
fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Deterministic key names used by `distribution` and `rebalance`.
fn synthetic_keys(count: usize) -> impl Iterator<Item = String> {
    (0..count).map(|i| format!("key-{i}"))
}

// -----------------------------------------------------------------------
// ringctl resolve
// -----------------------------------------------------------------------

fn cmd_resolve(ring: &Ring<HashKind>, keys: &[String]) -> Result<()> {
    for key in keys {
        let owner = ring.get(key)?;
        debug!(%key, position = ring.hash_key(key), %owner, "resolved key");
        println!("{key} -> {owner}");
    }
    Ok(())
}

// -----------------------------------------------------------------------
// ringctl nodes
// -----------------------------------------------------------------------

fn cmd_nodes(ring: &Ring<HashKind>) -> Result<()> {
    let nodes = ring.nodes();
    println!("Ring members: {}", nodes.len());
    for node in &nodes {
        println!("  {:#010x}  {}", node.position, node.id);
    }
    Ok(())
}

// -----------------------------------------------------------------------
// ringctl distribution
// -----------------------------------------------------------------------

fn cmd_distribution(ring: &Ring<HashKind>, count: usize) -> Result<()> {
    let counts = distribution(ring, count)?;

    println!("Keys: {count}");
    for (node, n) in &counts {
        let share = *n as f64 * 100.0 / count.max(1) as f64;
        println!("  {node}: {n} ({share:.1}%)");
    }
    Ok(())
}

/// Count how many of `count` synthetic keys each node owns.
///
/// Every member appears in the result, including nodes that own no key.
fn distribution(ring: &Ring<HashKind>, count: usize) -> Result<BTreeMap<String, usize>> {
    let mut counts: BTreeMap<String, usize> =
        ring.nodes().into_iter().map(|n| (n.id, 0)).collect();
    for key in synthetic_keys(count) {
        *counts.entry(ring.get(&key)?).or_default() += 1;
    }
    Ok(counts)
}

// -----------------------------------------------------------------------
// ringctl rebalance
// -----------------------------------------------------------------------

fn cmd_rebalance(
    ring: &Ring<HashKind>,
    add: &[String],
    remove: &[String],
    count: usize,
) -> Result<()> {
    let moves = rebalance(ring, add, remove, count)?;

    let moved: usize = moves.values().sum();
    let share = moved as f64 * 100.0 / count.max(1) as f64;
    println!("Keys moved: {moved} of {count} ({share:.1}%)");
    for ((from, to), n) in &moves {
        println!("  {from} -> {to}: {n}");
    }
    Ok(())
}

/// Apply a membership change and tally moved keys by `(from, to)`.
fn rebalance(
    ring: &Ring<HashKind>,
    add: &[String],
    remove: &[String],
    count: usize,
) -> Result<BTreeMap<(String, String), usize>> {
    let before = ring.view();
    for id in remove {
        ring.remove_node(id)
            .with_context(|| format!("cannot remove {id}"))?;
    }
    for id in add {
        ring.add_node(id.as_str());
    }
    let after = ring.view();

    let mut moves = BTreeMap::new();
    for m in RingView::diff(&before, &after, synthetic_keys(count)) {
        *moves.entry((m.from, m.to)).or_default() += 1;
    }
    Ok(moves)
}
