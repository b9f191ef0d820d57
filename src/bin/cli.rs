//! CLI for exercising an in-process ring

use clap::{Parser, Subcommand};
use ringkv::ops::{repair_ring, verify_ring};
use ringkv::{Config, Error, Store, WritePolicy};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ringkv")]
#[command(about = "ringkv consistent-hashing KV store simulator")]
#[command(version)]
struct Cli {
    /// TOML config file (RINGKV_* environment variables also apply)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of nodes (overrides config)
    #[arg(long)]
    nodes: Option<usize>,

    /// Replicas per primary (overrides config)
    #[arg(long)]
    replicas: Option<usize>,

    /// Write policy: one, quorum, all (overrides config)
    #[arg(long)]
    policy: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the ring layout
    Inspect,

    /// Show where a key lives
    Locate {
        /// Key
        key: String,
    },

    /// Write and read back a batch of keys, then verify replicas
    Run {
        /// Distinct keys
        #[arg(long, default_value = "1000")]
        keys: usize,

        /// Times each key is overwritten
        #[arg(long, default_value = "1")]
        rounds: usize,

        /// Repair under-replicated keys afterwards
        #[arg(long)]
        repair: bool,
    },
}

#[derive(Serialize)]
struct NodeView {
    name: String,
    clock_index: usize,
    digest: String,
    records: usize,
    replicas: Vec<String>,
}

#[derive(Serialize)]
struct RunReport {
    puts: usize,
    reads_ok: usize,
    reads_missing: usize,
    reads_conflicted: usize,
    put_ms: u128,
    get_ms: u128,
}

fn emit<T: Serialize + std::fmt::Debug>(json: bool, label: &str, value: &T) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}: {:#?}", label, value);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(nodes) = cli.nodes {
        config.node_count = nodes;
    }
    if let Some(replicas) = cli.replicas {
        config.replica_count = replicas;
    }
    if let Some(policy) = &cli.policy {
        config.write_policy = policy.parse::<WritePolicy>()?;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let store = Store::from_config(&config)?;
    tracing::info!(
        nodes = store.ring().node_count(),
        replicas = store.ring().replica_count(),
        policy = %store.policy(),
        "Store ready"
    );

    match cli.command {
        Commands::Inspect => {
            let ring = store.ring();
            let mut views = Vec::with_capacity(ring.node_count());
            for node in ring.nodes() {
                let replicas = ring
                    .replica_set(node)?
                    .iter()
                    .skip(1)
                    .map(|n| n.name().to_string())
                    .collect();
                views.push(NodeView {
                    name: node.name().to_string(),
                    clock_index: node.clock_index(),
                    digest: node.digest().to_string(),
                    records: node.len(),
                    replicas,
                });
            }
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&views)?);
            } else {
                println!("Ring ({} nodes, {}):", ring.node_count(), ring.algorithm());
                for view in &views {
                    println!(
                        "  {:<8} slot {:<3} {}…  replicas: {}",
                        view.name,
                        view.clock_index,
                        &view.digest[..16],
                        view.replicas.join(", ")
                    );
                }
            }
        }

        Commands::Locate { key } => {
            let digest = store.ring().digest(key.as_bytes());
            let set = store.ring().preference_list(&digest)?;
            let names: Vec<&str> = set.iter().map(|n| n.name()).collect();
            if cli.json {
                let view = serde_json::json!({
                    "key": key,
                    "digest": digest.to_string(),
                    "primary": names[0],
                    "replica_set": names,
                });
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                println!("Key: {}", key);
                println!("  Digest: {}", digest);
                println!("  Primary: {}", names[0]);
                println!("  Replica set: {}", names.join(", "));
            }
        }

        Commands::Run {
            keys,
            rounds,
            repair,
        } => {
            let start = Instant::now();
            let mut puts = 0;
            for round in 0..rounds.max(1) {
                for i in 0..keys {
                    store.put(&format!("key:{}", i), &format!("value:{}:{}", i, round))?;
                    puts += 1;
                }
            }
            let put_ms = start.elapsed().as_millis();

            let start = Instant::now();
            let mut report = RunReport {
                puts,
                reads_ok: 0,
                reads_missing: 0,
                reads_conflicted: 0,
                put_ms,
                get_ms: 0,
            };
            for i in 0..keys {
                match store.get(&format!("key:{}", i)) {
                    Ok(_) => report.reads_ok += 1,
                    Err(e) if e.is_miss() => report.reads_missing += 1,
                    Err(Error::AmbiguousResolution { .. }) => report.reads_conflicted += 1,
                    Err(e) => return Err(e.into()),
                }
            }
            report.get_ms = start.elapsed().as_millis();

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Run report:");
                println!("  Puts: {} in {} ms", report.puts, report.put_ms);
                println!("  Reads ok: {} in {} ms", report.reads_ok, report.get_ms);
                println!("  Missing: {}", report.reads_missing);
                println!("  Conflicted: {}", report.reads_conflicted);
            }

            emit(cli.json, "Verification report", &verify_ring(&store)?)?;
            if repair {
                emit(cli.json, "Repair report", &repair_ring(&store, false)?)?;
                emit(cli.json, "Verification after repair", &verify_ring(&store)?)?;
            }
        }
    }

    Ok(())
}
