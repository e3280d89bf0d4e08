//! gridtable Cache Tool
//!
//! Inspect and maintain a durable cache directory.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use gridtable::cache::{Cache, DurableBackend, Namespace, DEFAULT_TTL};
use gridtable::{CacheRegistry, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// gridtable durable cache tool
#[derive(Parser, Debug)]
#[command(name = "gridtable-cache")]
#[command(about = "Inspect and maintain gridtable durable caches")]
#[command(version)]
struct Args {
    /// Cache directory
    #[arg(short, long, default_value = "./gridtable_cache")]
    dir: PathBuf,

    /// TTL in seconds used to judge freshness
    #[arg(short, long, default_value_t = DEFAULT_TTL.as_secs())]
    ttl_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List namespaces, or the keys of one namespace
    List {
        /// Namespace to list
        namespace: Option<String>,
    },

    /// Print the entry stored under a key
    Show {
        namespace: String,
        key: String,
    },

    /// Remove one key
    Evict {
        namespace: String,
        key: String,
    },

    /// Remove every key of a namespace
    Clear {
        namespace: String,
    },

    /// Remove the whole cache directory
    Purge,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,gridtable=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::debug!("gridtable-cache v{}", gridtable::VERSION);

    if let Err(e) = run(&args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let registry = CacheRegistry::new();
    let ttl = Duration::from_secs(args.ttl_secs);
    let open = |namespace: &str| -> Result<Cache> {
        let namespace = Namespace::new(namespace)?;
        registry.durable(&args.dir, namespace, ttl)
    };

    match &args.command {
        Commands::List { namespace: None } => {
            for namespace in DurableBackend::namespaces_in(&args.dir)? {
                println!("{}", namespace);
            }
        }
        Commands::List {
            namespace: Some(namespace),
        } => {
            let cache = open(namespace.as_str())?;
            for (key, entry) in cache.entries() {
                let state = if cache.is_fresh(&entry) { "fresh" } else { "stale" };
                println!("{}\t{}\t{}", key, entry.last_update, state);
            }
        }
        Commands::Show { namespace, key } => {
            let cache = open(namespace.as_str())?;
            match cache.entries().remove(key) {
                Some(entry) => {
                    let state = if cache.is_fresh(&entry) { "fresh" } else { "stale" };
                    println!("# lastUpdate={} ({})", entry.last_update, state);
                    println!("{}", serde_json::to_string_pretty(&entry.data)?);
                }
                None => println!("(not found)"),
            }
        }
        Commands::Evict { namespace, key } => {
            open(namespace.as_str())?.delete(key)?;
            tracing::info!(namespace = %namespace, key = %key, "evicted");
        }
        Commands::Clear { namespace } => {
            open(namespace.as_str())?.clear()?;
            tracing::info!(namespace = %namespace, "cleared");
        }
        Commands::Purge => {
            CacheRegistry::purge_durable(&args.dir)?;
        }
    }
    Ok(())
}
