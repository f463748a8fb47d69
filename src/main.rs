use std::io::{self, BufWriter};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use brc_chunked::config::{default_workers, DEFAULT_INPUT};
use brc_chunked::planner::DEFAULT_CHUNK_SIZE;
use brc_chunked::{Config, IoMode, KeyPolicy, Numeric};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Per-key min/max/average over a `<key>;<value>` measurements file.
#[derive(Debug, Parser)]
#[command(name = "brc", version, about)]
struct Args {
    /// Input file, one `key;value` record per line
    #[arg(default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Maximum chunk workers in flight [default: available CPUs]
    #[arg(short, long)]
    workers: Option<NonZeroUsize>,

    /// Target chunk size in bytes
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: u64,

    /// Value parsing strategy
    #[arg(long, value_enum, default_value_t = Numeric::Float)]
    numeric: Numeric,

    /// Key whitespace policy
    #[arg(long, value_enum, default_value_t = KeyPolicy::Verbatim)]
    keys: KeyPolicy,

    /// How chunks are read from the file
    #[arg(long, value_enum, default_value_t = IoMode::Mmap)]
    io: IoMode,
}

impl Args {
    fn into_config(self) -> Config {
        Config {
            input: self.input,
            workers: self.workers.unwrap_or_else(default_workers),
            chunk_size: self.chunk_size,
            numeric: self.numeric,
            keys: self.keys,
            io: self.io,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = Args::parse().into_config();
    info!(
        input = %config.input.display(),
        workers = config.workers.get(),
        chunk_size = config.chunk_size,
        "starting aggregation"
    );

    let started = Instant::now();
    let out = BufWriter::new(io::stdout().lock());
    let stats = brc_chunked::run(&config, out)
        .with_context(|| format!("failed to aggregate {}", config.input.display()))?;

    info!(
        chunks = stats.chunks,
        keys = stats.keys,
        records = stats.records,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "aggregation finished"
    );
    Ok(())
}
