//! Chunked parallel aggregation of `<key>;<value>` measurement files.
//!
//! The input is split into record-aligned chunks without a pre-scan, each
//! chunk is folded into a private per-key map by a bounded set of workers,
//! and a single merger combines the maps into the final per-key
//! min/max/average table.
//!
//! ```no_run
//! use brc_chunked::{run, Config};
//!
//! let config = Config::default();
//! let stats = run(&config, std::io::stdout().lock())?;
//! eprintln!("{} keys from {} chunks", stats.keys, stats.chunks);
//! # Ok::<(), brc_chunked::Error>(())
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod gate;
pub mod merger;
pub mod numeric;
pub mod pipeline;
pub mod planner;
pub mod report;
pub mod source;
pub mod table;
pub mod worker;

use std::io::Write;

pub use aggregate::{Aggregate, Measure, Summary};
pub use config::Config;
pub use error::{Error, Result};
pub use numeric::{FixedPolicy, FloatPolicy, Numeric, NumericPolicy, Tenths};
pub use planner::{Chunk, ChunkPlanner};
pub use source::{ByteSource, FileSource, IoMode, MmapSource};
pub use table::GlobalTable;
pub use worker::KeyPolicy;

/// Counters for a completed run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunStats {
    pub chunks: usize,
    pub keys: usize,
    pub records: u64,
}

/// Aggregates `config.input` and writes the sorted report to `out`.
///
/// Nothing is written unless the whole file aggregated successfully.
pub fn run<W: Write>(config: &Config, out: W) -> Result<RunStats> {
    match config.io {
        IoMode::Mmap => run_on(&MmapSource::open(&config.input)?, config, out),
        IoMode::Pread => run_on(&FileSource::open(&config.input)?, config, out),
    }
}

fn run_on<S, W>(source: &S, config: &Config, out: W) -> Result<RunStats>
where
    S: ByteSource + ?Sized,
    W: Write,
{
    match config.numeric {
        Numeric::Float => report_with::<FloatPolicy, _, _>(source, config, out),
        Numeric::Fixed => report_with::<FixedPolicy, _, _>(source, config, out),
    }
}

fn report_with<P, S, W>(source: &S, config: &Config, out: W) -> Result<RunStats>
where
    P: NumericPolicy,
    S: ByteSource + ?Sized,
    W: Write,
{
    let table = pipeline::aggregate::<P, S>(source, config)?;
    report::write_report(&table, out).map_err(Error::Output)?;
    Ok(RunStats {
        chunks: table.chunks(),
        keys: table.len(),
        records: table.records(),
    })
}
