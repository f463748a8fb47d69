use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::thread;

use crate::numeric::Numeric;
use crate::planner::DEFAULT_CHUNK_SIZE;
use crate::source::IoMode;
use crate::worker::KeyPolicy;

pub const DEFAULT_INPUT: &str = "measurements.txt";

/// Settings for one run. Every value holds for the whole file.
#[derive(Clone, Debug)]
pub struct Config {
    pub input: PathBuf,
    /// Maximum chunk workers in flight.
    pub workers: NonZeroUsize,
    /// Target chunk size in bytes; chunks extend to the next record boundary.
    pub chunk_size: u64,
    pub numeric: Numeric,
    pub keys: KeyPolicy,
    pub io: IoMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            workers: default_workers(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            numeric: Numeric::default(),
            keys: KeyPolicy::default(),
            io: IoMode::default(),
        }
    }
}

/// Number of available processing units, or 1 if it cannot be determined.
pub fn default_workers() -> NonZeroUsize {
    thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}
