//! Error types for the aggregation pipeline

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Aggregation errors. Every variant is fatal for the run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read {length} bytes at offset {offset}: {source}")]
    Read {
        offset: u64,
        length: u64,
        #[source]
        source: io::Error,
    },

    #[error("malformed record at byte {offset}: missing ';' separator in {line:?}")]
    MissingSeparator { offset: u64, line: String },

    #[error("malformed record at byte {offset}: more than one ';' separator in {line:?}")]
    ExtraSeparator { offset: u64, line: String },

    #[error("malformed record at byte {offset}: invalid value {value:?} in {line:?}")]
    InvalidValue {
        offset: u64,
        value: String,
        line: String,
    },

    #[error("cannot build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("cannot spawn merger thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("merger thread panicked")]
    MergerPanicked,

    #[error("cannot write report: {0}")]
    Output(#[source] io::Error),
}

/// Result type for aggregation operations
pub type Result<T> = std::result::Result<T, Error>;
