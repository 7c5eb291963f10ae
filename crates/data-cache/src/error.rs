// In crates/data-cache/src/error.rs

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Data cache I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed bar at {path}:{line}: {source}")]
    Malformed {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode bar: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Bar for {got} cannot be stored under {expected}")]
    Mismatch { expected: String, got: String },
}

pub type Result<T> = std::result::Result<T, Error>;
