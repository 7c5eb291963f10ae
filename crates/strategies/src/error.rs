// In crates/strategies/src/error.rs

use chrono::{DateTime, Utc};
use core_types::Freq;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("MACD cache for {freq} is missing; refresh it before evaluating signals")]
    MissingMacdCache { freq: Freq },

    #[error("MACD cache for {freq} is stale: computed at {cache_dt}, trader is at {end_dt:?}")]
    StaleMacdCache {
        freq: Freq,
        cache_dt: DateTime<Utc>,
        end_dt: Option<DateTime<Utc>>,
    },

    #[error("Fast and slow sequences differ in length: {fast} vs {slow}")]
    LengthMismatch { fast: usize, slow: usize },

    #[error("Bar offset must be at least 1, got {0}")]
    InvalidOffset(usize),

    #[error("Trader has not received any {0} bar yet")]
    NotStarted(Freq),

    #[error("Invalid indicator parameters: {0}")]
    InvalidParameters(String),

    #[error(transparent)]
    Core(#[from] core_types::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
