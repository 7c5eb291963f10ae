// In crates/core-types/src/error.rs

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::types::Freq;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("Invalid symbol '{0}': expected the form {{code}}#{{asset}}")]
    InvalidSymbol(String),

    #[error("Unknown asset class: {0}")]
    UnknownAsset(String),

    #[error("Unknown frequency: {0}")]
    UnknownFreq(String),

    #[error("Invalid signal '{0}': expected 7 '_'-separated fields")]
    InvalidSignal(String),

    #[error("Frequency {0} is not tracked by this trader")]
    UntrackedFreq(Freq),

    #[error("Bar for {got} does not belong to trader symbol {expected}")]
    SymbolMismatch { expected: String, got: String },

    #[error("Out-of-order {freq} bar: {dt} is older than the last bar at {last_dt}")]
    OutOfOrder {
        freq: Freq,
        dt: DateTime<Utc>,
        last_dt: DateTime<Utc>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
