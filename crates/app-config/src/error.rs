// In crates/app-config/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load configuration")]
    LoadError(#[from] config::ConfigError),

    #[error("Invalid symbol in check parameters: {0}")]
    InvalidSymbol(#[from] core_types::Error),

    #[error("Invalid {field} '{value}': expected a YYYYMMDD date")]
    InvalidDate { field: &'static str, value: String },

    #[error("Start date {sdt} must be before end date {edt}")]
    EmptyRange { sdt: String, edt: String },
}

pub type Result<T> = std::result::Result<T, Error>;
