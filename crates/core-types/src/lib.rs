// In crates/core-types/src/lib.rs

pub mod error;
pub mod signal;
pub mod trader;
pub mod types;

// Re-export the most important types for easy access from other crates.
pub use error::{Error, Result};
pub use signal::{ANY, Signal, SignalSnapshot};
pub use trader::{MacdCache, Trader};
pub use types::{Asset, Bar, BarCache, Cross, CrossKind, Freq, MacdValues, Symbol};
