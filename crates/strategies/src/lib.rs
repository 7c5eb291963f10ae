// In crates/strategies/src/lib.rs

use core_types::{Freq, SignalSnapshot, Symbol, Trader};

pub mod error;
pub mod factory;
pub mod indicators;
pub mod macd_bs;
pub mod types;

pub use error::{Error, Result};
pub use factory::{STRATEGY_NAMES, create_strategy, macd_second_bs, trader_strategy};
pub use types::MacdSettings;

/// Evaluates every signal of a strategy against the trader's current state.
///
/// It may refresh indicator caches on the trader before reading them, which
/// is why it takes the trader mutably; it never keeps a handle on it.
pub type GetSignals = fn(&mut Trader, &MacdSettings) -> Result<SignalSnapshot>;

/// The description of a signal strategy for one symbol.
///
/// The harness builds a `Trader` tracking `base_freq` and `freqs`, feeds it
/// bars, and calls [`StrategyDescriptor::evaluate`] after every base-period bar.
#[derive(Debug, Clone)]
pub struct StrategyDescriptor {
    /// The name of the strategy.
    pub name: &'static str,
    pub symbol: Symbol,
    pub base_freq: Freq,
    pub freqs: Vec<Freq>,
    pub get_signals: GetSignals,
    /// Indicator periods used when refreshing the MACD cache.
    pub macd: MacdSettings,
}

impl StrategyDescriptor {
    /// Creates an empty trader tracking every period this strategy needs.
    pub fn new_trader(&self, max_bars: usize) -> Trader {
        Trader::new(self.symbol.clone(), self.base_freq, &self.freqs, max_bars)
    }

    pub fn with_macd(mut self, macd: MacdSettings) -> Self {
        self.macd = macd;
        self
    }

    /// Runs `get_signals` with this strategy's indicator settings.
    pub fn evaluate(&self, trader: &mut Trader) -> Result<SignalSnapshot> {
        (self.get_signals)(trader, &self.macd)
    }
}
