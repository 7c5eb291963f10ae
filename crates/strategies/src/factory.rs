// In crates/strategies/src/factory.rs

use anyhow::Result;
use core_types::{Freq, SignalSnapshot, Symbol, Trader};

use crate::error::Error;
use crate::indicators::update_macd_cache;
use crate::macd_bs::{macd_bs2_v2, tas_macd_first_bs_v221216};
use crate::types::MacdSettings;
use crate::StrategyDescriptor;

const BASE_FREQ: Freq = Freq::F15;
const EXTRA_FREQS: [Freq; 2] = [Freq::F60, Freq::Daily];

/// Every strategy name `create_strategy` understands.
pub const STRATEGY_NAMES: [&str; 2] = ["macd_first_bs", "macd_second_bs"];

/// Starts a snapshot with the trader's identity fields.
fn snapshot_for(trader: &Trader) -> crate::Result<SignalSnapshot> {
    let end_dt = trader
        .end_dt()
        .ok_or_else(|| Error::NotStarted(trader.base_freq()))?;
    Ok(SignalSnapshot::new(
        trader.symbol().clone(),
        end_dt,
        trader.latest_price(),
    ))
}

fn first_bs_signals(trader: &mut Trader, macd: &MacdSettings) -> crate::Result<SignalSnapshot> {
    let mut snapshot = snapshot_for(trader)?;
    update_macd_cache(trader, BASE_FREQ, macd)?;
    snapshot.push(tas_macd_first_bs_v221216(BASE_FREQ, trader.bars(BASE_FREQ)?, 1)?);
    Ok(snapshot)
}

fn second_bs_signals(trader: &mut Trader, macd: &MacdSettings) -> crate::Result<SignalSnapshot> {
    let mut snapshot = snapshot_for(trader)?;
    update_macd_cache(trader, BASE_FREQ, macd)?;
    snapshot.push(macd_bs2_v2(trader, BASE_FREQ)?);
    Ok(snapshot)
}

/// The first buy/sell point strategy on 15-minute bars, also tracking the
/// 60-minute and daily periods.
pub fn trader_strategy(symbol: Symbol) -> StrategyDescriptor {
    StrategyDescriptor {
        name: "macd_first_bs",
        symbol,
        base_freq: BASE_FREQ,
        freqs: EXTRA_FREQS.to_vec(),
        get_signals: first_bs_signals,
        macd: MacdSettings::default(),
    }
}

/// The second buy/sell point strategy, read from the 15-minute MACD cache.
pub fn macd_second_bs(symbol: Symbol) -> StrategyDescriptor {
    StrategyDescriptor {
        name: "macd_second_bs",
        symbol,
        base_freq: BASE_FREQ,
        freqs: EXTRA_FREQS.to_vec(),
        get_signals: second_bs_signals,
        macd: MacdSettings::default(),
    }
}

/// Resolves a strategy by its configured name.
pub fn create_strategy(name: &str, symbol: Symbol) -> Result<StrategyDescriptor> {
    let descriptor = match name {
        "macd_first_bs" => trader_strategy(symbol),
        "macd_second_bs" => macd_second_bs(symbol),
        unknown => anyhow::bail!(
            "Attempted to create unknown strategy: {} (available: {:?})",
            unknown,
            STRATEGY_NAMES
        ),
    };
    Ok(descriptor)
}
