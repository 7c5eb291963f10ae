// In crates/strategies/src/indicators.rs

use core_types::{Cross, CrossKind, Freq, MacdCache, MacdValues, Trader};
use num_traits::cast::ToPrimitive;
use ta::Next;
use ta::indicators::MovingAverageConvergenceDivergence as Macd;

use crate::error::{Error, Result};
use crate::types::MacdSettings;

/// Returns the trailing window of at most `n` elements that ends `di - 1`
/// elements before the end of `elements`. `di == 1` means "up to the latest".
pub fn get_sub_elements<T>(elements: &[T], di: usize, n: usize) -> Result<&[T]> {
    if di == 0 {
        return Err(Error::InvalidOffset(di));
    }
    let end = elements.len().saturating_sub(di - 1);
    let start = end.saturating_sub(n);
    Ok(&elements[start..end])
}

/// Detects every crossing between a fast and a slow line.
///
/// A golden cross is recorded when `fast - slow` goes from `<= 0` to `> 0`,
/// a dead cross when it goes from `>= 0` to `< 0`.
pub fn fast_slow_cross(fast: &[f64], slow: &[f64]) -> Result<Vec<Cross>> {
    if fast.len() != slow.len() {
        return Err(Error::LengthMismatch {
            fast: fast.len(),
            slow: slow.len(),
        });
    }

    let len = fast.len();
    let mut crosses = Vec::new();
    let mut area = 0.0;
    let mut since_last = 0;

    for i in 0..len {
        let delta = fast[i] - slow[i];
        area += delta;
        since_last += 1;
        if i == 0 {
            continue;
        }

        let prev_delta = fast[i - 1] - slow[i - 1];
        let kind = if prev_delta <= 0.0 && delta > 0.0 {
            CrossKind::Golden
        } else if prev_delta >= 0.0 && delta < 0.0 {
            CrossKind::Dead
        } else {
            continue;
        };

        crosses.push(Cross {
            position: i,
            kind,
            fast: fast[i],
            slow: slow[i],
            distance: since_last,
            bars_ago: len - i,
            area,
            spread: delta,
        });
        area = 0.0;
        since_last = 0;
    }

    Ok(crosses)
}

/// Recomputes MACD over every bar of `freq`, stamps the values onto each
/// bar's cache, and stores the period's cross/histogram cache on the trader,
/// marked fresh for the trader's current timestamp.
pub fn update_macd_cache(trader: &mut Trader, freq: Freq, settings: &MacdSettings) -> Result<()> {
    let end_dt = trader
        .end_dt()
        .ok_or_else(|| Error::NotStarted(trader.base_freq()))?;
    let mut indicator = Macd::new(
        settings.fast_period,
        settings.slow_period,
        settings.signal_period,
    )
    .map_err(|e| Error::InvalidParameters(format!("{e:?}")))?;

    let bars = trader.bars_mut(freq)?;
    let mut dif = Vec::with_capacity(bars.len());
    let mut dea = Vec::with_capacity(bars.len());
    let mut macd = Vec::with_capacity(bars.len());

    for bar in bars.iter_mut() {
        let output = indicator.next(bar.close.to_f64().unwrap_or(0.0));
        let values = MacdValues {
            dif: output.macd,
            dea: output.signal,
            macd: output.histogram * 2.0,
        };
        bar.cache.macd = Some(values);
        dif.push(values.dif);
        dea.push(values.dea);
        macd.push(values.macd);
    }

    let cross = fast_slow_cross(&dif, &dea)?;
    tracing::debug!(%freq, bars = macd.len(), crosses = cross.len(), %end_dt, "MACD cache refreshed.");
    trader.set_macd_cache(
        freq,
        MacdCache {
            update_dt: end_dt,
            cross,
            macd,
        },
    )?;
    Ok(())
}
