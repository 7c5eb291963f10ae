// In crates/core-types/src/trader.rs

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::types::{Bar, Cross, Freq, Symbol};

/// Per-period MACD state consumed by the second buy/sell point classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdCache {
    /// The trader timestamp this cache was computed for.
    pub update_dt: DateTime<Utc>,
    pub cross: Vec<Cross>,
    pub macd: Vec<f64>,
}

/// Live trading state for one symbol: a bar sequence per tracked period,
/// the per-period MACD cache, and the latest timestamp and price of the
/// base period.
#[derive(Debug, Clone)]
pub struct Trader {
    symbol: Symbol,
    base_freq: Freq,
    kas: BTreeMap<Freq, Vec<Bar>>,
    macd_cache: HashMap<Freq, MacdCache>,
    end_dt: Option<DateTime<Utc>>,
    latest_price: Decimal,
    max_bars: usize,
}

impl Trader {
    /// Creates an empty trader tracking `base_freq` plus every period in `freqs`.
    /// Each sequence keeps at most `max_bars` bars; the oldest are dropped first.
    pub fn new(symbol: Symbol, base_freq: Freq, freqs: &[Freq], max_bars: usize) -> Self {
        let mut kas = BTreeMap::new();
        kas.insert(base_freq, Vec::new());
        for freq in freqs {
            kas.entry(*freq).or_insert_with(Vec::new);
        }

        Self {
            symbol,
            base_freq,
            kas,
            macd_cache: HashMap::new(),
            end_dt: None,
            latest_price: Decimal::ZERO,
            max_bars: max_bars.max(1),
        }
    }

    /// Appends a bar to its period's sequence.
    ///
    /// A bar with the same `dt` as the last one replaces it (an unfinished bar
    /// being revised). Base-period bars advance `end_dt` and `latest_price`.
    pub fn update(&mut self, bar: Bar) -> Result<()> {
        if bar.symbol != self.symbol {
            return Err(Error::SymbolMismatch {
                expected: self.symbol.to_string(),
                got: bar.symbol.to_string(),
            });
        }
        let freq = bar.freq;
        let bars = self.kas.get_mut(&freq).ok_or(Error::UntrackedFreq(freq))?;

        match bars.last().map(|last| last.dt) {
            Some(last_dt) if bar.dt < last_dt => {
                return Err(Error::OutOfOrder {
                    freq,
                    dt: bar.dt,
                    last_dt,
                });
            }
            Some(last_dt) if bar.dt == last_dt => {
                bars.pop();
            }
            _ => {}
        }

        if freq == self.base_freq {
            self.end_dt = Some(bar.dt);
            self.latest_price = bar.close;
        }
        bars.push(bar);

        if bars.len() > self.max_bars {
            let excess = bars.len() - self.max_bars;
            bars.drain(..excess);
        }
        Ok(())
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn base_freq(&self) -> Freq {
        self.base_freq
    }

    pub fn freqs(&self) -> impl Iterator<Item = Freq> + '_ {
        self.kas.keys().copied()
    }

    /// Timestamp of the latest base-period bar, if any bar has been seen.
    pub fn end_dt(&self) -> Option<DateTime<Utc>> {
        self.end_dt
    }

    pub fn latest_price(&self) -> Decimal {
        self.latest_price
    }

    pub fn bars(&self, freq: Freq) -> Result<&[Bar]> {
        self.kas
            .get(&freq)
            .map(Vec::as_slice)
            .ok_or(Error::UntrackedFreq(freq))
    }

    /// Mutable access for indicator refreshers that stamp bar caches.
    pub fn bars_mut(&mut self, freq: Freq) -> Result<&mut [Bar]> {
        self.kas
            .get_mut(&freq)
            .map(Vec::as_mut_slice)
            .ok_or(Error::UntrackedFreq(freq))
    }

    pub fn macd_cache(&self, freq: Freq) -> Option<&MacdCache> {
        self.macd_cache.get(&freq)
    }

    pub fn set_macd_cache(&mut self, freq: Freq, cache: MacdCache) -> Result<()> {
        if !self.kas.contains_key(&freq) {
            return Err(Error::UntrackedFreq(freq));
        }
        self.macd_cache.insert(freq, cache);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BarCache;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn symbol() -> Symbol {
        "000001.SZ#E".parse().unwrap()
    }

    fn bar(freq: Freq, minutes: i64, close: Decimal) -> Bar {
        let start = Utc.with_ymd_and_hms(2022, 1, 4, 9, 30, 0).unwrap();
        Bar {
            symbol: symbol(),
            id: minutes as u64,
            dt: start + Duration::minutes(minutes),
            freq,
            open: close,
            close,
            high: close,
            low: close,
            vol: dec!(100),
            amount: dec!(1000),
            cache: BarCache::default(),
        }
    }

    #[test]
    fn base_bars_advance_time_and_price() {
        let mut trader = Trader::new(symbol(), Freq::F15, &[Freq::F60], 100);
        trader.update(bar(Freq::F15, 15, dec!(10.1))).unwrap();
        trader.update(bar(Freq::F60, 60, dec!(99))).unwrap();

        assert_eq!(trader.latest_price(), dec!(10.1));
        assert_eq!(trader.end_dt(), Some(bar(Freq::F15, 15, dec!(0)).dt));
        assert_eq!(trader.bars(Freq::F60).unwrap().len(), 1);
    }

    #[test]
    fn same_timestamp_replaces_last_bar() {
        let mut trader = Trader::new(symbol(), Freq::F15, &[], 100);
        trader.update(bar(Freq::F15, 15, dec!(10))).unwrap();
        trader.update(bar(Freq::F15, 15, dec!(11))).unwrap();

        let bars = trader.bars(Freq::F15).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, dec!(11));
    }

    #[test]
    fn rejects_out_of_order_bars() {
        let mut trader = Trader::new(symbol(), Freq::F15, &[], 100);
        trader.update(bar(Freq::F15, 30, dec!(10))).unwrap();
        let err = trader.update(bar(Freq::F15, 15, dec!(10))).unwrap_err();
        assert!(matches!(err, Error::OutOfOrder { freq: Freq::F15, .. }));
    }

    #[test]
    fn rejects_untracked_freq_and_foreign_symbol() {
        let mut trader = Trader::new(symbol(), Freq::F15, &[], 100);
        assert_eq!(
            trader.update(bar(Freq::Daily, 15, dec!(10))),
            Err(Error::UntrackedFreq(Freq::Daily))
        );

        let mut foreign = bar(Freq::F15, 15, dec!(10));
        foreign.symbol = "600000.SH#E".parse().unwrap();
        assert!(matches!(
            trader.update(foreign),
            Err(Error::SymbolMismatch { .. })
        ));
    }

    #[test]
    fn caps_history_at_max_bars() {
        let mut trader = Trader::new(symbol(), Freq::F15, &[], 3);
        for i in 0..5 {
            trader.update(bar(Freq::F15, 15 * i, dec!(10))).unwrap();
        }
        let bars = trader.bars(Freq::F15).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].id, 30);
    }
}
