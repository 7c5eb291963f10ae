// In crates/strategies/src/macd_bs.rs

//! MACD golden/dead cross classifiers for first and second buy/sell points.

use core_types::{ANY, Bar, Cross, CrossKind, Freq, MacdValues, Signal, Trader};
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::indicators::{fast_slow_cross, get_sub_elements};
use crate::types::BsPoint;

/// Trailing bars taken before trimming.
const WINDOW_SIZE: usize = 350;
/// Oldest bars of the window discarded as indicator warm-up.
const WARMUP_BARS: usize = 50;
/// Minimum bars left after trimming.
const MIN_BARS: usize = 100;
const NEAR_BARS: usize = 10;
/// Crosses this close to the previous one are treated as noise.
const MIN_CROSS_DISTANCE: usize = 5;

/// The `n`-th element counted from the end (`n == 1` is the last one).
fn nth_back<T>(items: &[T], n: usize) -> Option<&T> {
    items.len().checked_sub(n).map(|i| &items[i])
}

fn slow_below_zero(crosses: &[&Cross], n: usize) -> bool {
    nth_back(crosses, n).is_some_and(|c| c.slow < 0.0)
}

fn slow_above_zero(crosses: &[&Cross], n: usize) -> bool {
    nth_back(crosses, n).is_some_and(|c| c.slow > 0.0)
}

fn momentum_rising(macd: &[f64]) -> bool {
    macd.len() > 10 && macd[macd.len() - 1] > macd[macd.len() - 2]
}

fn momentum_falling(macd: &[f64]) -> bool {
    macd.len() > 10 && macd[macd.len() - 1] < macd[macd.len() - 2]
}

/// Second buy/sell point from the period's MACD cache.
///
/// Second buy: the latest cross is a dead cross above the zero axis, the two
/// dead crosses before it were below the axis, and the histogram is rising.
/// Second sell mirrors it with golden crosses and a falling histogram.
///
/// The cache must have been refreshed for the trader's current timestamp;
/// a missing or stale cache is an ordering bug upstream and is returned as an
/// error rather than classified.
pub fn macd_bs2_v2(trader: &Trader, freq: Freq) -> Result<Signal> {
    let cache = trader
        .macd_cache(freq)
        .ok_or(Error::MissingMacdCache { freq })?;
    if trader.end_dt() != Some(cache.update_dt) {
        return Err(Error::StaleMacdCache {
            freq,
            cache_dt: cache.update_dt,
            end_dt: trader.end_dt(),
        });
    }

    let cross = &cache.cross;
    let macd = &cache.macd;
    let up: Vec<&Cross> = cross.iter().filter(|c| c.kind == CrossKind::Golden).collect();
    let dn: Vec<&Cross> = cross.iter().filter(|c| c.kind == CrossKind::Dead).collect();
    let last = cross.last();

    let mut v1 = BsPoint::Other;

    let b2_con1 = cross.len() > 3
        && last.is_some_and(|c| c.kind == CrossKind::Dead && c.slow > 0.0);
    let b2_con2 = dn.len() > 3 && slow_below_zero(&dn, 3) && slow_below_zero(&dn, 2);
    let b2_con3 = momentum_rising(macd);
    if b2_con1 && b2_con2 && b2_con3 {
        v1 = BsPoint::SecondBuy;
    }

    let s2_con1 = cross.len() > 3
        && last.is_some_and(|c| c.kind == CrossKind::Golden && c.slow < 0.0);
    let s2_con2 = up.len() > 3 && slow_above_zero(&up, 3) && slow_above_zero(&up, 2);
    let s2_con3 = momentum_falling(macd);
    if s2_con1 && s2_con2 && s2_con3 {
        v1 = BsPoint::SecondSell;
    }

    Ok(Signal::new(freq, "MACD", "BS2V2", v1.as_str()))
}

/// Highest high and lowest low of a non-empty bar slice.
fn extremes(bars: &[Bar]) -> Option<(Decimal, Decimal)> {
    let first = bars.first()?;
    Some(bars.iter().fold((first.high, first.low), |(high, low), bar| {
        (high.max(bar.high), low.min(bar.low))
    }))
}

/// First buy/sell point from the MACD values stamped on the `di`-th most
/// recent bars.
///
/// Takes up to 350 trailing bars, drops the oldest 50 and needs at least 100
/// left; otherwise the result is `other` / `any`. The newest 10 bars must
/// make a new low (buy) or high (sell) against the 90 before them, with the
/// cross history confirming and the histogram turning.
///
/// `v2` carries the kind of the latest MACD cross.
pub fn tas_macd_first_bs_v221216(freq: Freq, bars: &[Bar], di: usize) -> Result<Signal> {
    let signal = |v1: BsPoint, v2: &str| {
        Signal::new(freq, format!("D{di}MACD"), "BS1A", v1.as_str()).with_v2(v2)
    };

    let window = get_sub_elements(bars, di, WINDOW_SIZE)?;
    let window = window.get(WARMUP_BARS..).unwrap_or_default();
    if window.len() < MIN_BARS {
        return Ok(signal(BsPoint::Other, ANY));
    }

    let Some(values) = window
        .iter()
        .map(|bar| bar.cache.macd)
        .collect::<Option<Vec<MacdValues>>>()
    else {
        tracing::warn!(%freq, "Bars carry no MACD values; refresh the MACD cache first.");
        return Ok(signal(BsPoint::Other, ANY));
    };
    let dif: Vec<f64> = values.iter().map(|v| v.dif).collect();
    let dea: Vec<f64> = values.iter().map(|v| v.dea).collect();
    let macd: Vec<f64> = values.iter().map(|v| v.macd).collect();

    let len = window.len();
    let n_bars = &window[len - NEAR_BARS..];
    let m_bars = &window[len - MIN_BARS..len - NEAR_BARS];
    let (Some((high_n, low_n)), Some((high_m, low_m))) = (extremes(n_bars), extremes(m_bars))
    else {
        return Ok(signal(BsPoint::Other, ANY));
    };

    let cross = fast_slow_cross(&dif, &dea)?;
    let up: Vec<&Cross> = cross
        .iter()
        .filter(|c| c.kind == CrossKind::Golden && c.distance > MIN_CROSS_DISTANCE)
        .collect();
    let dn: Vec<&Cross> = cross
        .iter()
        .filter(|c| c.kind == CrossKind::Dead && c.distance > MIN_CROSS_DISTANCE)
        .collect();
    let last = cross.last();

    let mut v1 = BsPoint::Other;

    let b1_con1a = cross.len() > 3
        && last.is_some_and(|c| c.kind == CrossKind::Dead && c.slow < 0.0);
    let b1_con1b = cross.len() > 3
        && last.is_some_and(|c| c.kind == CrossKind::Golden)
        && slow_below_zero(&dn, 1);
    let b1_con2 = dn.len() > 3 && slow_below_zero(&dn, 2) && slow_below_zero(&dn, 3);
    let b1_con3 = momentum_rising(&macd);
    if low_n < low_m && (b1_con1a || b1_con1b) && b1_con2 && b1_con3 {
        v1 = BsPoint::FirstBuy;
    }

    let s1_con1a = cross.len() > 3
        && last.is_some_and(|c| c.kind == CrossKind::Golden && c.slow > 0.0);
    let s1_con1b = cross.len() > 3
        && last.is_some_and(|c| c.kind == CrossKind::Dead)
        && slow_above_zero(&up, 1);
    let s1_con2 = up.len() > 3 && slow_above_zero(&up, 2) && slow_above_zero(&up, 3);
    let s1_con3 = momentum_falling(&macd);
    if high_n > high_m && (s1_con1a || s1_con1b) && s1_con2 && s1_con3 {
        v1 = BsPoint::FirstSell;
    }

    let v2 = last.map_or(ANY, |c| c.kind.as_str());
    Ok(signal(v1, v2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use core_types::{BarCache, MacdCache, Symbol};
    use rust_decimal_macros::dec;

    fn symbol() -> Symbol {
        "000001.SZ#E".parse().unwrap()
    }

    fn trader_with_one_bar() -> Trader {
        let mut trader = Trader::new(symbol(), Freq::F15, &[], 100);
        trader
            .update(Bar {
                symbol: symbol(),
                id: 0,
                dt: Utc.with_ymd_and_hms(2022, 3, 1, 10, 0, 0).unwrap(),
                freq: Freq::F15,
                open: dec!(10),
                close: dec!(10),
                high: dec!(10),
                low: dec!(10),
                vol: dec!(1),
                amount: dec!(10),
                cache: BarCache::default(),
            })
            .unwrap();
        trader
    }

    fn cross(kind: CrossKind, slow: f64) -> Cross {
        Cross {
            position: 0,
            kind,
            fast: slow,
            slow,
            distance: 10,
            bars_ago: 0,
            area: 0.0,
            spread: 0.0,
        }
    }

    fn install(trader: &mut Trader, cross: Vec<Cross>, macd: Vec<f64>) {
        let update_dt = trader.end_dt().unwrap();
        trader
            .set_macd_cache(Freq::F15, MacdCache { update_dt, cross, macd })
            .unwrap();
    }

    fn rising() -> Vec<f64> {
        (0..20).map(|i| i as f64 * 0.1).collect()
    }

    fn falling() -> Vec<f64> {
        (0..20).map(|i| -(i as f64) * 0.1).collect()
    }

    #[test]
    fn second_buy_after_dead_crosses_below_zero() {
        use CrossKind::*;
        let mut trader = trader_with_one_bar();
        install(
            &mut trader,
            vec![
                cross(Dead, -1.0),
                cross(Golden, -0.5),
                cross(Dead, -1.0),
                cross(Golden, -0.5),
                cross(Dead, -1.0),
                cross(Golden, 0.5),
                cross(Dead, 0.8),
            ],
            rising(),
        );

        let signal = macd_bs2_v2(&trader, Freq::F15).unwrap();
        assert_eq!(signal.key(), "15min_MACD_BS2V2");
        assert_eq!(signal.v1, "second buy point");
    }

    #[test]
    fn second_sell_after_golden_crosses_above_zero() {
        use CrossKind::*;
        let mut trader = trader_with_one_bar();
        install(
            &mut trader,
            vec![
                cross(Golden, 1.0),
                cross(Dead, 0.5),
                cross(Golden, 1.0),
                cross(Dead, 0.5),
                cross(Golden, 1.0),
                cross(Dead, -0.5),
                cross(Golden, -0.8),
            ],
            falling(),
        );

        assert_eq!(macd_bs2_v2(&trader, Freq::F15).unwrap().v1, "second sell point");
    }

    #[test]
    fn second_buy_needs_rising_histogram() {
        use CrossKind::*;
        let mut trader = trader_with_one_bar();
        install(
            &mut trader,
            vec![
                cross(Dead, -1.0),
                cross(Dead, -1.0),
                cross(Dead, -1.0),
                cross(Dead, 0.8),
            ],
            falling(),
        );
        assert_eq!(macd_bs2_v2(&trader, Freq::F15).unwrap().v1, "other");
    }

    #[test]
    fn second_buy_needs_more_than_ten_histogram_values() {
        use CrossKind::*;
        let crosses = vec![
            cross(Dead, -1.0),
            cross(Golden, -0.5),
            cross(Dead, -1.0),
            cross(Golden, -0.5),
            cross(Dead, -1.0),
            cross(Golden, 0.5),
            cross(Dead, 0.8),
        ];

        for (len, expected) in [(10, "other"), (11, "second buy point")] {
            let mut trader = trader_with_one_bar();
            let macd: Vec<f64> = (0..len).map(|i| i as f64 * 0.1).collect();
            install(&mut trader, crosses.clone(), macd);
            assert_eq!(macd_bs2_v2(&trader, Freq::F15).unwrap().v1, expected, "len {len}");
        }
    }

    #[test]
    fn fewer_than_four_crosses_is_other() {
        use CrossKind::*;
        for macd in [rising(), falling()] {
            let mut trader = trader_with_one_bar();
            install(
                &mut trader,
                vec![cross(Dead, -1.0), cross(Golden, -1.0), cross(Dead, 0.8)],
                macd,
            );
            assert_eq!(macd_bs2_v2(&trader, Freq::F15).unwrap().v1, "other");
        }
    }

    #[test]
    fn missing_cache_fails_fast() {
        let trader = trader_with_one_bar();
        assert_eq!(
            macd_bs2_v2(&trader, Freq::F15),
            Err(Error::MissingMacdCache { freq: Freq::F15 })
        );
    }

    #[test]
    fn stale_cache_fails_fast() {
        let mut trader = trader_with_one_bar();
        let stale_dt = trader.end_dt().unwrap() - Duration::minutes(15);
        trader
            .set_macd_cache(
                Freq::F15,
                MacdCache {
                    update_dt: stale_dt,
                    cross: Vec::new(),
                    macd: rising(),
                },
            )
            .unwrap();

        assert!(matches!(
            macd_bs2_v2(&trader, Freq::F15),
            Err(Error::StaleMacdCache { freq: Freq::F15, .. })
        ));
    }

    #[test]
    fn short_history_is_other_any() {
        let signal = tas_macd_first_bs_v221216(Freq::F15, &[], 1).unwrap();
        assert_eq!(signal.key(), "15min_D1MACD_BS1A");
        assert_eq!((signal.v1.as_str(), signal.v2.as_str()), ("other", "any"));
    }

    #[test]
    fn zero_offset_is_rejected() {
        assert_eq!(
            tas_macd_first_bs_v221216(Freq::F15, &[], 0),
            Err(Error::InvalidOffset(0))
        );
    }
}
