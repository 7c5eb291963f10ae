// In crates/signal-checker/src/lib.rs

pub mod report;

use anyhow::Context;
use app_config::ValidCheckParams;
use chrono::{TimeZone, Utc};
use core_types::Bar;
use data_cache::DataCache;
use strategies::StrategyDescriptor;

pub use report::{CheckReport, Transition, print_report};

/// Replays cached bars through a strategy and records every signal it emits.
#[derive(Debug)]
pub struct SignalChecker {
    /// The strategy under test.
    pub descriptor: StrategyDescriptor,
    /// Bars kept per period on the trader.
    pub max_bars: usize,
}

impl SignalChecker {
    pub fn new(descriptor: StrategyDescriptor, max_bars: usize) -> Self {
        Self {
            descriptor,
            max_bars,
        }
    }

    /// Feeds every cached base-period bar up to the end of `edt` to a fresh
    /// trader, with the other periods' bars delivered as soon as they are not
    /// newer than the base bar. Bars before `sdt` only warm the trader up;
    /// each base bar inside the range is evaluated with the strategy.
    pub fn run(&self, cache: &DataCache, params: &ValidCheckParams) -> anyhow::Result<CheckReport> {
        let descriptor = &self.descriptor;
        let start_dt = Utc.from_utc_datetime(
            &params
                .sdt
                .and_hms_opt(0, 0, 0)
                .context("Failed to build the start of the check range")?,
        );
        let end_dt = Utc.from_utc_datetime(
            &params
                .edt
                .and_hms_opt(23, 59, 59)
                .context("Failed to build the end of the check range")?,
        );

        let base_bars = cache.load_bars(&descriptor.symbol, descriptor.base_freq, end_dt)?;
        if !base_bars.iter().any(|bar| bar.dt >= start_dt) {
            anyhow::bail!(
                "No {} bars cached for {} between {} and {}",
                descriptor.base_freq,
                descriptor.symbol,
                params.sdt,
                params.edt
            );
        }

        let mut other_bars = Vec::new();
        for freq in descriptor.freqs.iter().filter(|f| **f != descriptor.base_freq) {
            let bars = cache.load_bars(&descriptor.symbol, *freq, end_dt)?;
            tracing::info!(%freq, count = bars.len(), "Loaded additional period.");
            other_bars.push(bars.into_iter().peekable());
        }

        tracing::info!(
            strategy = descriptor.name,
            symbol = %descriptor.symbol,
            base_bars = base_bars.len(),
            %start_dt,
            %end_dt,
            "Starting signal check replay."
        );

        let mut trader = descriptor.new_trader(self.max_bars);
        let mut report = CheckReport::new(
            descriptor.name,
            descriptor.symbol.clone(),
            params.sdt,
            params.edt,
        );

        for bar in base_bars {
            let dt = bar.dt;
            for bars in other_bars.iter_mut() {
                while let Some(other) = bars.next_if(|b: &Bar| b.dt <= dt) {
                    trader.update(other)?;
                }
            }
            trader.update(bar)?;
            report.bars_replayed += 1;

            if dt < start_dt {
                continue;
            }
            let snapshot = descriptor
                .evaluate(&mut trader)
                .with_context(|| format!("Signal evaluation failed at {}", dt))?;
            report.record(snapshot);
        }

        tracing::info!(
            bars_replayed = report.bars_replayed,
            snapshots = report.snapshots,
            transitions = report.transitions.len(),
            "Signal check finished."
        );
        Ok(report)
    }
}
