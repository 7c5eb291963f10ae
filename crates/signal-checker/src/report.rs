// In crates/signal-checker/src/report.rs

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use core_types::{SignalSnapshot, Symbol};
use rust_decimal::Decimal;
use serde::Serialize;

/// A signal whose value changed between two consecutive evaluations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    pub dt: DateTime<Utc>,
    pub close: Decimal,
    pub key: String,
    pub from: String,
    pub to: String,
}

/// The outcome of replaying a strategy over a date range.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub strategy: String,
    pub symbol: Symbol,
    pub sdt: NaiveDate,
    pub edt: NaiveDate,
    /// Base-period bars fed to the trader, warm-up included.
    pub bars_replayed: usize,
    /// Evaluations inside `[sdt, edt]`.
    pub snapshots: usize,
    /// Occurrences of each value, per signal key.
    pub counts: BTreeMap<String, BTreeMap<String, usize>>,
    pub transitions: Vec<Transition>,
    pub last: Option<SignalSnapshot>,
}

impl CheckReport {
    pub fn new(strategy: &str, symbol: Symbol, sdt: NaiveDate, edt: NaiveDate) -> Self {
        Self {
            strategy: strategy.to_string(),
            symbol,
            sdt,
            edt,
            bars_replayed: 0,
            snapshots: 0,
            counts: BTreeMap::new(),
            transitions: Vec::new(),
            last: None,
        }
    }

    /// Folds one evaluation into the counts and transition log.
    pub fn record(&mut self, snapshot: SignalSnapshot) {
        self.snapshots += 1;
        for signal in &snapshot.signals {
            let key = signal.key();
            let value = signal.value();
            *self
                .counts
                .entry(key.clone())
                .or_default()
                .entry(value.clone())
                .or_insert(0) += 1;

            let previous = self
                .last
                .as_ref()
                .and_then(|last| last.get(&key))
                .map(|s| s.value());
            if let Some(from) = previous.filter(|from| *from != value) {
                tracing::info!(dt = %snapshot.dt, %key, %from, to = %value, "Signal changed.");
                self.transitions.push(Transition {
                    dt: snapshot.dt,
                    close: snapshot.close,
                    key,
                    from,
                    to: value,
                });
            }
        }
        self.last = Some(snapshot);
    }

    /// Writes the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> anyhow::Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create report file {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .context("Failed to write the signal check report")?;
        Ok(())
    }
}

/// Helper function to print the check report in a readable format.
pub fn print_report(report: &CheckReport) {
    println!("\n--- Signal Check Report ---");
    println!("---------------------------");
    println!("Strategy:       {}", report.strategy);
    println!("Symbol:         {}", report.symbol);
    println!("Range:          {} .. {}", report.sdt, report.edt);
    println!("Bars Replayed:  {}", report.bars_replayed);
    println!("Evaluations:    {}", report.snapshots);
    println!("Transitions:    {}", report.transitions.len());
    println!("---------------------------");

    for (key, values) in &report.counts {
        println!("{}:", key);
        for (value, count) in values {
            let share = *count as f64 / report.snapshots.max(1) as f64 * 100.0;
            println!("  - {:<40} {:>6} ({:.1}%)", value, count, share);
        }
    }
    println!("---------------------------");
}
