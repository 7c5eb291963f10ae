// In app/src/main.rs

use std::path::PathBuf;

use anyhow::{Context, Result};
use app_config::{CheckParams, Settings};
use clap::{Parser, Subcommand};
use core_types::{Bar, Freq, Symbol};
use data_cache::DataCache;
use signal_checker::{SignalChecker, print_report};
use strategies::{STRATEGY_NAMES, create_strategy};
use tracing_subscriber::prelude::*;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "Replays cached K-line data through MACD buy/sell point strategies.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replays cached bars through a strategy and reports its signals.
    Check {
        /// The symbol to check, as {code}#{asset} (e.g., "300001.SZ#E").
        #[arg(short, long)]
        symbol: Option<String>,

        /// First day to evaluate, YYYYMMDD.
        #[arg(long)]
        sdt: Option<String>,

        /// Last day to evaluate, YYYYMMDD.
        #[arg(long)]
        edt: Option<String>,

        /// The strategy to run (see `strategies`).
        #[arg(long)]
        strategy: Option<String>,

        /// Optional path to write the full report as JSON.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Imports JSON-lines bars into the data cache.
    Import {
        /// The symbol the bars belong to, as {code}#{asset}.
        #[arg(short, long)]
        symbol: String,

        /// The period of the bars (e.g., "15min", "daily").
        #[arg(short, long)]
        freq: String,

        /// The file to read, one JSON bar per line.
        #[arg(long)]
        file: PathBuf,
    },

    /// Lists the available strategies.
    Strategies,
}

// --- Main Application Entry Point ---

fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    let settings = app_config::load_settings()?;

    let level = settings
        .app
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_filter(tracing_subscriber::filter::Targets::new().with_default(level));
    tracing_subscriber::registry().with(fmt_layer).init();

    let cli = Cli::parse();

    tracing::info!(environment = %settings.app.environment, "Starting signal checker");

    match cli.command {
        Commands::Check {
            symbol,
            sdt,
            edt,
            strategy,
            output,
        } => {
            let defaults = settings.check.clone();
            let params = CheckParams {
                symbol: symbol.unwrap_or(defaults.symbol),
                sdt: sdt.unwrap_or(defaults.sdt),
                edt: edt.unwrap_or(defaults.edt),
                strategy: strategy.unwrap_or(defaults.strategy),
            };
            handle_check(&settings, params, output)?;
        }
        Commands::Import { symbol, freq, file } => {
            handle_import(&settings, &symbol, &freq, &file)?;
        }
        Commands::Strategies => {
            for name in STRATEGY_NAMES {
                println!("{}", name);
            }
        }
    }

    tracing::info!("Signal checker has finished successfully.");

    Ok(())
}

/// Handles the logic for the `check` subcommand.
fn handle_check(settings: &Settings, params: CheckParams, output: Option<PathBuf>) -> Result<()> {
    let params = params.validate()?;
    let cache = DataCache::open(&settings.data.path)?;
    let descriptor =
        create_strategy(&params.strategy, params.symbol.clone())?.with_macd(settings.macd);

    let checker = SignalChecker::new(descriptor, settings.data.max_bars);
    let report = checker.run(&cache, &params)?;

    print_report(&report);
    if let Some(path) = output {
        report.write_json(&path)?;
        tracing::info!(path = %path.display(), "Report written.");
    }
    Ok(())
}

/// Handles the logic for the `import` subcommand.
fn handle_import(settings: &Settings, symbol: &str, freq: &str, file: &PathBuf) -> Result<()> {
    let symbol: Symbol = symbol.parse()?;
    let freq: Freq = freq.parse()?;
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let bars = serde_json::Deserializer::from_str(&content)
        .into_iter::<Bar>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to parse bars from {}", file.display()))?;
    tracing::info!(%symbol, %freq, count = bars.len(), "Read bars for import.");

    let cache = DataCache::open(&settings.data.path)?;
    let written = cache.append_bars(&symbol, freq, &bars)?;
    println!("Imported {} new {} bars for {}.", written, freq, symbol);
    Ok(())
}
