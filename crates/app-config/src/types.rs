// In crates/app-config/src/types.rs

use chrono::NaiveDate;
use core_types::Symbol;
use serde::Deserialize;
use strategies::MacdSettings;

use crate::error::{Error, Result};

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    /// Where the market-data cache lives.
    pub data: DataSettings,
    /// Default parameters of the `check` command.
    pub check: CheckParams,
    /// MACD periods shared by every strategy.
    #[serde(default)]
    pub macd: MacdSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DataSettings {
    /// Root directory of the bar cache.
    pub path: String,
    /// Bars kept per period while replaying.
    #[serde(default = "default_max_bars")]
    pub max_bars: usize,
}

fn default_max_bars() -> usize {
    2000
}

/// Parameters of a signal check run, as written in configuration.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CheckParams {
    /// Traded symbol in `{code}#{asset}` form, e.g. `000001.SZ#E`.
    pub symbol: String,
    /// First day to evaluate, `YYYYMMDD`.
    pub sdt: String,
    /// Last day to evaluate, `YYYYMMDD`.
    pub edt: String,
    #[serde(default = "default_strategy")]
    pub strategy: String,
}

fn default_strategy() -> String {
    "macd_first_bs".to_string()
}

/// Check parameters after parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidCheckParams {
    pub symbol: Symbol,
    pub sdt: NaiveDate,
    pub edt: NaiveDate,
    pub strategy: String,
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y%m%d").map_err(|_| Error::InvalidDate {
        field,
        value: value.to_string(),
    })
}

impl CheckParams {
    pub fn validate(&self) -> Result<ValidCheckParams> {
        let symbol: Symbol = self.symbol.parse()?;
        let sdt = parse_date("sdt", &self.sdt)?;
        let edt = parse_date("edt", &self.edt)?;
        if sdt >= edt {
            return Err(Error::EmptyRange {
                sdt: self.sdt.clone(),
                edt: self.edt.clone(),
            });
        }
        Ok(ValidCheckParams {
            symbol,
            sdt,
            edt,
            strategy: self.strategy.clone(),
        })
    }
}
