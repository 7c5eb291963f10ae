// In crates/core-types/src/types.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The K-line aggregation period a bar sequence is built over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Freq {
    #[serde(rename = "1min")]
    F1,
    #[serde(rename = "5min")]
    F5,
    #[serde(rename = "15min")]
    F15,
    #[serde(rename = "30min")]
    F30,
    #[serde(rename = "60min")]
    F60,
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "monthly")]
    Monthly,
}

impl Freq {
    pub const ALL: [Freq; 8] = [
        Freq::F1,
        Freq::F5,
        Freq::F15,
        Freq::F30,
        Freq::F60,
        Freq::Daily,
        Freq::Weekly,
        Freq::Monthly,
    ];

    /// The stable text label used in signal keys and cache file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Freq::F1 => "1min",
            Freq::F5 => "5min",
            Freq::F15 => "15min",
            Freq::F30 => "30min",
            Freq::F60 => "60min",
            Freq::Daily => "daily",
            Freq::Weekly => "weekly",
            Freq::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Freq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Freq {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Freq::ALL
            .into_iter()
            .find(|freq| freq.as_str() == s)
            .ok_or_else(|| Error::UnknownFreq(s.to_string()))
    }
}

/// Asset class suffix of a symbol, as used by the market-data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Asset {
    /// Equity.
    E,
    /// Index.
    I,
    /// Fund.
    FD,
    /// Futures.
    FT,
    /// Crypto.
    C,
    /// Option.
    O,
    /// Convertible bond.
    CB,
}

impl Asset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Asset::E => "E",
            Asset::I => "I",
            Asset::FD => "FD",
            Asset::FT => "FT",
            Asset::C => "C",
            Asset::O => "O",
            Asset::CB => "CB",
        }
    }
}

impl FromStr for Asset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "E" => Ok(Asset::E),
            "I" => Ok(Asset::I),
            "FD" => Ok(Asset::FD),
            "FT" => Ok(Asset::FT),
            "C" => Ok(Asset::C),
            "O" => Ok(Asset::O),
            "CB" => Ok(Asset::CB),
            other => Err(Error::UnknownAsset(other.to_string())),
        }
    }
}

/// A traded instrument in `{code}#{asset}` form, e.g. `300001.SZ#E`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol {
    pub code: String,
    pub asset: Asset,
}

impl Symbol {
    pub fn new(code: impl Into<String>, asset: Asset) -> Self {
        Self {
            code: code.into(),
            asset,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.code, self.asset.as_str())
    }
}

impl FromStr for Symbol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (code, asset) = s
            .split_once('#')
            .ok_or_else(|| Error::InvalidSymbol(s.to_string()))?;
        if code.is_empty() {
            return Err(Error::InvalidSymbol(s.to_string()));
        }
        Ok(Symbol::new(code, asset.parse()?))
    }
}

impl TryFrom<String> for Symbol {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.to_string()
    }
}

/// One MACD observation: fast-minus-slow line, its signal line, and the
/// doubled histogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdValues {
    pub dif: f64,
    pub dea: f64,
    pub macd: f64,
}

/// Indicator values stamped onto a bar by the indicator refreshers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarCache {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macd: Option<MacdValues>,
}

impl BarCache {
    pub fn is_empty(&self) -> bool {
        self.macd.is_none()
    }
}

/// A single candlestick observation for one symbol and period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: Symbol,
    pub id: u64,
    pub dt: DateTime<Utc>,
    pub freq: Freq,
    pub open: Decimal,
    pub close: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub vol: Decimal,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "BarCache::is_empty")]
    pub cache: BarCache,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrossKind {
    /// The fast line crossed above the slow line.
    Golden,
    /// The fast line crossed below the slow line.
    Dead,
}

impl CrossKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrossKind::Golden => "golden cross",
            CrossKind::Dead => "dead cross",
        }
    }
}

impl fmt::Display for CrossKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A crossing between a fast and a slow indicator line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cross {
    /// Index of the crossing bar in the source sequences.
    pub position: usize,
    pub kind: CrossKind,
    pub fast: f64,
    pub slow: f64,
    /// Bars since the previous cross, the crossing bar included.
    pub distance: usize,
    /// Bars from the crossing bar to the end of the sequences.
    pub bars_ago: usize,
    /// Sum of fast minus slow since the previous cross.
    pub area: f64,
    /// Fast minus slow on the crossing bar.
    pub spread: f64,
}
