// In crates/strategies/src/types.rs

use std::fmt;

use serde::{Deserialize, Serialize};

/// Periods of the MACD indicator refreshed onto bars.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct MacdSettings {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
}

impl Default for MacdSettings {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// Buy/sell point classification emitted as a signal's first value field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BsPoint {
    FirstBuy,
    FirstSell,
    SecondBuy,
    SecondSell,
    #[default]
    Other,
}

impl BsPoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            BsPoint::FirstBuy => "first buy point",
            BsPoint::FirstSell => "first sell point",
            BsPoint::SecondBuy => "second buy point",
            BsPoint::SecondSell => "second sell point",
            BsPoint::Other => "other",
        }
    }
}

impl fmt::Display for BsPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
