// In crates/core-types/src/signal.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Freq, Symbol};

/// Wildcard qualifier: an unset value field, or "match anything" in a pattern.
pub const ANY: &str = "any";

/// A classification produced by a signal function.
///
/// The key identifies *what* was evaluated (period, indicator family, variant)
/// and the value carries the classification plus free-form qualifiers. Both
/// render to the `_`-joined text form used in reports, e.g.
/// `15min_D1MACD_BS1A_first buy point_dead cross_any_0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub freq: Freq,
    pub family: String,
    pub variant: String,
    pub v1: String,
    pub v2: String,
    pub v3: String,
    pub score: u32,
}

impl Signal {
    pub fn new(
        freq: Freq,
        family: impl Into<String>,
        variant: impl Into<String>,
        v1: impl Into<String>,
    ) -> Self {
        Self {
            freq,
            family: family.into(),
            variant: variant.into(),
            v1: v1.into(),
            v2: ANY.to_string(),
            v3: ANY.to_string(),
            score: 0,
        }
    }

    pub fn with_v2(mut self, v2: impl Into<String>) -> Self {
        self.v2 = v2.into();
        self
    }

    pub fn with_v3(mut self, v3: impl Into<String>) -> Self {
        self.v3 = v3.into();
        self
    }

    pub fn with_score(mut self, score: u32) -> Self {
        self.score = score;
        self
    }

    pub fn key(&self) -> String {
        format!("{}_{}_{}", self.freq, self.family, self.variant)
    }

    pub fn value(&self) -> String {
        format!("{}_{}_{}_{}", self.v1, self.v2, self.v3, self.score)
    }

    /// Returns true when `self` satisfies `pattern`: same key, every value
    /// field equal or wildcarded in the pattern, and a score at least as high.
    pub fn is_match(&self, pattern: &Signal) -> bool {
        let field_matches = |actual: &str, wanted: &str| wanted == ANY || actual == wanted;

        self.freq == pattern.freq
            && self.family == pattern.family
            && self.variant == pattern.variant
            && field_matches(&self.v1, &pattern.v1)
            && field_matches(&self.v2, &pattern.v2)
            && field_matches(&self.v3, &pattern.v3)
            && self.score >= pattern.score
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.key(), self.value())
    }
}

impl FromStr for Signal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('_').collect();
        let [freq, family, variant, v1, v2, v3, score] = parts.as_slice() else {
            return Err(Error::InvalidSignal(s.to_string()));
        };
        let score = score
            .parse()
            .map_err(|_| Error::InvalidSignal(s.to_string()))?;

        Ok(Signal {
            freq: freq.parse()?,
            family: family.to_string(),
            variant: variant.to_string(),
            v1: v1.to_string(),
            v2: v2.to_string(),
            v3: v3.to_string(),
            score,
        })
    }
}

/// The ordered output of one evaluation step: identity fields first, then
/// every signal in the order the strategy produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSnapshot {
    pub symbol: Symbol,
    pub dt: DateTime<Utc>,
    pub close: Decimal,
    pub signals: Vec<Signal>,
}

impl SignalSnapshot {
    pub fn new(symbol: Symbol, dt: DateTime<Utc>, close: Decimal) -> Self {
        Self {
            symbol,
            dt,
            close,
            signals: Vec::new(),
        }
    }

    /// Adds a signal, replacing an earlier one with the same key in place.
    pub fn push(&mut self, signal: Signal) {
        let key = signal.key();
        match self.signals.iter_mut().find(|s| s.key() == key) {
            Some(existing) => *existing = signal,
            None => self.signals.push(signal),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Signal> {
        self.signals.iter().find(|s| s.key() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn renders_key_and_value() {
        let signal = Signal::new(Freq::F15, "MACD", "BS2V2", "second buy point");
        assert_eq!(signal.key(), "15min_MACD_BS2V2");
        assert_eq!(signal.value(), "second buy point_any_any_0");
        assert_eq!(
            signal.to_string(),
            "15min_MACD_BS2V2_second buy point_any_any_0"
        );
    }

    #[test]
    fn parses_its_own_text_form() {
        let signal = Signal::new(Freq::F60, "D1MACD", "BS1A", "first sell point")
            .with_v2("golden cross")
            .with_score(10);
        let parsed: Signal = signal.to_string().parse().unwrap();
        assert_eq!(parsed, signal);
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert!("15min_MACD_BS2V2_other".parse::<Signal>().is_err());
        assert!("15min_MACD_BS2V2_other_any_any_x".parse::<Signal>().is_err());
    }

    #[test]
    fn wildcard_fields_match_anything() {
        let actual = Signal::new(Freq::F15, "D1MACD", "BS1A", "first buy point")
            .with_v2("dead cross")
            .with_score(5);
        let pattern = Signal::new(Freq::F15, "D1MACD", "BS1A", "first buy point");
        assert!(actual.is_match(&pattern));

        let strict = pattern.clone().with_v2("golden cross");
        assert!(!actual.is_match(&strict));

        let demanding = pattern.with_score(50);
        assert!(!actual.is_match(&demanding));
    }

    #[test]
    fn snapshot_keeps_insertion_order_and_replaces_same_key() {
        let mut snapshot =
            SignalSnapshot::new("000001.SZ#E".parse().unwrap(), Utc::now(), dec!(10.5));
        snapshot.push(Signal::new(Freq::F15, "MACD", "BS2V2", "other"));
        snapshot.push(Signal::new(Freq::F15, "D1MACD", "BS1A", "other"));
        snapshot.push(Signal::new(Freq::F15, "MACD", "BS2V2", "second sell point"));

        assert_eq!(snapshot.signals.len(), 2);
        assert_eq!(snapshot.signals[0].v1, "second sell point");
        assert_eq!(snapshot.get("15min_D1MACD_BS1A").unwrap().v1, "other");
        assert!(snapshot.get("15min_MACD_BS9").is_none());
    }
}
