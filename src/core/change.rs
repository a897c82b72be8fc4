//! Rate movement between the previous and current snapshot

use super::currency::CurrencyPair;
use super::resolver::try_rate;
use super::table::RateTable;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Changes smaller than this are shown without a direction.
pub const TREND_EPSILON: f64 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaMode {
    Absolute,
    #[default]
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

impl Trend {
    pub fn of(delta: f64) -> Self {
        if delta.abs() < TREND_EPSILON {
            Trend::Neutral
        } else if delta > 0.0 {
            Trend::Up
        } else {
            Trend::Down
        }
    }
}

impl Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Trend::Up => "▲",
                Trend::Down => "▼",
                Trend::Neutral => "•",
            }
        )
    }
}

/// Signed change of `pair` from the previous to the current snapshot.
///
/// Each side is resolved against its own snapshot. Returns `0.0` when there is
/// no previous snapshot or either code is missing from either one.
pub fn delta(pair: &CurrencyPair, table: &RateTable, mode: DeltaMode) -> f64 {
    let (Some(previous), Some(current)) = (table.previous(), table.current()) else {
        return 0.0;
    };
    let old = try_rate(&pair.from, &pair.to, &previous);
    let new = try_rate(&pair.from, &pair.to, &current);

    match (old, new) {
        (Some(old), Some(new)) => match mode {
            DeltaMode::Absolute => new - old,
            DeltaMode::Percent if old != 0.0 => ((new - old) / old) * 100.0,
            DeltaMode::Percent => 0.0,
        },
        _ => 0.0,
    }
}

/// One display row: pair, current rate and its movement.
#[derive(Debug, Clone, PartialEq)]
pub struct PairQuote {
    pub pair: CurrencyPair,
    /// `None` while the pair cannot be resolved from the current snapshot.
    pub rate: Option<f64>,
    pub delta: f64,
    pub trend: Trend,
}

pub fn quote(pair: &CurrencyPair, table: &RateTable, mode: DeltaMode) -> PairQuote {
    let rate = table
        .current()
        .and_then(|snapshot| try_rate(&pair.from, &pair.to, &snapshot));
    let delta = delta(pair, table, mode);
    PairQuote {
        pair: pair.clone(),
        rate,
        delta,
        trend: Trend::of(delta),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::snapshot::fixtures::snapshot;
    use approx::assert_relative_eq;

    fn pair(s: &str) -> CurrencyPair {
        s.parse().unwrap()
    }

    fn table_with(previous: &[(&str, f64)], current: &[(&str, f64)]) -> RateTable {
        let mut table = RateTable::new();
        table.update(snapshot(previous));
        table.update(snapshot(current));
        table
    }

    #[test]
    fn test_no_previous_snapshot() {
        let mut table = RateTable::new();
        assert_eq!(delta(&pair("EUR/USD"), &table, DeltaMode::Percent), 0.0);
        table.update(snapshot(&[("EUR", 0.9)]));
        assert_eq!(delta(&pair("EUR/USD"), &table, DeltaMode::Absolute), 0.0);
    }

    #[test]
    fn test_delta_uses_each_snapshot() {
        let table = table_with(&[("EUR", 0.9)], &[("EUR", 0.91)]);

        let abs = delta(&pair("EUR/USD"), &table, DeltaMode::Absolute);
        assert_relative_eq!(abs, 1.0 / 0.91 - 1.0 / 0.9, epsilon = 1e-12);
        assert!(abs < 0.0);

        let pct = delta(&pair("EUR/USD"), &table, DeltaMode::Percent);
        assert_relative_eq!(pct, (0.9 / 0.91 - 1.0) * 100.0, epsilon = 1e-9);

        let up = delta(&pair("USD/EUR"), &table, DeltaMode::Absolute);
        assert_relative_eq!(up, 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_code_in_either_snapshot() {
        let table = table_with(&[("EUR", 0.9)], &[("EUR", 0.91), ("GBP", 0.78)]);
        assert_eq!(delta(&pair("GBP/EUR"), &table, DeltaMode::Percent), 0.0);

        let table = table_with(&[("EUR", 0.9), ("GBP", 0.78)], &[("EUR", 0.91)]);
        assert_eq!(delta(&pair("GBP/EUR"), &table, DeltaMode::Percent), 0.0);
    }

    #[test]
    fn test_trend_thresholds() {
        assert_eq!(Trend::of(0.5), Trend::Up);
        assert_eq!(Trend::of(-0.5), Trend::Down);
        assert_eq!(Trend::of(0.0), Trend::Neutral);
        assert_eq!(Trend::of(5e-5), Trend::Neutral);
        assert_eq!(Trend::of(-5e-5), Trend::Neutral);
    }

    #[test]
    fn test_quote() {
        let table = table_with(&[("EUR", 0.9)], &[("EUR", 0.91)]);
        let q = quote(&pair("USD/EUR"), &table, DeltaMode::Percent);
        assert_eq!(q.rate, Some(0.91));
        assert_eq!(q.trend, Trend::Up);

        let missing = quote(&pair("USD/PLN"), &table, DeltaMode::Percent);
        assert_eq!(missing.rate, None);
        assert_eq!(missing.trend, Trend::Neutral);
    }
}
