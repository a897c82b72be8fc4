//! Pair rates derived from base-relative snapshots

use super::currency::CurrencyCode;
use super::snapshot::RateSnapshot;

/// Rate converting one unit of `from` into `to`, triangulated through the base.
/// Returns `None` when either code is missing from the snapshot.
pub fn try_rate(from: &CurrencyCode, to: &CurrencyCode, snapshot: &RateSnapshot) -> Option<f64> {
    let from_rate = snapshot.get(from)?;
    let to_rate = snapshot.get(to)?;

    let base = snapshot.base();
    let rate = if from == base {
        to_rate
    } else if to == base {
        1.0 / from_rate
    } else {
        to_rate / from_rate
    };
    Some(rate)
}

/// Same as [`try_rate`] but with `0.0` standing in for "unavailable".
pub fn rate(from: &CurrencyCode, to: &CurrencyCode, snapshot: &RateSnapshot) -> f64 {
    try_rate(from, to, snapshot).unwrap_or(0.0)
}
