//! Immutable point-in-time rate snapshots

use super::currency::CurrencyCode;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Units of each currency per 1 unit of `base`. The base entry is always exactly 1.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSnapshot {
    base: CurrencyCode,
    rates: BTreeMap<CurrencyCode, f64>,
    captured_at: DateTime<Utc>,
}

impl RateSnapshot {
    pub fn new(base: CurrencyCode, rates: HashMap<CurrencyCode, f64>) -> Self {
        Self::captured_at(base, rates, Utc::now())
    }

    pub fn captured_at(
        base: CurrencyCode,
        rates: HashMap<CurrencyCode, f64>,
        captured_at: DateTime<Utc>,
    ) -> Self {
        let mut clean: BTreeMap<CurrencyCode, f64> = rates
            .into_iter()
            .filter(|(code, rate)| {
                let valid = rate.is_finite() && *rate > 0.0;
                if !valid {
                    warn!(%code, rate, "Dropping unusable rate from snapshot");
                }
                valid
            })
            .collect();
        clean.insert(base.clone(), 1.0);

        Self {
            base,
            rates: clean,
            captured_at,
        }
    }

    /// An empty snapshot has no currency other than the base.
    pub fn is_empty(&self) -> bool {
        self.rates.len() <= 1
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    pub fn get(&self, code: &CurrencyCode) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn contains(&self, code: &CurrencyCode) -> bool {
        self.rates.contains_key(code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &CurrencyCode> {
        self.rates.keys()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.captured_at
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn code(s: &str) -> CurrencyCode {
        CurrencyCode::new(s).unwrap()
    }

    pub fn snapshot(entries: &[(&str, f64)]) -> RateSnapshot {
        let rates = entries.iter().map(|(c, r)| (code(c), *r)).collect();
        RateSnapshot::new(code("USD"), rates)
    }
}
