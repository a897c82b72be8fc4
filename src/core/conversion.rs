//! Amount conversion with an optional percentage fee

use super::currency::CurrencyCode;
use super::resolver::try_rate;
use super::snapshot::RateSnapshot;
use super::table::RateTable;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("Currency rates are not available. Please try again later.")]
    RatesUnavailable,
    #[error("No rate available for {0}")]
    MissingCurrency(CurrencyCode),
    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),
    #[error("Invalid fee: {0}% (must be between 0 and 100)")]
    InvalidFee(f64),
}

impl ConversionError {
    /// A missing currency is displayed the same way as missing rates.
    pub fn is_rates_unavailable(&self) -> bool {
        matches!(
            self,
            ConversionError::RatesUnavailable | ConversionError::MissingCurrency(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub amount: String,
    pub source: CurrencyCode,
    pub target: CurrencyCode,
    pub fee_percent: f64,
}

impl ConversionRequest {
    pub fn new(amount: impl Into<String>, source: CurrencyCode, target: CurrencyCode) -> Self {
        Self {
            amount: amount.into(),
            source,
            target,
            fee_percent: 0.0,
        }
    }

    pub fn with_fee(mut self, fee_percent: f64) -> Self {
        self.fee_percent = fee_percent;
        self
    }

    pub fn swapped(&self) -> Self {
        Self {
            amount: self.amount.clone(),
            source: self.target.clone(),
            target: self.source.clone(),
            fee_percent: self.fee_percent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionResult {
    pub amount: f64,
    pub converted_amount: f64,
    /// 1 source = `effective_pair_rate` target, before fees.
    pub effective_pair_rate: f64,
    pub fee_percent: f64,
}

/// Parses a user-typed amount. Commas are accepted only as thousands
/// separators in the integer part, e.g. `1,250.50`.
pub fn parse_amount(input: &str) -> Result<f64, ConversionError> {
    let invalid = || ConversionError::InvalidAmount(input.to_string());
    let cleaned = strip_thousands_separators(input.trim()).ok_or_else(invalid)?;
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(invalid()),
    }
}

/// `None` when commas appear anywhere but between well-formed 3-digit groups.
fn strip_thousands_separators(text: &str) -> Option<String> {
    if !text.contains(',') {
        return Some(text.to_string());
    }
    let (integer, fraction) = match text.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (text, None),
    };
    let is_digits = |group: &str| group.bytes().all(|b| b.is_ascii_digit());
    let mut groups = integer.split(',');
    let lead = groups.next()?;
    let well_formed = (1..=3).contains(&lead.len())
        && is_digits(lead)
        && groups.all(|g| g.len() == 3 && is_digits(g));
    if !well_formed || fraction.is_some_and(|f| f.contains(',')) {
        return None;
    }

    let mut cleaned = integer.replace(',', "");
    if let Some(fraction) = fraction {
        cleaned.push('.');
        cleaned.push_str(fraction);
    }
    Some(cleaned)
}

fn validate_fee(fee_percent: f64) -> Result<f64, ConversionError> {
    if (0.0..=100.0).contains(&fee_percent) {
        Ok(fee_percent)
    } else {
        Err(ConversionError::InvalidFee(fee_percent))
    }
}

/// Converts `request.amount` from source to target currency using `snapshot`.
///
/// The result depends only on the amount, the two base-relative rates and the
/// fee. No currency pair gets special treatment.
pub fn convert(
    request: &ConversionRequest,
    snapshot: &RateSnapshot,
) -> Result<ConversionResult, ConversionError> {
    if snapshot.is_empty() {
        return Err(ConversionError::RatesUnavailable);
    }
    let amount = parse_amount(&request.amount)?;
    let fee_percent = validate_fee(request.fee_percent)?;

    for code in [&request.source, &request.target] {
        if !snapshot.contains(code) {
            return Err(ConversionError::MissingCurrency(code.clone()));
        }
    }
    let pair_rate = try_rate(&request.source, &request.target, snapshot)
        .ok_or(ConversionError::RatesUnavailable)?;

    let raw = amount * pair_rate;
    if !raw.is_finite() {
        return Err(ConversionError::InvalidAmount(request.amount.clone()));
    }
    let converted_amount = if fee_percent == 100.0 {
        0.0
    } else {
        raw * (1.0 - fee_percent / 100.0)
    };
    if !converted_amount.is_finite() {
        return Err(ConversionError::InvalidAmount(request.amount.clone()));
    }
    debug!(
        source = %request.source,
        target = %request.target,
        amount,
        pair_rate,
        fee_percent,
        converted_amount,
        "Converted amount"
    );

    Ok(ConversionResult {
        amount,
        converted_amount,
        effective_pair_rate: pair_rate,
        fee_percent,
    })
}

/// Converts against whatever snapshot is current at call time.
pub fn convert_latest(
    request: &ConversionRequest,
    table: &RateTable,
) -> Result<ConversionResult, ConversionError> {
    let snapshot = table.current().ok_or(ConversionError::RatesUnavailable)?;
    convert(request, &snapshot)
}

/// Lifecycle of a single user-initiated conversion.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConversionState {
    #[default]
    Idle,
    Pending,
    Success(ConversionResult),
    Failed(ConversionError),
}

impl ConversionState {
    pub fn begin(&mut self) {
        *self = ConversionState::Pending;
    }

    /// Settles a pending conversion. Ignored unless the state is `Pending`.
    pub fn complete(&mut self, outcome: Result<ConversionResult, ConversionError>) {
        if *self != ConversionState::Pending {
            return;
        }
        *self = match outcome {
            Ok(result) => ConversionState::Success(result),
            Err(e) => ConversionState::Failed(e),
        };
    }

    pub fn reset(&mut self) {
        *self = ConversionState::Idle;
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ConversionState::Pending)
    }
}
