use super::ui;
use crate::core::config::AppConfig;
use crate::core::conversion::convert_latest;
use crate::core::feed::{refresh_once, shared_table};
use crate::core::{
    ConversionError, ConversionRequest, ConversionResult, ConversionState, CurrencyCode,
    RateProvider,
};
use anyhow::Result;
use tracing::error;

/// Two-line result block: converted amount, then the unit pair rate.
pub fn format_result(request: &ConversionRequest, result: &ConversionResult) -> String {
    let fee_note = if result.fee_percent > 0.0 {
        ui::style_text(
            &format!(
                " (including {}% fee)",
                ui::format_amount(result.fee_percent, 2)
            ),
            ui::StyleType::Subtle,
        )
    } else {
        String::new()
    };

    let converted = format!(
        "{} {}",
        ui::format_amount(result.converted_amount, 2),
        request.target
    );
    let rate_line = format!(
        "1 {} = {:.4} {}",
        request.source, result.effective_pair_rate, request.target
    );

    format!(
        "{} {} = {}{}\n{}",
        ui::format_amount(result.amount, 2),
        request.source,
        ui::style_text(&converted, ui::StyleType::TotalValue),
        fee_note,
        ui::style_text(&rate_line, ui::StyleType::Subtle)
    )
}

/// Fetches a fresh snapshot and runs a single conversion against it.
///
/// A failed fetch is logged and surfaces as `RatesUnavailable`.
pub async fn convert_once(
    config: &AppConfig,
    provider: &dyn RateProvider,
    request: &ConversionRequest,
) -> Result<ConversionResult, ConversionError> {
    let mut codes = config.tracked_codes();
    codes.extend([request.source.clone(), request.target.clone()]);

    let table = shared_table();
    let pb = ui::new_spinner("Fetching rates...");
    let refreshed = refresh_once(provider, &config.base_currency, &codes, &table).await;
    pb.finish_and_clear();
    if let Err(e) = refreshed {
        let message = format!("{e:#}");
        error!(error = %message, "Could not load rates for conversion");
    }

    let mut state = ConversionState::default();
    state.begin();
    state.complete(convert_latest(request, &*table.read().await));

    match state {
        ConversionState::Success(result) => Ok(result),
        ConversionState::Failed(e) => Err(e),
        ConversionState::Idle | ConversionState::Pending => Err(ConversionError::RatesUnavailable),
    }
}

pub async fn run(
    config: &AppConfig,
    provider: &dyn RateProvider,
    amount: &str,
    from: &CurrencyCode,
    to: &CurrencyCode,
    fee_percent: f64,
) -> Result<()> {
    let request =
        ConversionRequest::new(amount, from.clone(), to.clone()).with_fee(fee_percent);
    let result = convert_once(config, provider, &request).await?;

    println!("{}", format_result(&request, &result));
    Ok(())
}
