use super::ui;
use crate::core::change::quote;
use crate::core::config::AppConfig;
use crate::core::feed::{refresh_once, shared_table};
use crate::core::{CurrencyPair, DeltaMode, PairQuote, RateProvider, RateTable};
use anyhow::Result;
use comfy_table::Cell;

/// Quotes for `pairs`, in the given order.
pub fn collect_quotes(pairs: &[CurrencyPair], table: &RateTable, mode: DeltaMode) -> Vec<PairQuote> {
    pairs.iter().map(|pair| quote(pair, table, mode)).collect()
}

pub fn render_quotes(quotes: &[PairQuote], mode: DeltaMode) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Pair"),
        ui::header_cell("Rate"),
        ui::header_cell("Change"),
    ]);

    for q in quotes {
        table.add_row(vec![
            Cell::new(q.pair.to_string()),
            ui::rate_cell(q.rate),
            ui::change_cell(q.delta, mode),
        ]);
    }
    table.to_string()
}

/// Heading plus table for the current state of `table`.
pub fn render_rates(pairs: &[CurrencyPair], table: &RateTable, mode: DeltaMode) -> String {
    let updated = table
        .current()
        .map(|s| format!("Updated {}", s.timestamp().format("%Y-%m-%d %H:%M:%S UTC")))
        .unwrap_or_else(|| "Loading exchange rates...".to_string());

    format!(
        "{}\n{}\n\n{}",
        ui::style_text("Exchange rates", ui::StyleType::Title),
        ui::style_text(&updated, ui::StyleType::Subtle),
        render_quotes(&collect_quotes(pairs, table, mode), mode)
    )
}

pub async fn run(
    config: &AppConfig,
    provider: &dyn RateProvider,
    pairs: Option<Vec<CurrencyPair>>,
) -> Result<()> {
    let pairs = pairs.unwrap_or_else(|| config.popular_pairs.clone());
    let mut codes = config.tracked_codes();
    codes.extend(pairs.iter().flat_map(|p| [p.from.clone(), p.to.clone()]));

    let table = shared_table();
    let pb = ui::new_spinner("Fetching rates...");
    let refreshed = refresh_once(provider, &config.base_currency, &codes, &table).await;
    pb.finish_and_clear();
    refreshed?;

    println!(
        "{}",
        render_rates(&pairs, &*table.read().await, config.delta_mode)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CurrencyCode, RateSnapshot};
    use std::collections::HashMap;

    fn snapshot(eur: f64) -> RateSnapshot {
        RateSnapshot::new(
            CurrencyCode::new("USD").unwrap(),
            HashMap::from([(CurrencyCode::new("EUR").unwrap(), eur)]),
        )
    }

    fn pairs() -> Vec<CurrencyPair> {
        vec!["USD/EUR".parse().unwrap(), "EUR/PLN".parse().unwrap()]
    }

    #[test]
    fn test_render_quotes() {
        console::set_colors_enabled(false);
        let mut table = RateTable::new();
        table.update(snapshot(0.9));
        table.update(snapshot(0.91));

        let quotes = collect_quotes(&pairs(), &table, DeltaMode::Absolute);
        assert_eq!(quotes.len(), 2);

        let rendered = render_quotes(&quotes, DeltaMode::Absolute);
        assert!(rendered.contains("USD/EUR"));
        assert!(rendered.contains("0.91"));
        assert!(rendered.contains("▲ 0.0100"));
        assert!(rendered.contains("N/A"));
    }

    #[test]
    fn test_render_rates_before_first_fetch() {
        console::set_colors_enabled(false);
        let rendered = render_rates(&pairs(), &RateTable::new(), DeltaMode::Percent);
        assert!(rendered.contains("Loading exchange rates..."));
        assert!(rendered.contains("N/A"));
    }
}
