use super::{rates, ui};
use crate::core::config::AppConfig;
use crate::core::feed::shared_table;
use crate::core::{CurrencyPair, DeltaMode, FeedEvent, RateFeed, RateProvider, RateTable};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// One screen: the rates table, plus an error banner when the last refresh failed.
pub fn render_frame(
    event: &FeedEvent,
    pairs: &[CurrencyPair],
    table: &RateTable,
    mode: DeltaMode,
) -> String {
    let mut frame = rates::render_rates(pairs, table, mode);
    if let FeedEvent::Failed(message) = event {
        frame.push_str("\n\n");
        frame.push_str(&ui::style_text(
            "Failed to fetch currency rates. Showing the last known rates; retrying on the next refresh.",
            ui::StyleType::Error,
        ));
        frame.push('\n');
        frame.push_str(&ui::style_text(message, ui::StyleType::Subtle));
    }
    frame.push_str("\n\n");
    frame.push_str(&ui::style_text("Press Ctrl-C to stop", ui::StyleType::Subtle));
    frame
}

fn draw(term: &console::Term, frame: &str) -> Result<()> {
    term.clear_screen()?;
    println!("{frame}");
    Ok(())
}

/// Keeps the rates table on screen, refreshing it every `interval` until Ctrl-C.
pub async fn run(
    config: &AppConfig,
    provider: Arc<dyn RateProvider>,
    pairs: Option<Vec<CurrencyPair>>,
    interval: Option<Duration>,
) -> Result<()> {
    let pairs = pairs.unwrap_or_else(|| config.popular_pairs.clone());
    let interval = interval.unwrap_or_else(|| config.refresh_interval());
    let mut codes = config.tracked_codes();
    codes.extend(pairs.iter().flat_map(|p| [p.from.clone(), p.to.clone()]));

    let table = shared_table();
    let feed = RateFeed::spawn(
        provider,
        config.base_currency.clone(),
        codes,
        interval,
        table.clone(),
    );
    let mut events = feed.subscribe();
    let term = console::Term::stdout();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    // First frame shows the loading state until the initial fetch settles
    let initial = events.borrow_and_update().clone();
    draw(&term, &render_frame(&initial, &pairs, &*table.read().await, config.delta_mode))?;

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Interrupted, stopping watch");
                break;
            }
            changed = events.changed() => {
                if changed.is_err() {
                    break;
                }
                let event = events.borrow_and_update().clone();
                draw(&term, &render_frame(&event, &pairs, &*table.read().await, config.delta_mode))?;
            }
        }
    }

    feed.shutdown().await;
    Ok(())
}
