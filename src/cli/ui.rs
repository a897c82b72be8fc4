use crate::core::{DeltaMode, Trend};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalValue,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Formats an amount with at most `max_decimals` fraction digits, dropping trailing zeros.
pub fn format_amount(value: f64, max_decimals: usize) -> String {
    let text = format!("{value:.max_decimals$}");
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

/// Formats a rate, `None` is displayed as "N/A".
pub fn rate_cell(rate: Option<f64>) -> Cell {
    rate.map_or(
        Cell::new("N/A")
            .fg(Color::DarkGrey)
            .set_alignment(CellAlignment::Right),
        |r| {
            Cell::new(format!("{r:.2}"))
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Right)
        },
    )
}

/// Text for a rate change: trend arrow followed by the magnitude.
pub fn change_text(delta: f64, mode: DeltaMode) -> String {
    let trend = Trend::of(delta);
    if trend == Trend::Neutral {
        return trend.to_string();
    }
    match mode {
        DeltaMode::Percent => format!("{trend} {:.2}%", delta.abs()),
        DeltaMode::Absolute => format!("{trend} {:.4}", delta.abs()),
    }
}

/// Creates a cell for displaying a rate change with color coding.
pub fn change_cell(delta: f64, mode: DeltaMode) -> Cell {
    let color = match Trend::of(delta) {
        Trend::Up => Color::Green,
        Trend::Down => Color::Red,
        Trend::Neutral => Color::DarkGrey,
    };
    Cell::new(change_text(delta, mode))
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

/// Creates a spinner shown while rates are being fetched.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
