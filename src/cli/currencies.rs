use super::ui;
use crate::core::config::AppConfig;
use comfy_table::Cell;

pub fn render(config: &AppConfig) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Code"), ui::header_cell("Name")]);

    for currency in &config.currencies {
        let code = if currency.code == config.base_currency {
            format!("{} (base)", currency.code)
        } else {
            currency.code.to_string()
        };
        table.add_row(vec![Cell::new(code), Cell::new(&currency.name)]);
    }
    table.to_string()
}

pub fn run(config: &AppConfig) {
    println!("{}", render(config));
}
