use super::ui;
use crate::core::Dashboard;
use crate::core::dashboard::DashboardOptions;
use anyhow::Result;
use comfy_table::{Cell, Table};

pub fn run(dashboard: &Dashboard) -> Result<()> {
    let options = dashboard.options();
    println!("{}", ui::style_text("Selectors", ui::StyleType::Title));
    println!("{}", options_table(&options));
    Ok(())
}

/// Lists the selector values side by side, with the price data extent.
pub fn options_table(options: &DashboardOptions) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Ticker"), ui::header_cell("Column")]);

    let rows = options.tickers.len().max(options.columns.len());
    for i in 0..rows {
        table.add_row(vec![
            Cell::new(options.tickers.get(i).map_or("", String::as_str)),
            Cell::new(options.columns.get(i).map_or("", String::as_str)),
        ]);
    }

    let extent = match options.price_extent {
        Some((first, last)) => format!("Prices from {first} to {last}"),
        None => "No price data".to_string(),
    };
    table.add_row(vec![
        Cell::new(ui::style_text(&extent, ui::StyleType::Subtle)),
        Cell::new(""),
    ]);
    table
}
