use super::ui;
use crate::core::chart::{ChartSpec, Panel};
use crate::core::config::AppConfig;
use crate::core::{Dashboard, Selection};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{Cell, Table};
use std::path::{Path, PathBuf};
use tracing::info;

/// Filter inputs for a single chart; unset fields fall back to defaults.
#[derive(Debug, Clone, Default)]
pub struct ChartArgs {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub ticker: Option<String>,
    pub column: Option<String>,
    pub output: Option<PathBuf>,
}

impl ChartArgs {
    pub fn selection(&self, dashboard: &Dashboard, config: &AppConfig, today: NaiveDate) -> Selection {
        let mut selection = dashboard.default_selection(
            self.from.unwrap_or(config.default_from),
            self.to.unwrap_or(today),
        );
        if let Some(ticker) = &self.ticker {
            selection.ticker = ticker.clone();
        }
        if let Some(column) = &self.column {
            selection.column = column.clone();
        }
        selection
    }
}

pub fn run(dashboard: &Dashboard, config: &AppConfig, args: &ChartArgs, today: NaiveDate) -> Result<()> {
    let selection = args.selection(dashboard, config, today);
    let spec = dashboard.render(&selection);

    match &args.output {
        Some(path) => {
            write_chart(&spec, path)?;
            println!("{}", summary_table(&selection, &spec));
            println!(
                "{}",
                ui::style_text(
                    &format!("Chart written to {}", path.display()),
                    ui::StyleType::Subtle
                )
            );
        }
        None => println!("{}", serde_json::to_string_pretty(&spec.to_plotly())?),
    }
    Ok(())
}

/// Writes the Plotly figure for `spec` to `path`, replacing any previous file.
pub fn write_chart(spec: &ChartSpec, path: &Path) -> Result<()> {
    let figure = serde_json::to_string_pretty(&spec.to_plotly())?;
    std::fs::write(path, figure)
        .with_context(|| format!("Failed to write chart to {}", path.display()))?;
    info!("Wrote chart to {}", path.display());
    Ok(())
}

/// Per-panel point counts, date spans and y-ranges.
pub fn summary_table(selection: &Selection, spec: &ChartSpec) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Panel"),
        ui::header_cell("Points"),
        ui::header_cell("First"),
        ui::header_cell("Last"),
        ui::header_cell("Y min"),
        ui::header_cell("Y max"),
    ]);

    let price_label = format!("Price {}", spec.x_range);
    let indicator_label = format!("{} {}", selection.ticker, selection.column);
    for (label, panel) in [(price_label, &spec.price), (indicator_label, &spec.indicator)] {
        table.add_row(panel_row(label, panel));
    }
    table
}

fn panel_row(label: String, panel: &Panel) -> Vec<Cell> {
    let extent = panel.trace.series.extent();
    vec![
        Cell::new(ui::style_text(&label, ui::StyleType::Label)),
        ui::number_cell(panel.trace.series.len()),
        ui::format_optional_cell(extent.map(|(first, _)| first), |d| d.to_string()),
        ui::format_optional_cell(extent.map(|(_, last)| last), |d| d.to_string()),
        ui::format_optional_cell(panel.y_range.map(|b| b.min), |v| format!("{v:.2}")),
        ui::format_optional_cell(panel.y_range.map(|b| b.max), |v| format!("{v:.2}")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cot::{CotRow, CotTable};
    use crate::core::{Observation, Series, Tables};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn dashboard() -> Dashboard {
        let prices = Series::from_points(vec![
            Observation::new(date("2019-02-01"), 2.75),
            Observation::new(date("2019-02-04"), 2.62),
        ]);
        let cot = CotTable::from_rows(vec![CotRow {
            ticker: "NG".to_string(),
            date: date("2019-02-05"),
            values: [("Comm_Net".to_string(), -1200.0)].into_iter().collect(),
        }]);
        Dashboard::new(Arc::new(Tables { cot, prices }))
    }

    #[test]
    fn test_selection_defaults() {
        let dashboard = dashboard();
        let config = AppConfig::default();

        let selection = ChartArgs::default().selection(&dashboard, &config, date("2024-06-01"));

        assert_eq!(selection.from, date("2019-01-31"));
        assert_eq!(selection.to, date("2024-06-01"));
        assert_eq!(selection.ticker, "NG");
        assert_eq!(selection.column, "Comm_Net");
    }

    #[test]
    fn test_selection_overrides() {
        let dashboard = dashboard();
        let args = ChartArgs {
            from: Some(date("2019-02-02")),
            to: Some(date("2019-03-01")),
            ticker: Some("CL".to_string()),
            column: Some("Comm_Long".to_string()),
            output: None,
        };

        let selection = args.selection(&dashboard, &AppConfig::default(), date("2024-06-01"));

        assert_eq!(selection.interval().to_string(), "[2019-02-02, 2019-03-01)");
        assert_eq!(selection.ticker, "CL");
        assert_eq!(selection.column, "Comm_Long");
    }

    #[test]
    fn test_run_writes_chart_file() -> Result<()> {
        let dir = TempDir::new()?;
        let output = dir.path().join("chart.json");
        let args = ChartArgs {
            output: Some(output.clone()),
            ..ChartArgs::default()
        };

        run(&dashboard(), &AppConfig::default(), &args, date("2019-03-01"))?;

        let figure: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&output)?)?;
        assert_eq!(figure["data"][0]["y"], serde_json::json!([2.75, 2.62]));
        assert_eq!(figure["layout"]["yaxis"]["range"], serde_json::json!([2.62, 2.75]));
        Ok(())
    }

    #[test]
    fn test_summary_table_shows_na_for_empty_panel() {
        let dashboard = dashboard();
        let mut selection = dashboard.default_selection(date("2019-01-31"), date("2019-03-01"));
        selection.column = "Missing".to_string();
        let spec = dashboard.render(&selection);

        let rendered = summary_table(&selection, &spec).to_string();

        assert!(rendered.contains("2.62"));
        assert!(rendered.contains("2.75"));
        assert!(rendered.contains("N/A"));
    }
}
