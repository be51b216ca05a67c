pub mod cli;
pub mod core;
pub mod store;

use crate::cli::chart::ChartArgs;
use crate::core::config::AppConfig;
use crate::core::{CachingTableSource, FjallTableSource};
use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info};

const DEFAULT_CHART_OUTPUT: &str = "chart.json";

pub enum AppCommand {
    Options,
    Chart(ChartArgs),
    Session { output: Option<PathBuf> },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Gas dashboard starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let source = CachingTableSource::new(FjallTableSource::new(config.tables.clone()));
    let dashboard = cli::load_dashboard(&source, &config).await?;
    let today = chrono::Local::now().date_naive();

    match command {
        AppCommand::Options => cli::options::run(&dashboard),
        AppCommand::Chart(args) => cli::chart::run(&dashboard, &config, &args, today),
        AppCommand::Session { output } => {
            let output = output
                .or_else(|| config.chart.output.as_ref().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CHART_OUTPUT));
            let selection = dashboard.default_selection(config.default_from, today);
            let mut session = cli::session::Session::new(&dashboard, selection, output);
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            cli::session::run(&mut session, stdin).await
        }
    }
}
