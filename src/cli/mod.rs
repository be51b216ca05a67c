pub mod chart;
pub mod options;
pub mod session;
pub mod setup;
pub mod ui;

use crate::core::config::AppConfig;
use crate::core::{Dashboard, TableSource};
use anyhow::{Context, Result};

/// Loads the store behind `config` and wraps it in a dashboard.
///
/// A missing or unreadable store ends the run. The error is returned with
/// its cause attached and is reported once, by the caller.
pub async fn load_dashboard(source: &dyn TableSource, config: &AppConfig) -> Result<Dashboard> {
    let path = config.store_path();
    let spinner = ui::new_spinner(&format!("Loading {}", path.display()));
    let result = source.load(&path).await;
    spinner.finish_and_clear();

    let tables =
        result.with_context(|| format!("Cannot start dashboard from {}", path.display()))?;

    Ok(Dashboard::new(tables).with_height(config.chart.height))
}
