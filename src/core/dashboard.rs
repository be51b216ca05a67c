//! Filter → select → compose pipeline run on every interaction

use crate::core::chart::{self, ChartSpec};
use crate::core::range::{self, DateInterval};
use crate::core::series::Series;
use crate::core::source::Tables;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, warn};

/// The user's current filter inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub ticker: String,
    pub column: String,
}

impl Selection {
    pub fn interval(&self) -> DateInterval {
        DateInterval::new(self.from, self.to)
    }
}

/// Values available to populate the selectors.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardOptions {
    pub tickers: Vec<String>,
    pub columns: Vec<String>,
    pub price_extent: Option<(NaiveDate, NaiveDate)>,
}

#[derive(Debug)]
pub struct Dashboard {
    tables: Arc<Tables>,
    height: u32,
}

impl Dashboard {
    pub fn new(tables: Arc<Tables>) -> Self {
        Self {
            tables,
            height: chart::DEFAULT_HEIGHT,
        }
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn options(&self) -> DashboardOptions {
        DashboardOptions {
            tickers: self.tables.cot.tickers().map(str::to_string).collect(),
            columns: self.tables.cot.columns().to_vec(),
            price_extent: self.tables.prices.extent(),
        }
    }

    /// Initial selection: the given dates with the first ticker and column.
    pub fn default_selection(&self, from: NaiveDate, to: NaiveDate) -> Selection {
        Selection {
            from,
            to,
            ticker: self
                .tables
                .cot
                .tickers()
                .next()
                .unwrap_or_default()
                .to_string(),
            column: self
                .tables
                .cot
                .columns()
                .first()
                .cloned()
                .unwrap_or_default(),
        }
    }

    /// Recomputes the chart for `selection`.
    ///
    /// A ticker or column missing from the COT table leaves the indicator
    /// panel empty instead of failing the whole chart.
    pub fn render(&self, selection: &Selection) -> ChartSpec {
        let interval = selection.interval();
        let prices = range::filter(&self.tables.prices, interval);
        if prices.is_empty() {
            debug!(%interval, "No prices in range");
        }

        let indicator = match self.tables.cot.select(&selection.ticker, &selection.column) {
            Ok(series) => series,
            Err(e) => {
                warn!(error = %e, "Showing empty indicator panel");
                Series::default()
            }
        };

        debug!(
            %interval,
            ticker = %selection.ticker,
            column = %selection.column,
            prices = prices.len(),
            indicator = indicator.len(),
            "Composing chart"
        );
        chart::compose(&prices, &indicator, interval).with_height(self.height)
    }
}
