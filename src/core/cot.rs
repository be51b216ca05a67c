//! Commitment of Traders table and indicator selection

use crate::core::error::{DashError, KeyKind, Result};
use crate::core::series::{Observation, Series};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// One (ticker, date) row of named indicator values.
#[derive(Debug, Clone, PartialEq)]
pub struct CotRow {
    pub ticker: String,
    pub date: NaiveDate,
    pub values: BTreeMap<String, f64>,
}

/// Indicator rows keyed by ticker then date. The column set is fixed when
/// the table is built.
#[derive(Debug, Clone, Default)]
pub struct CotTable {
    columns: Vec<String>,
    rows: BTreeMap<String, BTreeMap<NaiveDate, Vec<f64>>>,
}

impl CotTable {
    /// Builds a table whose columns are the union of the row columns. Cells a
    /// row does not carry are NaN. A repeated (ticker, date) key keeps the last row.
    pub fn from_rows(rows: impl IntoIterator<Item = CotRow>) -> Self {
        let rows: Vec<CotRow> = rows.into_iter().collect();
        let columns: Vec<String> = rows
            .iter()
            .flat_map(|r| r.values.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut table = CotTable {
            columns,
            rows: BTreeMap::new(),
        };
        for row in rows {
            let values = table
                .columns
                .iter()
                .map(|c| row.values.get(c).copied().unwrap_or(f64::NAN))
                .collect();
            table
                .rows
                .entry(row.ticker)
                .or_default()
                .insert(row.date, values);
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Distinct tickers, in key order.
    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn contains_ticker(&self, ticker: &str) -> bool {
        self.rows.contains_key(ticker)
    }

    /// Number of dates recorded for `ticker`, zero when absent.
    pub fn row_count(&self, ticker: &str) -> usize {
        self.rows.get(ticker).map_or(0, BTreeMap::len)
    }

    pub fn len(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates all rows back out in (ticker, date) order.
    pub fn rows(&self) -> impl Iterator<Item = CotRow> + '_ {
        self.rows.iter().flat_map(move |(ticker, by_date)| {
            by_date.iter().map(move |(date, values)| CotRow {
                ticker: ticker.clone(),
                date: *date,
                values: self
                    .columns
                    .iter()
                    .cloned()
                    .zip(values.iter().copied())
                    .filter(|(_, v)| !v.is_nan())
                    .collect(),
            })
        })
    }

    /// Full date-ordered history of `column` for `ticker`.
    pub fn select(&self, ticker: &str, column: &str) -> Result<Series> {
        let by_date = self.rows.get(ticker).ok_or_else(|| DashError::KeyNotFound {
            kind: KeyKind::Ticker,
            key: ticker.to_string(),
        })?;
        let index = self
            .columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| DashError::KeyNotFound {
                kind: KeyKind::Column,
                key: column.to_string(),
            })?;

        debug!(ticker, column, rows = by_date.len(), "Selected COT series");
        Ok(Series::from_sorted(
            by_date
                .iter()
                .map(|(date, values)| Observation::new(*date, values[index]))
                .collect(),
        ))
    }
}

/// Free-function form of [`CotTable::select`].
pub fn select(table: &CotTable, ticker: &str, column: &str) -> Result<Series> {
    table.select(ticker, column)
}
