//! On-disk table store
//!
//! Tables live in a fjall keyspace, one partition per table. Price rows are
//! keyed by ISO date, COT rows by ticker and date. Values are JSON objects
//! of named numeric columns.

pub mod codec;

use crate::core::cot::{CotRow, CotTable};
use crate::core::error::{DashError, Result};
use crate::core::series::{Observation, Series};
use anyhow::Context;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Names of the tables and the price column inside a store.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct StoreLayout {
    pub price_table: String,
    pub cot_table: String,
    pub price_column: String,
}

impl Default for StoreLayout {
    fn default() -> Self {
        StoreLayout {
            price_table: "natgas".to_string(),
            cot_table: "natgas_cots".to_string(),
            price_column: "Close".to_string(),
        }
    }
}

/// Marker file fjall writes at the root of every keyspace.
const KEYSPACE_MARKER: &str = "version";

/// Reads both tables from the store at `path`.
///
/// Opening a fjall keyspace creates one when none exists, so `path` must
/// already hold a keyspace; anything else is rejected before it is touched.
pub fn load(path: &Path, layout: &StoreLayout) -> Result<(CotTable, Series)> {
    if !path.exists() {
        return Err(DashError::data_unavailable(path, "store does not exist"));
    }
    if !path.is_dir() || !path.join(KEYSPACE_MARKER).is_file() {
        return Err(DashError::data_unavailable(path, "not a table store"));
    }

    let keyspace = fjall::Config::new(path)
        .open()
        .map_err(|e| DashError::data_unavailable(path, e))?;
    let reader = TableReader {
        path,
        keyspace: &keyspace,
    };

    let prices = reader.read_prices(&layout.price_table, &layout.price_column)?;
    let cot = reader.read_cot(&layout.cot_table)?;
    info!(
        path = %path.display(),
        prices = prices.len(),
        cot_rows = cot.len(),
        "Loaded tables"
    );
    Ok((cot, prices))
}

struct TableReader<'a> {
    path: &'a Path,
    keyspace: &'a Keyspace,
}

impl TableReader<'_> {
    fn unavailable(&self, reason: impl ToString) -> DashError {
        DashError::data_unavailable(self.path, reason)
    }

    fn partition(&self, name: &str) -> Result<PartitionHandle> {
        if !self.keyspace.partition_exists(name) {
            return Err(self.unavailable(format!("table '{name}' is missing")));
        }
        self.keyspace
            .open_partition(name, PartitionCreateOptions::default())
            .map_err(|e| self.unavailable(e))
    }

    fn read_prices(&self, table: &str, column: &str) -> Result<Series> {
        let partition = self.partition(table)?;
        let mut points = Vec::new();
        for item in partition.iter() {
            let (key, value) = item.map_err(|e| self.unavailable(e))?;
            let date = std::str::from_utf8(&key)
                .ok()
                .and_then(codec::parse_date)
                .ok_or_else(|| self.unavailable(format!("bad date key in '{table}'")))?;
            let row = codec::decode_row(&value)
                .map_err(|e| self.unavailable(format!("bad row in '{table}' at {date}: {e}")))?;
            let price = row.get(column).copied().ok_or_else(|| {
                self.unavailable(format!("column '{column}' missing in '{table}' at {date}"))
            })?;
            points.push(Observation::new(date, price));
        }
        debug!(table, rows = points.len(), "Read price table");
        Ok(Series::from_points(points))
    }

    fn read_cot(&self, table: &str) -> Result<CotTable> {
        let partition = self.partition(table)?;
        let mut raw = Vec::new();
        for item in partition.iter() {
            let (key, value) = item.map_err(|e| self.unavailable(e))?;
            let (ticker, date_text) = codec::split_cot_key(&key)
                .ok_or_else(|| self.unavailable(format!("bad key in '{table}'")))?;
            let values = codec::decode_row(&value).map_err(|e| {
                self.unavailable(format!("bad row in '{table}' for {ticker}: {e}"))
            })?;
            raw.push((ticker.to_string(), date_text.to_string(), values));
        }

        let date_texts: Vec<&str> = raw.iter().map(|(_, d, _)| d.as_str()).collect();
        let dates = codec::normalize_dates(&date_texts)
            .ok_or_else(|| self.unavailable(format!("date index of '{table}' is not temporal")))?;
        debug!(table, rows = raw.len(), "Read COT table");

        Ok(CotTable::from_rows(raw.into_iter().zip(dates).map(
            |((ticker, _, values), date)| CotRow {
                ticker,
                date,
                values,
            },
        )))
    }
}

/// Populates a store from in-memory tables.
pub struct StoreWriter {
    path: PathBuf,
    keyspace: Keyspace,
    layout: StoreLayout,
}

impl StoreWriter {
    pub fn create<P: AsRef<Path>>(path: P, layout: StoreLayout) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create store directory: {}", path.display()))?;
        let keyspace = fjall::Config::new(&path)
            .open()
            .with_context(|| format!("Failed to open store: {}", path.display()))?;
        Ok(Self {
            path,
            keyspace,
            layout,
        })
    }

    fn partition(&self, name: &str) -> anyhow::Result<PartitionHandle> {
        self.keyspace
            .open_partition(name, PartitionCreateOptions::default())
            .with_context(|| format!("Failed to open table '{name}' in {}", self.path.display()))
    }

    /// Writes a price series under the configured price column.
    pub fn write_prices(&self, prices: &Series) -> anyhow::Result<()> {
        let column = self.layout.price_column.clone();
        self.write_price_rows(prices.points().iter().map(|p| {
            let mut row = BTreeMap::new();
            row.insert(column.clone(), p.value);
            (p.date, row)
        }))
    }

    pub fn write_price_rows(
        &self,
        rows: impl IntoIterator<Item = (chrono::NaiveDate, BTreeMap<String, f64>)>,
    ) -> anyhow::Result<()> {
        let partition = self.partition(&self.layout.price_table)?;
        for (date, values) in rows {
            partition.insert(codec::price_key(date), codec::encode_row(&values)?)?;
        }
        Ok(())
    }

    pub fn write_cot(&self, table: &CotTable) -> anyhow::Result<()> {
        self.write_cot_rows(
            table
                .rows()
                .map(|r| (r.ticker, r.date.format("%Y-%m-%d").to_string(), r.values)),
        )
    }

    /// Writes COT rows with the date text stored exactly as given.
    pub fn write_cot_rows(
        &self,
        rows: impl IntoIterator<Item = (String, String, BTreeMap<String, f64>)>,
    ) -> anyhow::Result<()> {
        let partition = self.partition(&self.layout.cot_table)?;
        for (ticker, date_text, values) in rows {
            partition.insert(
                codec::cot_key(&ticker, &date_text),
                codec::encode_row(&values)?,
            )?;
        }
        Ok(())
    }

    /// Flushes the journal to disk and closes the store.
    pub fn finish(self) -> anyhow::Result<()> {
        self.keyspace
            .persist(PersistMode::SyncAll)
            .with_context(|| format!("Failed to persist store: {}", self.path.display()))?;
        debug!(path = %self.path.display(), "Store written");
        Ok(())
    }
}
