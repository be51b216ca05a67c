//! Table loading abstractions

use crate::core::cache::Cache;
use crate::core::cot::CotTable;
use crate::core::error::Result;
use crate::core::series::Series;
use crate::store::{self, StoreLayout};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The two read-only tables behind the dashboard.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub cot: CotTable,
    pub prices: Series,
}

#[async_trait]
pub trait TableSource: Send + Sync {
    async fn load(&self, path: &Path) -> Result<Arc<Tables>>;
}

/// Reads tables from a fjall store.
pub struct FjallTableSource {
    layout: StoreLayout,
}

impl FjallTableSource {
    pub fn new(layout: StoreLayout) -> Self {
        Self { layout }
    }
}

#[async_trait]
impl TableSource for FjallTableSource {
    async fn load(&self, path: &Path) -> Result<Arc<Tables>> {
        let (cot, prices) = store::load(path, &self.layout)?;
        Ok(Arc::new(Tables { cot, prices }))
    }
}

/// Memoizes successful loads by path.
pub struct CachingTableSource<T: TableSource> {
    inner: T,
    cache: Cache<PathBuf, Arc<Tables>>,
}

impl<T: TableSource> CachingTableSource<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            cache: Cache::new(),
        }
    }
}

#[async_trait]
impl<T: TableSource> TableSource for CachingTableSource<T> {
    async fn load(&self, path: &Path) -> Result<Arc<Tables>> {
        let tables = self
            .cache
            .get_or_try_insert_with(path.to_path_buf(), || self.inner.load(path))
            .await?;
        Ok(Arc::clone(tables.as_ref()))
    }
}
