use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Process-lifetime memo of values keyed by `K`. Values are shared behind `Arc`.
#[derive(Clone)]
pub struct Cache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    inner: Arc<Mutex<HashMap<K, Arc<V>>>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Send + Sync + Debug,
    V: Send + Sync,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the cached value or computes it with `init`. The lock is held
    /// while `init` runs so concurrent callers compute it once; errors are
    /// returned without being cached.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, init: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let mut cache = self.inner.lock().await;
        if let Some(value) = cache.get(&key) {
            debug!("Cache HIT for key: {:?}", key);
            return Ok(Arc::clone(value));
        }
        debug!("Cache MISS for key: {:?}", key);
        let value = Arc::new(init().await?);
        debug!("Cache PUT for key: {:?}", key);
        cache.insert(key, Arc::clone(&value));
        Ok(value)
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash + Send + Sync + Debug,
    V: Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}
