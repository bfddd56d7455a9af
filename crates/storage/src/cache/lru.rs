use crate::{cache::KVCache, error::Result};
use faststr::FastStr;
use moka::future::Cache;
use std::sync::Arc;

/// In-process cache used when no Redis is configured.
#[derive(Clone)]
pub struct LocalCache(Arc<Cache<FastStr, FastStr>>);

impl Default for LocalCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalCache {
    pub fn new() -> Self {
        // Entries live until invalidated: no time_to_live here.
        Self(Arc::new(Cache::builder().max_capacity(100).build()))
    }
}

impl KVCache for LocalCache {
    async fn get(&self, k: &str) -> Result<Option<FastStr>> {
        Ok(self.0.get(k).await)
    }

    async fn invalidate(&self, k: &str) -> Result<()> {
        self.0.invalidate(k).await;
        Ok(())
    }

    async fn set(&self, key: &str, value: FastStr) -> Result<()> {
        self.0.insert(key.to_owned().into(), value).await;
        Ok(())
    }
}
