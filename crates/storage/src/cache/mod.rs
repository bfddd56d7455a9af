pub mod lru;
pub mod redis;

use crate::error::Result;
use faststr::FastStr;
use self::lru::LocalCache;
use self::redis::RedisCache;

/// String-valued cache with explicit invalidation and no expiry.
///
/// A miss is `Ok(None)`; `Err` is reserved for the cache being unreachable
/// or otherwise faulted. `invalidate` on an absent key succeeds.
pub trait KVCache: Clone + Send + Sync + 'static {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<FastStr>>> + Send;

    fn set(&self, key: &str, value: FastStr) -> impl Future<Output = Result<()>> + Send;

    fn invalidate(&self, key: &str) -> impl Future<Output = Result<()>> + Send;
}

/// The cache picked at startup: Redis when configured, otherwise in-process.
#[derive(Clone)]
pub enum Cache {
    Local(LocalCache),
    Redis(RedisCache),
}

impl Cache {
    pub fn kind(&self) -> &'static str {
        match self {
            Cache::Local(_) => "local",
            Cache::Redis(_) => "redis",
        }
    }
}

impl KVCache for Cache {
    async fn get(&self, key: &str) -> Result<Option<FastStr>> {
        match self {
            Cache::Local(c) => c.get(key).await,
            Cache::Redis(c) => c.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: FastStr) -> Result<()> {
        match self {
            Cache::Local(c) => c.set(key, value).await,
            Cache::Redis(c) => c.set(key, value).await,
        }
    }

    async fn invalidate(&self, key: &str) -> Result<()> {
        match self {
            Cache::Local(c) => c.invalidate(key).await,
            Cache::Redis(c) => c.invalidate(key).await,
        }
    }
}

impl From<LocalCache> for Cache {
    fn from(value: LocalCache) -> Self {
        Cache::Local(value)
    }
}

impl From<RedisCache> for Cache {
    fn from(value: RedisCache) -> Self {
        Cache::Redis(value)
    }
}
