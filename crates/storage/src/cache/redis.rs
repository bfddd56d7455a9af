use crate::{cache::KVCache, error::Result};
use faststr::FastStr;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info};

/// Redis-backed cache; the connection manager reconnects on its own.
#[derive(Clone)]
pub struct RedisCache(ConnectionManager);

impl RedisCache {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)?;
        let mut manager = ConnectionManager::new(client).await?;

        let pong: String = redis::cmd("PING").query_async(&mut manager).await?;
        info!(reply = %pong, "connected to redis");

        Ok(Self(manager))
    }
}

impl KVCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<FastStr>> {
        let mut conn = self.0.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value.map(FastStr::from))
    }

    async fn set(&self, key: &str, value: FastStr) -> Result<()> {
        let mut conn = self.0.clone();
        conn.set::<_, _, ()>(key, value.as_str()).await?;
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<()> {
        let mut conn = self.0.clone();
        let removed: i64 = conn.del(key).await?;
        debug!(key, removed, "redis DEL");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    async fn setup_redis() -> Option<RedisCache> {
        let redis_url = env::var("REDIS_URL").ok()?;
        RedisCache::connect(&redis_url).await.ok()
    }

    // Runs only when REDIS_URL points at a reachable server.
    #[tokio::test]
    async fn test_redis_cache() {
        let Some(cache) = setup_redis().await else {
            return;
        };
        let key = format!("recipes-test-{}", common::RecipeId::new());

        assert_eq!(cache.get(&key).await.unwrap(), None);

        cache.set(&key, r#"[{"name":"Ramen"}]"#.into()).await.unwrap();
        assert_eq!(
            cache.get(&key).await.unwrap().as_deref(),
            Some(r#"[{"name":"Ramen"}]"#)
        );

        cache.invalidate(&key).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), None);
        // deleting an absent key is not an error
        cache.invalidate(&key).await.unwrap();
    }
}
