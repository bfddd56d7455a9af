mod config;

use anyhow::Result;
use api_server::{AppState, Authenticator};
use config::Config;
use dotenvy::dotenv;
use storage::{Cache, LocalCache, MemoryStore, PgStore, RecipeStore, RedisCache, Storage, Store};
use tracing::{info, warn};

async fn connect_store(database_url: Option<&str>) -> Result<Store> {
    match database_url {
        Some(url) => Ok(PgStore::connect(url).await?.into()),
        None => {
            warn!("DATABASE_URL not set, recipes are kept in memory only");
            Ok(MemoryStore::new().into())
        }
    }
}

async fn connect_cache(redis_url: Option<&str>) -> Result<Cache> {
    match redis_url {
        Some(url) => Ok(RedisCache::connect(url).await?.into()),
        None => {
            info!("REDIS_URL not set, caching recipes in process");
            Ok(LocalCache::new().into())
        }
    }
}

async fn seed_if_empty(storage: &Storage, path: &str) -> Result<()> {
    if !storage.store().find_all().await?.is_empty() {
        info!(path, "store already populated, skipping seed");
        return Ok(());
    }
    let recipes = storage::parse_seed(&tokio::fs::read_to_string(path).await?)?;
    storage.seed(&recipes).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let _guard = api_server::logging_stdout();

    let config = Config::from_env()?;

    let store = connect_store(config.database_url.as_deref()).await?;
    let cache = connect_cache(config.redis_url.as_deref()).await?;
    info!(store = store.kind(), cache = cache.kind(), "storage ready");
    let storage = Storage::new(store, cache);

    if let Some(path) = &config.seed_file {
        seed_if_empty(&storage, path).await?;
    }

    api_server::metrics::init_metrics();
    let auth = Authenticator::from_config(&config.auth)?;
    let state = AppState::new(storage, auth, config.cors);

    api_server::run_api_server(config.api_addr, state).await?;

    Ok(())
}
