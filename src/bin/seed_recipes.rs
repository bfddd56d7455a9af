use anyhow::{Context, Result};
use dotenvy::dotenv;
use storage::{LocalCache, PgStore, RedisCache, Storage};
use tracing::info;

const DEFAULT_SEED_FILE: &str = "data/recipes.json";

/// Loads a JSON array of recipes into the database and drops the cached list.
///
/// Usage: `seed-recipes [path]`, defaulting to `data/recipes.json`.
#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let _guard = common::logging_stdout_with(&["sqlx=warn"]);

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SEED_FILE.to_owned());
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let json = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("reading {path}"))?;
    let recipes = storage::parse_seed(&json)?;
    info!(path, count = recipes.len(), "parsed seed file");

    let store = PgStore::connect(&database_url).await?;
    let inserted = match std::env::var("REDIS_URL") {
        Ok(url) => {
            let storage = Storage::new(store, RedisCache::connect(&url).await?);
            storage.seed(&recipes).await?
        }
        Err(_) => Storage::new(store, LocalCache::new()).seed(&recipes).await?,
    };

    info!(inserted, "Inserted recipes");
    Ok(())
}
