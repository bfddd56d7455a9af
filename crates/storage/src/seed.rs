use crate::{Storage, cache::KVCache, error::Result, store::RecipeStore};
use chrono::{DateTime, Utc};
use common::{Recipe, RecipeFields};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedRecipe {
    #[serde(flatten)]
    fields:       RecipeFields,
    published_at: Option<DateTime<Utc>>,
}

/// Parses a JSON array of recipes for seeding.
///
/// Every entry gets a fresh id whatever the file says; `publishedAt` is kept
/// when present and stamped with the current time otherwise.
pub fn parse_seed(json: &str) -> Result<Vec<Recipe>> {
    let entries: Vec<SeedRecipe> = serde_json::from_str(json)?;
    let now = Utc::now();
    Ok(entries
        .into_iter()
        .map(|e| Recipe::with_published_at(e.fields, e.published_at.unwrap_or(now)))
        .collect())
}

impl<S: RecipeStore, C: KVCache> Storage<S, C> {
    /// Bulk-inserts `recipes` and drops the list snapshot.
    pub async fn seed(&self, recipes: &[Recipe]) -> Result<usize> {
        let inserted = self.store.insert_many(recipes).await?;
        info!(inserted, "seeded recipes");
        self.invalidate_list().await?;
        Ok(inserted)
    }
}
