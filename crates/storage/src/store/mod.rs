pub mod memory;
pub mod postgres;

use crate::error::Result;
use common::{Recipe, RecipeFields, RecipeId};
use self::memory::MemoryStore;
use self::postgres::PgStore;

/// The authoritative recipe collection.
///
/// `update` and `delete` report whether a document matched instead of
/// failing, so callers decide what "absent" means.
pub trait RecipeStore: Clone + Send + Sync + 'static {
    fn insert(&self, recipe: &Recipe) -> impl Future<Output = Result<()>> + Send;

    fn insert_many(&self, recipes: &[Recipe]) -> impl Future<Output = Result<usize>> + Send;

    /// Every recipe, unfiltered, in whatever order the store yields them.
    fn find_all(&self) -> impl Future<Output = Result<Vec<Recipe>>> + Send;

    fn find_by_id(&self, id: &RecipeId) -> impl Future<Output = Result<Option<Recipe>>> + Send;

    fn update(
        &self,
        id: &RecipeId,
        fields: &RecipeFields,
    ) -> impl Future<Output = Result<bool>> + Send;

    fn delete(&self, id: &RecipeId) -> impl Future<Output = Result<bool>> + Send;

    /// Recipes carrying `tag`, compared case- and accent-insensitively.
    fn find_by_tag(&self, tag: &str) -> impl Future<Output = Result<Vec<Recipe>>> + Send;
}

#[derive(Clone)]
pub enum Store {
    Postgres(PgStore),
    Memory(MemoryStore),
}

impl Store {
    pub fn kind(&self) -> &'static str {
        match self {
            Store::Postgres(_) => "postgres",
            Store::Memory(_) => "memory",
        }
    }
}

impl From<PgStore> for Store {
    fn from(value: PgStore) -> Self {
        Store::Postgres(value)
    }
}

impl From<MemoryStore> for Store {
    fn from(value: MemoryStore) -> Self {
        Store::Memory(value)
    }
}

impl RecipeStore for Store {
    async fn insert(&self, recipe: &Recipe) -> Result<()> {
        match self {
            Store::Postgres(s) => s.insert(recipe).await,
            Store::Memory(s) => s.insert(recipe).await,
        }
    }

    async fn insert_many(&self, recipes: &[Recipe]) -> Result<usize> {
        match self {
            Store::Postgres(s) => s.insert_many(recipes).await,
            Store::Memory(s) => s.insert_many(recipes).await,
        }
    }

    async fn find_all(&self) -> Result<Vec<Recipe>> {
        match self {
            Store::Postgres(s) => s.find_all().await,
            Store::Memory(s) => s.find_all().await,
        }
    }

    async fn find_by_id(&self, id: &RecipeId) -> Result<Option<Recipe>> {
        match self {
            Store::Postgres(s) => s.find_by_id(id).await,
            Store::Memory(s) => s.find_by_id(id).await,
        }
    }

    async fn update(&self, id: &RecipeId, fields: &RecipeFields) -> Result<bool> {
        match self {
            Store::Postgres(s) => s.update(id, fields).await,
            Store::Memory(s) => s.update(id, fields).await,
        }
    }

    async fn delete(&self, id: &RecipeId) -> Result<bool> {
        match self {
            Store::Postgres(s) => s.delete(id).await,
            Store::Memory(s) => s.delete(id).await,
        }
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Recipe>> {
        match self {
            Store::Postgres(s) => s.find_by_tag(tag).await,
            Store::Memory(s) => s.find_by_tag(tag).await,
        }
    }
}
