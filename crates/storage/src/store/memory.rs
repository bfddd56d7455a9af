use crate::{error::Result, store::RecipeStore};
use common::{Recipe, RecipeFields, RecipeId, text::tags_match};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Insertion-ordered store kept in process memory.
#[derive(Clone, Default)]
pub struct MemoryStore(Arc<RwLock<Vec<Recipe>>>);

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.0.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.0.read().await.is_empty()
    }
}

impl RecipeStore for MemoryStore {
    async fn insert(&self, recipe: &Recipe) -> Result<()> {
        self.0.write().await.push(recipe.clone());
        Ok(())
    }

    async fn insert_many(&self, recipes: &[Recipe]) -> Result<usize> {
        self.0.write().await.extend_from_slice(recipes);
        Ok(recipes.len())
    }

    async fn find_all(&self) -> Result<Vec<Recipe>> {
        Ok(self.0.read().await.clone())
    }

    async fn find_by_id(&self, id: &RecipeId) -> Result<Option<Recipe>> {
        Ok(self.0.read().await.iter().find(|r| r.id == *id).cloned())
    }

    async fn update(&self, id: &RecipeId, fields: &RecipeFields) -> Result<bool> {
        let mut recipes = self.0.write().await;
        match recipes.iter_mut().find(|r| r.id == *id) {
            Some(recipe) => {
                recipe.apply(fields);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &RecipeId) -> Result<bool> {
        let mut recipes = self.0.write().await;
        let before = recipes.len();
        recipes.retain(|r| r.id != *id);
        Ok(recipes.len() != before)
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Recipe>> {
        Ok(self
            .0
            .read()
            .await
            .iter()
            .filter(|r| r.tags.iter().any(|t| tags_match(t, tag)))
            .cloned()
            .collect())
    }
}
