use crate::id::RecipeId;
use chrono::{DateTime, Utc};
use faststr::FastStr;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id:           RecipeId,
    pub name:         FastStr,
    #[serde(default)]
    pub tags:         Vec<FastStr>,
    #[serde(default)]
    pub ingredients:  Vec<FastStr>,
    #[serde(default)]
    pub instructions: Vec<FastStr>,
    pub published_at: DateTime<Utc>,
}

/// The client-writable part of a recipe.
///
/// `id` and `publishedAt` in a request body are ignored; both are stamped by
/// the server on create and never change afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecipeFields {
    pub name:         FastStr,
    #[serde(default)]
    pub tags:         Vec<FastStr>,
    #[serde(default)]
    pub ingredients:  Vec<FastStr>,
    #[serde(default)]
    pub instructions: Vec<FastStr>,
}

impl Recipe {
    pub fn new(fields: RecipeFields) -> Self {
        Self::with_published_at(fields, Utc::now())
    }

    pub fn with_published_at(fields: RecipeFields, published_at: DateTime<Utc>) -> Self {
        Self {
            id: RecipeId::new(),
            name: fields.name,
            tags: fields.tags,
            ingredients: fields.ingredients,
            instructions: fields.instructions,
            published_at,
        }
    }

    /// Overwrites the mutable fields, keeping `id` and `published_at`.
    pub fn apply(&mut self, fields: &RecipeFields) {
        self.name = fields.name.clone();
        self.tags = fields.tags.clone();
        self.ingredients = fields.ingredients.clone();
        self.instructions = fields.instructions.clone();
    }

    pub fn fields(&self) -> RecipeFields {
        RecipeFields {
            name:         self.name.clone(),
            tags:         self.tags.clone(),
            ingredients:  self.ingredients.clone(),
            instructions: self.instructions.clone(),
        }
    }
}
