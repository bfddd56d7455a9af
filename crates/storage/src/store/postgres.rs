use crate::{
    error::{Error, Result},
    store::RecipeStore,
};
use chrono::{DateTime, Utc};
use common::{Recipe, RecipeFields, RecipeId};
use faststr::FastStr;
use sqlx::{PgPool, migrate::MigrateDatabase, postgres::PgPoolOptions, prelude::FromRow};
use std::time::Duration;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, FromRow)]
struct RecipeRow {
    id:           FastStr,
    name:         FastStr,
    tags:         Vec<FastStr>,
    ingredients:  Vec<FastStr>,
    instructions: Vec<FastStr>,
    published_at: DateTime<Utc>,
}

impl TryFrom<RecipeRow> for Recipe {
    type Error = Error;

    fn try_from(row: RecipeRow) -> Result<Self> {
        Ok(Recipe {
            id:           row.id.trim().parse()?,
            name:         row.name,
            tags:         row.tags,
            ingredients:  row.ingredients,
            instructions: row.instructions,
            published_at: row.published_at,
        })
    }
}

fn into_recipes(rows: Vec<RecipeRow>) -> Result<Vec<Recipe>> {
    rows.into_iter().map(Recipe::try_from).collect()
}

fn text_array(values: &[FastStr]) -> Vec<&str> {
    values.iter().map(FastStr::as_str).collect()
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects, creating the database and running migrations when needed,
    /// and starts the background health check.
    pub async fn connect(database_url: &str) -> Result<Self> {
        if !sqlx::Postgres::database_exists(database_url).await? {
            sqlx::Postgres::create_database(database_url).await?;
        }

        debug!("Connecting to database");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        sqlx::migrate!("../../migrations")
            .run(&pool)
            .await
            .map_err(|e| Error::MigrateError(e.to_string().into()))?;

        let pool_clone = pool.clone();
        tokio::spawn(async move { Self::start_check_db_health(pool_clone, 120, 5).await });

        Ok(Self { pool })
    }

    /// Pings the database every `interval_sec`. Failures are logged only;
    /// requests keep surfacing their own errors.
    pub async fn start_check_db_health(pool: PgPool, interval_sec: u64, query_timeout_sec: u64) {
        let mut interval = time::interval(Duration::from_secs(interval_sec));
        let query_timeout = Duration::from_secs(query_timeout_sec);

        loop {
            interval.tick().await;

            let start = Instant::now();
            let result = time::timeout(query_timeout, async {
                sqlx::query("SELECT 1").execute(&pool).await
            })
            .await;

            match result {
                Ok(Ok(_)) => {
                    let elapsed = start.elapsed();
                    info!(elapsed=?elapsed, "database health check successful");
                }
                Ok(Err(e)) => warn!(error = %Error::SqlxError(e), "database health check failed"),
                Err(_) => warn!(error = %Error::DatabaseTimeOut, "database health check failed"),
            }
        }
    }
}

const SELECT_RECIPES: &str =
    "SELECT id, name, tags, ingredients, instructions, published_at FROM recipes";

impl RecipeStore for PgStore {
    async fn insert(&self, recipe: &Recipe) -> Result<()> {
        sqlx::query(
            r#"
        INSERT INTO recipes (id, name, tags, ingredients, instructions, published_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
        )
        .bind(recipe.id.to_string())
        .bind(recipe.name.as_str())
        .bind(text_array(&recipe.tags))
        .bind(text_array(&recipe.ingredients))
        .bind(text_array(&recipe.instructions))
        .bind(recipe.published_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_many(&self, recipes: &[Recipe]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        for recipe in recipes {
            sqlx::query(
                r#"
            INSERT INTO recipes (id, name, tags, ingredients, instructions, published_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
            )
            .bind(recipe.id.to_string())
            .bind(recipe.name.as_str())
            .bind(text_array(&recipe.tags))
            .bind(text_array(&recipe.ingredients))
            .bind(text_array(&recipe.instructions))
            .bind(recipe.published_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(recipes.len())
    }

    async fn find_all(&self) -> Result<Vec<Recipe>> {
        // No ORDER BY: callers get the table's natural order.
        let rows = sqlx::query_as::<_, RecipeRow>(SELECT_RECIPES)
            .fetch_all(&self.pool)
            .await?;
        into_recipes(rows)
    }

    async fn find_by_id(&self, id: &RecipeId) -> Result<Option<Recipe>> {
        let row = sqlx::query_as::<_, RecipeRow>(&format!("{SELECT_RECIPES} WHERE id = $1"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Recipe::try_from).transpose()
    }

    async fn update(&self, id: &RecipeId, fields: &RecipeFields) -> Result<bool> {
        let res = sqlx::query(
            r#"
        UPDATE recipes
        SET name = $2, instructions = $3, ingredients = $4, tags = $5
        WHERE id = $1
        "#,
        )
        .bind(id.to_string())
        .bind(fields.name.as_str())
        .bind(text_array(&fields.instructions))
        .bind(text_array(&fields.ingredients))
        .bind(text_array(&fields.tags))
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete(&self, id: &RecipeId) -> Result<bool> {
        let res = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, RecipeRow>(&format!(
            r#"{SELECT_RECIPES}
        WHERE EXISTS (
            SELECT 1 FROM unnest(tags) AS t
            WHERE lower(unaccent(t)) = lower(unaccent($1))
        )"#
        ))
        .bind(tag)
        .fetch_all(&self.pool)
        .await?;
        into_recipes(rows)
    }
}
