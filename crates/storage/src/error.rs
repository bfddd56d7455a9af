use common::RecipeId;
use faststr::FastStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("sqlx error: {0}")]
    SqlxError(#[from] sqlx::Error),
    #[error("database connection timeout")]
    DatabaseTimeOut,

    #[error("redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("serde error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("{0}")]
    InvalidId(#[from] common::error::Error),

    #[error("Recipe not found: {0}")]
    NotFound(RecipeId),

    #[error("error: {0}")]
    MsgError(FastStr),

    #[error("{0}")]
    MigrateError(FastStr),
}

impl Error {
    /// Caused by the caller's input rather than by the store or cache.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidId(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
