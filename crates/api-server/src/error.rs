use faststr::FastStr;
use reqwest::StatusCode;
use serde_json::json;
use thiserror::Error;
use tracing::error;
use volo_http::{
    response::Response,
    server::{IntoResponse, extract::Json},
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid Request Body: {0}")]
    InvalidRequestBody(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] storage::error::Error),

    #[error("{0}")]
    Unauthorized(FastStr),

    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("failed to fetch signing keys: {0}")]
    Jwks(#[from] reqwest::Error),

    #[error("faild to build client")]
    FailedToBuildClient,

    #[error("server error: {0}")]
    Server(FastStr),

    #[error("{0}")]
    MsgError(&'static str),
}

/// How an error is reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ClientInput,
    NotFound,
    Unauthorized,
    Infrastructure,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidRequestBody(_) => ErrorKind::ClientInput,
            Error::Storage(e) if e.is_client_error() => ErrorKind::ClientInput,
            Error::Storage(e) if e.is_not_found() => ErrorKind::NotFound,
            Error::Unauthorized(_) | Error::InvalidToken(_) => ErrorKind::Unauthorized,
            _ => ErrorKind::Infrastructure,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::ClientInput => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Infrastructure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text sent back to the client. Infrastructure details stay in the logs.
    pub fn message(&self) -> FastStr {
        match self.kind() {
            ErrorKind::NotFound => FastStr::from_static_str("Recipe not found"),
            ErrorKind::Infrastructure => FastStr::from_static_str("Internal server error"),
            _ => self.to_string().into(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if self.kind() == ErrorKind::Infrastructure {
            error!(error = %self, "request failed");
        }
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use common::RecipeId;

    #[test]
    fn test_error_kinds() {
        let bad_id = "1".parse::<RecipeId>().unwrap_err();
        let bad_id = Error::Storage(bad_id.into());
        assert_eq!(bad_id.status(), StatusCode::BAD_REQUEST);

        let not_found = Error::Storage(storage::error::Error::NotFound(RecipeId::new()));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.message().as_str(), "Recipe not found");

        let body = serde_json::from_str::<common::RecipeFields>("").unwrap_err();
        assert_eq!(Error::from(body).kind(), ErrorKind::ClientInput);

        let infra = Error::Storage(storage::error::Error::DatabaseTimeOut);
        assert_eq!(infra.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(infra.message().as_str(), "Internal server error");

        assert_eq!(
            Error::Unauthorized("missing bearer token".into()).status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
