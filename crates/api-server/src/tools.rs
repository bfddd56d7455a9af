use crate::error::{Error, Result};
use reqwest::Client as ReqwestClient;
use std::time::Duration;

#[inline]
pub fn build_http_client() -> Result<ReqwestClient> {
    let builder = ReqwestClient::builder();
    let timeout = 10;
    let client = builder
        .connect_timeout(Duration::from_secs(timeout))
        .timeout(Duration::from_secs(timeout))
        .build()
        .map_err(|_| Error::FailedToBuildClient)?;
    Ok(client)
}

/// Collapses whatever follows `/recipes/` so metric labels stay bounded.
///
/// `/recipes/644bf0e2d9d9e29d5c6efad8` and `/recipes/1` both become
/// `/recipes/{id}`; `/recipes/search` is kept.
pub fn normalize_path(path: &str) -> String {
    match path.trim_end_matches('/').strip_prefix("/recipes/") {
        Some("search") => "/recipes/search".to_owned(),
        Some(_) => "/recipes/{id}".to_owned(),
        None => path.to_owned(),
    }
}

#[inline]
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
