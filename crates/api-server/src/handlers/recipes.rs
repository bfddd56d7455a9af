use crate::error::{Error, Result};
use bytes::Bytes;
use common::{Recipe, RecipeFields};
use faststr::FastStr;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use storage::Storage;
use tracing::debug;
use volo_http::{
    response::Response,
    server::{
        IntoResponse, Router,
        extract::{Json, Query},
        param::PathParams,
        route::get,
    },
    utils::Extension,
};

#[derive(Debug, Default, Deserialize)]
struct SearchParams {
    #[serde(default)]
    tag: FastStr,
}

#[inline]
fn ok_json<T: Serialize>(value: T) -> Response {
    (StatusCode::OK, Json(value)).into_response()
}

#[inline]
fn respond<T: Serialize>(result: Result<T>) -> Response {
    match result {
        Ok(value) => ok_json(value),
        Err(e) => e.into_response(),
    }
}

#[inline]
fn message(text: &'static str) -> serde_json::Value {
    json!({ "message": text })
}

/// Bodies are parsed by hand so that an empty or malformed body is a 400
/// carrying the parser's message.
#[inline]
fn parse_fields(body: &Bytes) -> Result<RecipeFields> {
    Ok(serde_json::from_slice(body)?)
}

async fn list_recipes_handler(Extension(storage): Extension<Storage>) -> Response {
    respond(storage.list_recipes().await.map_err(Error::from))
}

async fn search_recipes_handler(
    Extension(storage): Extension<Storage>,
    Query(params): Query<SearchParams>,
) -> Response {
    debug!(tag = %params.tag, "searching recipes");
    if params.tag.is_empty() {
        return ok_json(Vec::<Recipe>::new());
    }
    respond(storage.search_recipes(&params.tag).await.map_err(Error::from))
}

async fn get_recipe_handler(
    Extension(storage): Extension<Storage>,
    PathParams(id): PathParams<FastStr>,
) -> Response {
    respond(storage.get_recipe(&id).await.map_err(Error::from))
}

async fn create(storage: &Storage, body: &Bytes) -> Result<Recipe> {
    let fields = parse_fields(body)?;
    Ok(storage.create_recipe(fields).await?)
}

async fn update(storage: &Storage, id: &str, body: &Bytes) -> Result<serde_json::Value> {
    let fields = parse_fields(body)?;
    storage.update_recipe(id, &fields).await?;
    Ok(message("Recipe has been updated"))
}

async fn delete(storage: &Storage, id: &str) -> Result<serde_json::Value> {
    storage.delete_recipe(id).await?;
    Ok(message("Recipe has been deleted"))
}

async fn new_recipe_handler(Extension(storage): Extension<Storage>, body: Bytes) -> Response {
    respond(create(&storage, &body).await)
}

async fn update_recipe_handler(
    Extension(storage): Extension<Storage>,
    PathParams(id): PathParams<FastStr>,
    body: Bytes,
) -> Response {
    respond(update(&storage, &id, &body).await)
}

async fn delete_recipe_handler(
    Extension(storage): Extension<Storage>,
    PathParams(id): PathParams<FastStr>,
) -> Response {
    respond(delete(&storage, &id).await)
}

pub fn recipes_router() -> Router {
    Router::new()
        .route(
            "/recipes",
            get(list_recipes_handler).post(new_recipe_handler),
        )
        .route("/recipes/search", get(search_recipes_handler))
        .route(
            "/recipes/{:id}",
            get(get_recipe_handler)
                .put(update_recipe_handler)
                .delete(delete_recipe_handler),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fields() {
        let fields = parse_fields(&Bytes::from_static(br#"{"name": "New York Pizza"}"#)).unwrap();
        assert_eq!(fields.name.as_str(), "New York Pizza");

        for body in [&b""[..], b"null", b"{\"name\": 1}", b"{"] {
            let err = parse_fields(&Bytes::copy_from_slice(body)).unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }
}
