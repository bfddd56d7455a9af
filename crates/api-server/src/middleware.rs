use crate::{metrics::record_http_request, tools::normalize_path};
use faststr::FastStr;
use http::{
    HeaderValue, Method,
    header::{
        ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
        ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, HeaderMap, ORIGIN, VARY,
    },
};
use reqwest::StatusCode;
use std::{sync::Arc, time::Instant};
use tracing::debug;
use volo_http::{
    context::ServerContext,
    request::Request,
    response::Response,
    server::{IntoResponse, middleware::Next},
    utils::Extension,
};

pub const DEFAULT_ALLOW_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<FastStr>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: vec![FastStr::from_static_str(DEFAULT_ALLOW_ORIGIN)],
        }
    }
}

impl CorsConfig {
    /// Comma-separated origins, e.g. `http://localhost:5173,https://recipes.io`.
    pub fn from_origins(origins: &str) -> Self {
        Self {
            allow_origins: origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(|o| o.to_owned().into())
                .collect(),
        }
    }

    fn lists(&self, origin: &str) -> bool {
        self.allow_origins.iter().any(|o| o.as_str() == origin)
    }

    fn any_origin(&self) -> bool {
        self.lists("*")
    }

    /// Adds the CORS response headers when `origin` is allowed.
    ///
    /// Listed origins are echoed back with credentials allowed. A `*` entry
    /// lets every other origin through as a literal `*`, without credentials.
    pub fn apply(&self, origin: Option<&HeaderValue>, headers: &mut HeaderMap) {
        let Some(origin) = origin else {
            return;
        };
        if origin.to_str().is_ok_and(|o| o != "*" && self.lists(o)) {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
            headers.insert(
                ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        } else if self.any_origin() {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        } else {
            return;
        }
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Origin, Content-Length, Content-Type, Authorization"),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS"),
        );
        headers.insert(VARY, HeaderValue::from_static("Origin"));
    }
}

/// Answers preflight requests and decorates every response with CORS headers.
pub async fn cors(
    Extension(config): Extension<Arc<CorsConfig>>,
    cx: &mut ServerContext,
    req: Request,
    next: Next,
) -> Response {
    let origin = req.headers().get(ORIGIN).cloned();

    let mut resp = if *req.method() == Method::OPTIONS {
        debug!(origin = ?origin, "preflight request");
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(cx, req).await.into_response()
    };
    config.apply(origin.as_ref(), resp.headers_mut());
    resp
}

/// Counts requests per path and method and times the response.
pub async fn track_metrics(cx: &mut ServerContext, req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    let resp = next.run(cx, req).await.into_response();

    record_http_request(&method, &path, start.elapsed());
    resp
}
