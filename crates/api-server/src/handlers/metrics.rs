use crate::metrics::render_metrics;
use reqwest::StatusCode;
use volo_http::{
    response::Response,
    server::{IntoResponse, Router, route::get},
};

async fn metrics_handler() -> Response {
    match render_metrics() {
        Some(body) => (StatusCode::OK, body).into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics disabled").into_response(),
    }
}

pub fn metrics_router() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}
