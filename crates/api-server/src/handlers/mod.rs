mod metrics;
mod recipes;

pub use metrics::metrics_router;
pub use recipes::recipes_router;
