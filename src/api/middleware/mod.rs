//! API middleware components

pub mod cache;
pub mod logging;
pub mod metrics;

pub use cache::{
    response_cache_middleware, CachedResponse, HandlerFailure, ResponseCacheLayer, StreamingBody,
};
pub use logging::logging_middleware;
pub use metrics::metrics_middleware;
