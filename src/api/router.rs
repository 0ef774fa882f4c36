use std::sync::Arc;

use axum::{
    http::Method,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, MethodRouter},
    Router,
};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use super::health;
use super::middleware::{
    logging_middleware, metrics_middleware, response_cache_middleware, ResponseCacheLayer,
};
use super::state::AppState;
use super::v1;
use crate::domain::response_cache::{CacheMetadataRegistry, CacheOptions};
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};
use crate::infrastructure::services::ResponseCacheInterceptor;

pub const HEALTH: &str = "health";

/// Router under construction together with the cache metadata of its routes
///
/// Every handler is registered once, with its route and its cache options in
/// the same call, so the two never drift apart.
#[derive(Debug, Default)]
pub struct CachedRoutes {
    router: Router<AppState>,
    registry: CacheMetadataRegistry,
}

impl CachedRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers controller-wide cache options
    pub fn controller(mut self, name: &str, options: CacheOptions) -> Self {
        self.registry = self.registry.controller(name, options);
        self
    }

    /// Adds a handler and its cache options
    ///
    /// `method` must be the method `handler` answers to. Routing the same
    /// path again merges the method routers.
    pub fn route(
        mut self,
        method: Method,
        path: &str,
        controller: &str,
        options: CacheOptions,
        handler: MethodRouter<AppState>,
    ) -> Self {
        self.registry = self.registry.route(method, path, controller, options);
        self.router = self.router.route(path, handler);
        self
    }

    pub fn registry(&self) -> &CacheMetadataRegistry {
        &self.registry
    }

    pub fn into_parts(self) -> (Router<AppState>, CacheMetadataRegistry) {
        (self.router, self.registry)
    }

    /// Installs the response cache on every registered route and binds state
    pub fn build(self, state: AppState) -> Router {
        let (router, registry) = self.into_parts();

        let interceptor = ResponseCacheInterceptor::with_config(
            state.cache.clone(),
            Arc::new(registry),
            state.response_cache.clone(),
        );
        let layer = ResponseCacheLayer::new(Arc::new(interceptor), state.max_body_bytes);

        router
            .route_layer(from_fn_with_state(layer, response_cache_middleware))
            .with_state(state)
    }
}

fn health_routes(routes: CachedRoutes) -> CachedRoutes {
    routes
        .controller(HEALTH, CacheOptions::new().bypass())
        .route(
            Method::GET,
            "/health",
            HEALTH,
            CacheOptions::new(),
            get(health::health_check),
        )
        .route(
            Method::GET,
            "/ready",
            HEALTH,
            CacheOptions::new(),
            get(health::ready_check),
        )
        .route(
            Method::GET,
            "/live",
            HEALTH,
            CacheOptions::new(),
            get(health::live_check),
        )
}

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    create_router_with_metrics(state, None, "/metrics")
}

/// Create the full router, exposing Prometheus metrics when a handle is given
pub fn create_router_with_metrics(
    state: AppState,
    metrics: Option<PrometheusMetrics>,
    metrics_path: &str,
) -> Router {
    let routes = v1::register(health_routes(CachedRoutes::new()));
    let mut router = routes.build(state);

    // Scrapes stay outside the response cache
    if let Some(metrics) = metrics {
        router = router.merge(create_metrics_router(metrics, metrics_path));
    }

    router
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
