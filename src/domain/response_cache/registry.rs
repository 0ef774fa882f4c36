//! Route metadata registry for the response cache

use std::collections::HashMap;

use axum::http::Method;

use super::context::{RequestContext, RouteId, Transport};
use super::options::{CacheOptions, KeySource, TtlSource};

#[derive(Debug, Clone)]
struct RouteEntry {
    controller: String,
    options: CacheOptions,
}

/// Cache metadata for every registered route and controller
///
/// Populated while the router is assembled and read-only afterwards. Routes
/// that were never registered simply carry no metadata.
#[derive(Debug, Clone, Default)]
pub struct CacheMetadataRegistry {
    controllers: HashMap<String, CacheOptions>,
    routes: HashMap<RouteId, RouteEntry>,
}

impl CacheMetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers controller-wide defaults
    pub fn controller(mut self, name: impl Into<String>, options: CacheOptions) -> Self {
        self.controllers.insert(name.into(), options);
        self
    }

    /// Registers a handler and the controller it belongs to
    pub fn route(
        mut self,
        method: Method,
        path: impl Into<String>,
        controller: impl Into<String>,
        options: CacheOptions,
    ) -> Self {
        self.routes.insert(
            RouteId::new(method, path),
            RouteEntry {
                controller: controller.into(),
                options,
            },
        );
        self
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn controller_of(&self, route: &RouteId) -> Option<&str> {
        self.routes.get(route).map(|entry| entry.controller.as_str())
    }

    /// Builds the context for a request hitting `route`
    pub fn context_for(&self, route: RouteId, transport: Transport) -> RequestContext {
        let controller = self.controller_of(&route).map(str::to_string);
        let mut ctx = RequestContext::new(route, transport);
        ctx.controller = controller;
        ctx
    }

    pub fn handler_options(&self, ctx: &RequestContext) -> Option<&CacheOptions> {
        self.routes.get(&ctx.route).map(|entry| &entry.options)
    }

    pub fn controller_options(&self, ctx: &RequestContext) -> Option<&CacheOptions> {
        ctx.controller
            .as_deref()
            .and_then(|name| self.controllers.get(name))
    }

    /// True when bypass is set on the handler or on its controller
    pub fn is_bypassed(&self, ctx: &RequestContext) -> bool {
        [self.handler_options(ctx), self.controller_options(ctx)]
            .into_iter()
            .flatten()
            .any(|o| o.bypass == Some(true))
    }

    /// Explicit key source; only handlers may define one
    pub fn key_source(&self, ctx: &RequestContext) -> Option<&KeySource> {
        self.handler_options(ctx).and_then(|o| o.key.as_ref())
    }

    /// TTL override, handler first then controller
    pub fn ttl_source(&self, ctx: &RequestContext) -> Option<&TtlSource> {
        self.handler_options(ctx)
            .and_then(|o| o.ttl.as_ref())
            .or_else(|| self.controller_options(ctx).and_then(|o| o.ttl.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn registry() -> CacheMetadataRegistry {
        CacheMetadataRegistry::new()
            .controller("rates", CacheOptions::new().ttl(Duration::from_secs(300)))
            .controller("notifications", CacheOptions::new().bypass())
            .route(Method::GET, "/rates", "rates", CacheOptions::new())
            .route(Method::GET, "/rates/raw", "rates", CacheOptions::new().bypass())
            .route(
                Method::GET,
                "/rates/live",
                "rates",
                CacheOptions::new().ttl(Duration::from_secs(30)),
            )
            .route(Method::GET, "/notifications", "notifications", CacheOptions::new())
            .route(
                Method::GET,
                "/notifications/digest",
                "notifications",
                CacheOptions::new().with_bypass(false).key("digest"),
            )
    }

    fn ctx(registry: &CacheMetadataRegistry, path: &str) -> RequestContext {
        registry.context_for(RouteId::get(path), Transport::other("rpc"))
    }

    #[test]
    fn test_context_for_resolves_controller() {
        let registry = registry();

        assert_eq!(ctx(&registry, "/rates").controller.as_deref(), Some("rates"));
        assert_eq!(ctx(&registry, "/unknown").controller, None);
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_ttl_handler_overrides_controller() {
        let registry = registry();

        let live = ctx(&registry, "/rates/live");
        assert!(matches!(
            registry.ttl_source(&live),
            Some(TtlSource::Fixed(d)) if *d == Duration::from_secs(30)
        ));

        let list = ctx(&registry, "/rates");
        assert!(matches!(
            registry.ttl_source(&list),
            Some(TtlSource::Fixed(d)) if *d == Duration::from_secs(300)
        ));

        assert!(registry.ttl_source(&ctx(&registry, "/unknown")).is_none());
    }

    #[test]
    fn test_bypass_inherited_from_controller() {
        let registry = registry();

        assert!(registry.is_bypassed(&ctx(&registry, "/notifications")));
        assert!(!registry.is_bypassed(&ctx(&registry, "/rates")));
        assert!(!registry.is_bypassed(&ctx(&registry, "/unknown")));
    }

    #[test]
    fn test_handler_cannot_clear_controller_bypass() {
        let registry = registry();
        assert!(registry.is_bypassed(&ctx(&registry, "/notifications/digest")));
    }

    #[test]
    fn test_handler_bypass_under_cached_controller() {
        let registry = registry();

        assert!(registry.is_bypassed(&ctx(&registry, "/rates/raw")));
        assert!(!registry.is_bypassed(&ctx(&registry, "/rates/live")));
    }

    #[test]
    fn test_key_is_handler_only() {
        let registry = CacheMetadataRegistry::new()
            .controller("rates", CacheOptions::new().key("ignored"))
            .route(Method::GET, "/rates", "rates", CacheOptions::new());

        assert!(registry.key_source(&ctx(&registry, "/rates")).is_none());
    }
}
