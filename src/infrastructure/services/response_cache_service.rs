//! Response caching around handler invocations

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::http::Method;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::domain::cache::{Cache, CacheExt};
use crate::domain::response_cache::{
    CACHE_STATUS_HEADER, CacheMetadataRegistry, CacheStatus, HandlerReply, HttpExchange,
    Intercepted, RequestContext,
};
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_cache_lookup, record_cache_store_error};

/// Global TTL applied when neither handler nor controller sets one
pub const DEFAULT_RESPONSE_TTL: Duration = Duration::from_millis(60_000);

/// How the post-miss store write is performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Spawned on the runtime; the caller never waits for it
    #[default]
    Background,
    /// Awaited before returning, failures still discarded
    Inline,
}

/// Configuration for the response cache interceptor
#[derive(Debug, Clone)]
pub struct ResponseCacheConfig {
    /// Fallback TTL; `None` defers to the store's own default
    pub default_ttl: Option<Duration>,
    /// Methods cacheable by URL when no explicit key is set
    pub allowed_methods: Vec<Method>,
    pub write_mode: WriteMode,
}

impl Default for ResponseCacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Some(DEFAULT_RESPONSE_TTL),
            allowed_methods: vec![Method::GET],
            write_mode: WriteMode::default(),
        }
    }
}

impl ResponseCacheConfig {
    /// Builds the config from a TTL in seconds; zero is kept and means "never expire"
    pub fn from_ttl_secs(ttl_secs: u64) -> Self {
        Self {
            default_ttl: Some(Duration::from_secs(ttl_secs)),
            ..Default::default()
        }
    }

    /// Sets the default TTL
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// Leaves expiry to the store when no override applies
    pub fn without_default_ttl(mut self) -> Self {
        self.default_ttl = None;
        self
    }

    pub fn with_allowed_methods(mut self, methods: Vec<Method>) -> Self {
        self.allowed_methods = methods;
        self
    }

    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }
}

/// Serves handler results from the cache store and fills it on misses
///
/// Cache-layer failures never reach the caller: a failed read falls back to
/// running the handler, a failed write is logged and dropped. Handler errors
/// pass through untouched. There is no single-flight; concurrent misses on one
/// key all run the handler and the last write wins.
#[derive(Debug)]
pub struct ResponseCacheInterceptor {
    cache: Arc<dyn Cache>,
    registry: Arc<CacheMetadataRegistry>,
    config: ResponseCacheConfig,
}

impl ResponseCacheInterceptor {
    pub fn new(cache: Arc<dyn Cache>, registry: Arc<CacheMetadataRegistry>) -> Self {
        Self::with_config(cache, registry, ResponseCacheConfig::default())
    }

    pub fn with_config(
        cache: Arc<dyn Cache>,
        registry: Arc<CacheMetadataRegistry>,
        config: ResponseCacheConfig,
    ) -> Self {
        Self {
            cache,
            registry,
            config,
        }
    }

    pub fn registry(&self) -> &CacheMetadataRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &Arc<dyn Cache> {
        &self.cache
    }

    pub fn config(&self) -> &ResponseCacheConfig {
        &self.config
    }

    /// Cache key for the request, `None` when it must not be cached
    pub fn track_by(&self, ctx: &RequestContext) -> Option<String> {
        if self.registry.is_bypassed(ctx) {
            return None;
        }

        if let Some(source) = self.registry.key_source(ctx) {
            return source.resolve(ctx);
        }

        let exchange = ctx.transport.http()?;

        if !self.is_request_cacheable(exchange) {
            return None;
        }

        Some(exchange.url.clone())
    }

    fn is_request_cacheable(&self, exchange: &HttpExchange) -> bool {
        self.config.allowed_methods.contains(&exchange.method)
    }

    /// Effective TTL: handler override, controller override, then the default
    ///
    /// Computed overrides are evaluated here and their errors returned as-is.
    /// A zero TTL is a defined value and is forwarded to the store, which
    /// treats it as "no expiry".
    pub async fn resolve_ttl(&self, ctx: &RequestContext) -> Result<Option<Duration>, DomainError> {
        let ttl = match self.registry.ttl_source(ctx) {
            Some(source) => Some(source.resolve(ctx).await?),
            None => self.config.default_ttl,
        };

        Ok(ttl)
    }

    /// Runs `next` behind the cache
    ///
    /// `next` is invoked at most once. On a hit it is not invoked at all.
    pub async fn intercept<T, S, E, F, Fut>(
        &self,
        ctx: &mut RequestContext,
        next: F,
    ) -> Result<Intercepted<T, S>, E>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        E: From<DomainError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<HandlerReply<T, S>, E>>,
    {
        let Some(key) = self.track_by(ctx) else {
            record_cache_lookup(CacheStatus::Bypass);
            return next().await.map(Intercepted::bypassed);
        };

        let ttl = self.resolve_ttl(ctx).await?;

        match self.cache.get::<T>(&key).await {
            Ok(Some(value)) => {
                debug!(key = %key, route = %ctx.route, "Response served from cache");
                record_cache_lookup(CacheStatus::Hit);
                mark(ctx, CacheStatus::Hit);
                return Ok(Intercepted::new(HandlerReply::Value(value), CacheStatus::Hit));
            }
            Ok(None) => {
                record_cache_lookup(CacheStatus::Miss);
                mark(ctx, CacheStatus::Miss);
            }
            Err(e) => {
                warn!(
                    key = %key,
                    backend = self.cache.backend(),
                    error = %e,
                    "Response cache read failed, calling handler directly"
                );
                record_cache_store_error("read");
                record_cache_lookup(CacheStatus::Bypass);
                return next().await.map(Intercepted::bypassed);
            }
        }

        let reply = next().await?;

        match &reply {
            HandlerReply::Value(value) => self.store(key, value, ttl).await,
            HandlerReply::Stream(_) => debug!(key = %key, "Streaming reply not cached"),
        }

        Ok(Intercepted::new(reply, CacheStatus::Miss))
    }

    async fn store<T: Serialize>(&self, key: String, value: &T, ttl: Option<Duration>) {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key = %key, error = %e, "Response could not be serialized for caching");
                record_cache_store_error("serialize");
                return;
            }
        };

        let cache = Arc::clone(&self.cache);
        let write = async move {
            match cache.set_raw(&key, &payload, ttl).await {
                Ok(()) => debug!(
                    key = %key,
                    ttl_ms = ?ttl.map(|ttl| ttl.as_millis()),
                    "Response cached"
                ),
                Err(e) => {
                    warn!(key = %key, backend = cache.backend(), error = %e, "Response cache write failed");
                    record_cache_store_error("write");
                }
            }
        };

        match self.config.write_mode {
            WriteMode::Background => {
                tokio::spawn(write);
            }
            WriteMode::Inline => write.await,
        }
    }
}

fn mark(ctx: &mut RequestContext, status: CacheStatus) {
    if let Some(value) = status.header_value() {
        ctx.set_response_header(CACHE_STATUS_HEADER, value);
    }
}
