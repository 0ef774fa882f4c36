//! Per-route cache options

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};

use super::context::RequestContext;
use crate::domain::DomainError;

/// Computes a cache key from the request, `None` meaning "do not cache"
pub type KeyFn = dyn Fn(&RequestContext) -> Option<String> + Send + Sync;

/// Computes a TTL from the request, possibly asynchronously
pub type TtlFn =
    dyn Fn(&RequestContext) -> BoxFuture<'static, Result<Duration, DomainError>> + Send + Sync;

/// Explicit cache key for a handler
#[derive(Clone)]
pub enum KeySource {
    Literal(String),
    Computed(Arc<KeyFn>),
}

impl KeySource {
    pub fn literal(key: impl Into<String>) -> Self {
        Self::Literal(key.into())
    }

    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&RequestContext) -> Option<String> + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(f))
    }

    /// Evaluates the key; empty keys count as absent
    pub fn resolve(&self, ctx: &RequestContext) -> Option<String> {
        let key = match self {
            Self::Literal(key) => Some(key.clone()),
            Self::Computed(f) => f(ctx),
        };

        key.filter(|k| !k.is_empty())
    }
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(key) => f.debug_tuple("Literal").field(key).finish(),
            Self::Computed(_) => f.write_str("Computed(<fn>)"),
        }
    }
}

/// TTL override for a handler or controller
#[derive(Clone)]
pub enum TtlSource {
    Fixed(Duration),
    Computed(Arc<TtlFn>),
}

impl TtlSource {
    pub fn fixed(ttl: Duration) -> Self {
        Self::Fixed(ttl)
    }

    /// TTL computed synchronously from the request
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&RequestContext) -> Result<Duration, DomainError> + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(
            move |ctx: &RequestContext| -> BoxFuture<'static, Result<Duration, DomainError>> {
                futures::future::ready(f(ctx)).boxed()
            },
        ))
    }

    /// TTL computed by a future
    ///
    /// The closure runs with the borrowed context; anything the future needs
    /// must be extracted before the `async` block.
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(&RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Duration, DomainError>> + Send + 'static,
    {
        Self::Computed(Arc::new(
            move |ctx: &RequestContext| -> BoxFuture<'static, Result<Duration, DomainError>> {
                f(ctx).boxed()
            },
        ))
    }

    pub async fn resolve(&self, ctx: &RequestContext) -> Result<Duration, DomainError> {
        match self {
            Self::Fixed(ttl) => Ok(*ttl),
            Self::Computed(f) => f(ctx).await,
        }
    }
}

impl fmt::Debug for TtlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(ttl) => f.debug_tuple("Fixed").field(ttl).finish(),
            Self::Computed(_) => f.write_str("Computed(<fn>)"),
        }
    }
}

/// Cache metadata attached to a handler or a controller
///
/// `key` is only honoured on handlers. `bypass` and `ttl` are looked up on
/// the handler first and fall back to its controller.
#[derive(Debug, Clone, Default)]
pub struct CacheOptions {
    pub bypass: Option<bool>,
    pub key: Option<KeySource>,
    pub ttl: Option<TtlSource>,
}

impl CacheOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disables caching unconditionally
    pub fn bypass(mut self) -> Self {
        self.bypass = Some(true);
        self
    }

    pub fn with_bypass(mut self, bypass: bool) -> Self {
        self.bypass = Some(bypass);
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(KeySource::literal(key));
        self
    }

    pub fn key_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestContext) -> Option<String> + Send + Sync + 'static,
    {
        self.key = Some(KeySource::computed(f));
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(TtlSource::fixed(ttl));
        self
    }

    pub fn ttl_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestContext) -> Result<Duration, DomainError> + Send + Sync + 'static,
    {
        self.ttl = Some(TtlSource::from_fn(f));
        self
    }

    pub fn ttl_async<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(&RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Duration, DomainError>> + Send + 'static,
    {
        self.ttl = Some(TtlSource::from_async(f));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::response_cache::{RouteId, Transport};

    fn rpc_context() -> RequestContext {
        RequestContext::new(RouteId::get("rates"), Transport::other("rpc"))
    }

    #[test]
    fn test_literal_key() {
        let source = KeySource::literal("rates:all");
        assert_eq!(source.resolve(&rpc_context()), Some("rates:all".to_string()));
    }

    #[test]
    fn test_empty_keys_are_absent() {
        let ctx = rpc_context();

        assert_eq!(KeySource::literal("").resolve(&ctx), None);
        assert_eq!(KeySource::computed(|_| Some(String::new())).resolve(&ctx), None);
        assert_eq!(KeySource::computed(|_| None).resolve(&ctx), None);
    }

    #[test]
    fn test_computed_key_sees_context() {
        let source = KeySource::computed(|ctx| Some(format!("route:{}", ctx.route.path)));
        assert_eq!(source.resolve(&rpc_context()), Some("route:rates".to_string()));
    }

    #[tokio::test]
    async fn test_ttl_sources() {
        let ctx = rpc_context();

        let fixed = TtlSource::fixed(Duration::from_secs(5));
        assert_eq!(fixed.resolve(&ctx).await.unwrap(), Duration::from_secs(5));

        let sync = TtlSource::from_fn(|_| Ok(Duration::from_millis(1500)));
        assert_eq!(sync.resolve(&ctx).await.unwrap(), Duration::from_millis(1500));

        let asynchronous = TtlSource::from_async(|ctx| {
            let len = ctx.route.path.len() as u64;
            async move {
                tokio::task::yield_now().await;
                Ok(Duration::from_secs(len))
            }
        });
        assert_eq!(asynchronous.resolve(&ctx).await.unwrap(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_ttl_fn_error() {
        let source = TtlSource::from_fn(|_| Err(DomainError::configuration("no ttl")));
        assert!(source.resolve(&rpc_context()).await.is_err());
    }

    #[test]
    fn test_options_builder() {
        let options = CacheOptions::new()
            .key("customers:all")
            .ttl(Duration::from_secs(30))
            .bypass();

        assert_eq!(options.bypass, Some(true));
        assert!(matches!(options.key, Some(KeySource::Literal(ref k)) if k == "customers:all"));
        assert!(matches!(options.ttl, Some(TtlSource::Fixed(d)) if d == Duration::from_secs(30)));
    }
}
