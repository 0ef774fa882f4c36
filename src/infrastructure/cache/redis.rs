//! Redis cache store

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use crate::domain::cache::Cache;
use crate::domain::DomainError;

/// Connection and expiry settings for [`RedisCache`]
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// TTL for entries stored without one; zero disables expiry
    pub default_ttl: Duration,
    /// Namespace prepended as `{prefix}:{key}`
    pub key_prefix: Option<String>,
}

impl RedisCacheConfig {
    pub fn new(url: impl Into<String>, default_ttl: Duration) -> Self {
        Self {
            url: url.into(),
            default_ttl,
            key_prefix: None,
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into()).filter(|p: &String| !p.is_empty());
        self
    }
}

/// Response store backed by Redis
///
/// Values are written with `SET .. PX` so millisecond TTLs survive intact.
/// A zero TTL writes a plain `SET` and the key never expires.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
    config: RedisCacheConfig,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RedisCache {
    /// Opens a managed connection; fails fast when Redis is unreachable
    pub async fn connect(config: RedisCacheConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| DomainError::configuration(format!("Invalid Redis URL: {}", e)))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self { connection, config })
    }

    fn namespaced(&self, key: &str) -> String {
        namespaced(self.config.key_prefix.as_deref(), key)
    }

    /// Counts keys under the prefix with `SCAN`, never `KEYS`
    async fn count_prefixed(&self, prefix: &str) -> Result<usize, DomainError> {
        let mut conn = self.connection.clone();
        let pattern = format!("{}:*", escape_glob(prefix));
        let mut cursor = 0u64;
        let mut total = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(1000)
                .query_async(&mut conn)
                .await
                .map_err(|e| DomainError::cache(format!("Failed to scan '{}': {}", pattern, e)))?;

            total += keys.len();
            cursor = next;

            if cursor == 0 {
                return Ok(total);
            }
        }
    }
}

fn namespaced(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}:{}", prefix, key),
        None => key.to_string(),
    }
}

/// `PX` argument for a TTL; `None` for zero, sub-millisecond TTLs round up
fn expiry_millis(ttl: Duration) -> Option<u64> {
    if ttl.is_zero() {
        return None;
    }

    Some(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1))
}

/// Escapes every Redis glob metacharacter so a prefix matches literally
fn escape_glob(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());

    for c in literal.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}

#[async_trait]
impl Cache for RedisCache {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        let mut conn = self.connection.clone();

        conn.get(self.namespaced(key))
            .await
            .map_err(|e| DomainError::cache(format!("Failed to get key '{}': {}", key, e)))
    }

    async fn set_raw(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), DomainError> {
        let mut conn = self.connection.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(self.namespaced(key)).arg(value);

        if let Some(millis) = expiry_millis(ttl.unwrap_or(self.config.default_ttl)) {
            cmd.arg("PX").arg(millis);
        }

        cmd.query_async::<()>(&mut conn)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to set key '{}': {}", key, e)))
    }

    async fn size(&self) -> Result<usize, DomainError> {
        if let Some(prefix) = &self.config.key_prefix {
            return self.count_prefixed(prefix).await;
        }

        let mut conn = self.connection.clone();
        redis::cmd("DBSIZE")
            .query_async(&mut conn)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to get database size: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::CacheExt;

    async fn connect() -> RedisCache {
        let config = RedisCacheConfig::new("redis://127.0.0.1:6379", Duration::from_secs(60))
            .with_key_prefix("orderdesk-test");
        RedisCache::connect(config).await.unwrap()
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_set_and_get() {
        let cache = connect().await;

        cache
            .set("exchange-rates:USD", &"rates", Some(Duration::from_secs(60)))
            .await
            .unwrap();

        let result: Option<String> = cache.get("exchange-rates:USD").await.unwrap();
        assert_eq!(result, Some("rates".to_string()));
        assert!(cache.size().await.unwrap() >= 1);
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_millisecond_ttl() {
        let cache = connect().await;

        cache
            .set_raw("short", "1", Some(Duration::from_millis(100)))
            .await
            .unwrap();
        assert!(cache.get_raw("short").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(cache.get_raw("short").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_url_is_configuration_error() {
        let config = RedisCacheConfig::new("not a url", Duration::from_secs(60));

        let result = RedisCache::connect(config).await;
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_namespaced_keys() {
        assert_eq!(
            namespaced(Some("orderdesk"), "exchange-rates:USD"),
            "orderdesk:exchange-rates:USD"
        );
        assert_eq!(namespaced(None, "/v1/customers?merchantId=5"), "/v1/customers?merchantId=5");
    }

    #[test]
    fn test_expiry_millis() {
        assert_eq!(expiry_millis(Duration::ZERO), None);
        assert_eq!(expiry_millis(Duration::from_micros(300)), Some(1));
        assert_eq!(expiry_millis(Duration::from_millis(1500)), Some(1500));
        assert_eq!(expiry_millis(Duration::from_secs(300)), Some(300_000));
    }

    #[test]
    fn test_empty_prefix_is_ignored() {
        let config = RedisCacheConfig::new("redis://127.0.0.1:6379", Duration::ZERO).with_key_prefix("");
        assert_eq!(config.key_prefix, None);
    }

    #[test]
    fn test_escape_glob_is_literal() {
        assert_eq!(escape_glob("tenant?[1]*"), "tenant\\?\\[1\\]\\*");
        assert_eq!(escape_glob("orderdesk"), "orderdesk");
    }
}
