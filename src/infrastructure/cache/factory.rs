//! Store selection from the `cache` config section

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::config::CacheSection;
use crate::domain::cache::Cache;
use crate::domain::DomainError;

use super::in_memory::{InMemoryCache, InMemoryCacheConfig};
use super::redis::{RedisCache, RedisCacheConfig};

/// Response store backend named by `cache.backend`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum CacheType {
    #[default]
    InMemory,
    Redis,
}

impl CacheType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheType::InMemory => "in_memory",
            CacheType::Redis => "redis",
        }
    }
}

impl fmt::Display for CacheType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in_memory" | "memory" => Ok(CacheType::InMemory),
            "redis" => Ok(CacheType::Redis),
            other => Err(DomainError::configuration(format!(
                "Unknown cache backend '{}', expected in_memory or redis",
                other
            ))),
        }
    }
}

impl TryFrom<String> for CacheType {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Builds the response store for the configured backend
///
/// `ttl_secs` becomes the store-side default, so zero means entries written
/// without a TTL never expire. Redis connects eagerly and fails at startup.
pub async fn create_cache(section: &CacheSection) -> Result<Arc<dyn Cache>, DomainError> {
    let default_ttl = Duration::from_secs(section.ttl_secs);

    match section.backend {
        CacheType::InMemory => {
            let config = InMemoryCacheConfig::default()
                .with_max_capacity(section.max_capacity)
                .with_default_ttl(default_ttl);

            Ok(Arc::new(InMemoryCache::with_config(config)))
        }
        CacheType::Redis => {
            let url = section
                .redis_url
                .as_deref()
                .filter(|url| !url.trim().is_empty())
                .ok_or_else(|| {
                    DomainError::configuration("cache.redis_url is required for the redis backend")
                })?;

            let mut config = RedisCacheConfig::new(url, default_ttl);
            if let Some(prefix) = &section.key_prefix {
                config = config.with_key_prefix(prefix.as_str());
            }

            Ok(Arc::new(RedisCache::connect(config).await?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::CacheExt;

    #[test]
    fn test_backend_names() {
        assert_eq!("in_memory".parse::<CacheType>().unwrap(), CacheType::InMemory);
        assert_eq!(" Memory ".parse::<CacheType>().unwrap(), CacheType::InMemory);
        assert_eq!("REDIS".parse::<CacheType>().unwrap(), CacheType::Redis);
        assert_eq!(CacheType::Redis.to_string(), "redis");

        let result = "memcached".parse::<CacheType>();
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_backend_deserialize() {
        let parsed: CacheType = serde_json::from_str("\"redis\"").unwrap();
        assert_eq!(parsed, CacheType::Redis);
        assert!(serde_json::from_str::<CacheType>("\"memcached\"").is_err());
    }

    #[tokio::test]
    async fn test_in_memory_store_from_section() {
        let section = CacheSection {
            max_capacity: 10,
            ..Default::default()
        };

        let cache = create_cache(&section).await.unwrap();
        assert_eq!(cache.backend(), "in_memory");

        cache
            .set("/v1/customers?merchantId=5", &vec![1, 2], None)
            .await
            .unwrap();
        let stored: Option<Vec<i32>> = cache.get("/v1/customers?merchantId=5").await.unwrap();
        assert_eq!(stored, Some(vec![1, 2]));
    }

    #[tokio::test]
    async fn test_zero_section_ttl_stores_without_expiry() {
        let section = CacheSection {
            ttl_secs: 0,
            ..Default::default()
        };

        let cache = create_cache(&section).await.unwrap();
        cache.set_raw("key", "1", None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(cache.get_raw("key").await.unwrap().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_redis_requires_url() {
        for redis_url in [None, Some("  ".to_string())] {
            let section = CacheSection {
                backend: CacheType::Redis,
                redis_url,
                ..Default::default()
            };

            let result = create_cache(&section).await;
            assert!(matches!(result, Err(DomainError::Configuration { .. })));
        }
    }
}
