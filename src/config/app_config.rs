use serde::Deserialize;

use crate::infrastructure::cache::CacheType;
use crate::infrastructure::observability::MetricsConfig;
use crate::infrastructure::services::ResponseCacheConfig;

/// Bare environment variable overriding `cache.ttl_secs`
pub const CACHE_TTL_ENV: &str = "CACHE_TTL";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub cache: CacheSection,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Response cache and cache store settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    pub backend: CacheType,
    pub redis_url: Option<String>,
    pub key_prefix: Option<String>,
    /// Global response TTL in seconds; 0 stores entries without expiry
    pub ttl_secs: u64,
    /// In-memory store capacity in entries
    pub max_capacity: u64,
    /// Larger response bodies are passed through uncached
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            backend: CacheType::InMemory,
            redis_url: None,
            key_prefix: None,
            ttl_secs: 60,
            max_capacity: 10_000,
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl CacheSection {
    /// Interceptor configuration derived from the global TTL
    pub fn interceptor_config(&self) -> ResponseCacheConfig {
        ResponseCacheConfig::from_ttl_secs(self.ttl_secs)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let cache_ttl = std::env::var(CACHE_TTL_ENV).ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("cache.ttl_secs", parse_ttl(cache_ttl.as_deref())?)?
            .build()?;

        config.try_deserialize()
    }
}

fn parse_ttl(raw: Option<&str>) -> Result<Option<u64>, config::ConfigError> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| {
            v.parse::<u64>().map_err(|e| {
                config::ConfigError::Message(format!("{} must be whole seconds: {}", CACHE_TTL_ENV, e))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.cache.backend, CacheType::InMemory);
        assert_eq!(config.cache.ttl_secs, 60);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_partial_sections_deserialize() {
        let config: AppConfig = serde_json::from_str(
            r#"{"cache": {"backend": "redis", "redis_url": "redis://cache:6379", "ttl_secs": 5}}"#,
        )
        .unwrap();

        assert_eq!(config.cache.backend, CacheType::Redis);
        assert_eq!(config.cache.ttl_secs, 5);
        assert_eq!(config.cache.max_capacity, 10_000);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_interceptor_config_from_ttl() {
        let section = CacheSection {
            ttl_secs: 5,
            ..Default::default()
        };
        assert_eq!(
            section.interceptor_config().default_ttl,
            Some(Duration::from_secs(5))
        );

        let unset = CacheSection {
            ttl_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            unset.interceptor_config().default_ttl,
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn test_parse_ttl() {
        assert_eq!(parse_ttl(None).unwrap(), None);
        assert_eq!(parse_ttl(Some(" ")).unwrap(), None);
        assert_eq!(parse_ttl(Some("120")).unwrap(), Some(120));
        assert!(parse_ttl(Some("1.5")).is_err());
    }
}
