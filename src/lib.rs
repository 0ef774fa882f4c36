//! orderdesk
//!
//! Merchant order desk API with a transparent response cache:
//! - Per-route and per-controller cache metadata (bypass, key, TTL)
//! - In-memory (moka) or Redis cache stores
//! - Streaming responses and non-2xx results are never cached

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use infrastructure::cache::create_cache;
use infrastructure::customer::InMemoryCustomerRepository;
use tracing::info;

/// Create the application state from configuration
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let cache = create_cache(&config.cache)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create cache store: {}", e))?;

    info!(backend = cache.backend(), "Cache store ready");

    let customers = InMemoryCustomerRepository::seeded().await?;

    Ok(AppState::new(
        Arc::new(customers),
        cache,
        config.cache.interceptor_config(),
    )
    .with_max_body_bytes(config.cache.max_body_bytes))
}
