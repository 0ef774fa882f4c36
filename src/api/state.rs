//! Application state for shared services

use std::sync::Arc;

use crate::domain::cache::Cache;
use crate::domain::customer::CustomerRepository;
use crate::domain::exchange_rate::ExchangeRateTable;
use crate::infrastructure::notification::InMemoryNotificationFeed;
use crate::infrastructure::services::ResponseCacheConfig;

/// Application state shared by every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub customers: Arc<dyn CustomerRepository>,
    pub exchange_rates: Arc<ExchangeRateTable>,
    pub notifications: InMemoryNotificationFeed,
    /// Store behind the response cache
    pub cache: Arc<dyn Cache>,
    pub response_cache: ResponseCacheConfig,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        cache: Arc<dyn Cache>,
        response_cache: ResponseCacheConfig,
    ) -> Self {
        Self {
            customers,
            exchange_rates: Arc::new(ExchangeRateTable::default()),
            notifications: InMemoryNotificationFeed::new(),
            cache,
            response_cache,
            max_body_bytes: 1024 * 1024,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn with_exchange_rates(mut self, table: ExchangeRateTable) -> Self {
        self.exchange_rates = Arc::new(table);
        self
    }
}
