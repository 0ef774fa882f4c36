//! Domain layer - Core business logic and entities

pub mod cache;
pub mod customer;
pub mod error;
pub mod exchange_rate;
pub mod notification;
pub mod response_cache;

pub use cache::{Cache, CacheExt};
pub use customer::{Customer, CustomerId, CustomerRepository, NewCustomer};
pub use error::DomainError;
pub use exchange_rate::{ExchangeRateTable, ExchangeRates};
pub use notification::{Notification, NotificationLevel};
pub use response_cache::{
    CacheMetadataRegistry, CacheOptions, CacheStatus, HandlerReply, Intercepted, RequestContext,
    RouteId, Transport,
};
