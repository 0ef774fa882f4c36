//! v1 API endpoints

pub mod customers;
pub mod exchange_rates;
pub mod exports;
pub mod notifications;

use axum::{
    http::Method,
    routing::{get, post},
};

use super::router::CachedRoutes;
use crate::domain::response_cache::CacheOptions;

pub const CUSTOMERS: &str = "customers";
pub const EXCHANGE_RATES: &str = "exchange_rates";
pub const EXPORTS: &str = "exports";
pub const NOTIFICATIONS: &str = "notifications";

/// Registers v1 routes together with their cache metadata
pub fn register(routes: CachedRoutes) -> CachedRoutes {
    routes
        .controller(EXCHANGE_RATES, exchange_rates::controller_options())
        .controller(NOTIFICATIONS, CacheOptions::new().bypass())
        .route(
            Method::GET,
            "/v1/customers",
            CUSTOMERS,
            CacheOptions::new(),
            get(customers::list_customers),
        )
        .route(
            Method::POST,
            "/v1/customers",
            CUSTOMERS,
            CacheOptions::new(),
            post(customers::create_customer),
        )
        .route(
            Method::GET,
            "/v1/customers/{customer_id}",
            CUSTOMERS,
            CacheOptions::new(),
            get(customers::get_customer),
        )
        .route(
            Method::GET,
            "/v1/exchange-rates",
            EXCHANGE_RATES,
            exchange_rates::list_options(),
            get(exchange_rates::list_rates),
        )
        .route(
            Method::GET,
            "/v1/exchange-rates/live",
            EXCHANGE_RATES,
            exchange_rates::live_options(),
            get(exchange_rates::live_rates),
        )
        .route(
            Method::GET,
            "/v1/orders/export",
            EXPORTS,
            CacheOptions::new(),
            get(exports::export_orders),
        )
        .route(
            Method::GET,
            "/v1/notifications",
            NOTIFICATIONS,
            CacheOptions::new(),
            get(notifications::list_notifications),
        )
}
