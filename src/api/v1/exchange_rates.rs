//! Exchange rate endpoint handlers

use std::time::Duration;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::exchange_rate::{ExchangeRateTable, ExchangeRates};
use crate::domain::response_cache::{CacheOptions, RequestContext};
use crate::domain::DomainError;

/// Controller-wide TTL for exchange rate routes
pub const RATES_TTL: Duration = Duration::from_secs(300);

/// TTL of the live feed when no base is given
pub const LIVE_DEFAULT_TTL: Duration = Duration::from_secs(5);

/// TTL of the live feed for an explicit base
pub const LIVE_BASE_TTL: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
pub struct RatesQuery {
    pub base: Option<String>,
}

/// Controller metadata: every rate route caches for five minutes
pub fn controller_options() -> CacheOptions {
    CacheOptions::new().ttl(RATES_TTL)
}

/// `?base=usd` and `?base=USD` share an entry
pub fn list_options() -> CacheOptions {
    CacheOptions::new().key_fn(|ctx| Some(rates_key(ctx)))
}

/// Live rates expire quickly, faster still for the default base
pub fn live_options() -> CacheOptions {
    CacheOptions::new().ttl_fn(live_ttl)
}

fn rates_key(ctx: &RequestContext) -> String {
    format!(
        "exchange-rates:{}",
        ExchangeRateTable::normalize_base(ctx.query_param("base"))
    )
}

fn live_ttl(ctx: &RequestContext) -> Result<Duration, DomainError> {
    let has_base = ctx.query_param("base").is_some_and(|b| !b.is_empty());
    Ok(if has_base { LIVE_BASE_TTL } else { LIVE_DEFAULT_TTL })
}

/// GET /v1/exchange-rates?base=
pub async fn list_rates(
    State(state): State<AppState>,
    Query(query): Query<RatesQuery>,
) -> Result<Json<ExchangeRates>, ApiError> {
    debug!(base = ?query.base, "Quoting exchange rates");

    let rates = state
        .exchange_rates
        .quote(query.base.as_deref())
        .map_err(|e| ApiError::from(e).with_param("base"))?;

    Ok(Json(rates))
}

/// GET /v1/exchange-rates/live?base=
pub async fn live_rates(
    State(state): State<AppState>,
    Query(query): Query<RatesQuery>,
) -> Result<Json<ExchangeRates>, ApiError> {
    debug!(base = ?query.base, "Quoting live exchange rates");

    let rates = state
        .exchange_rates
        .live_quote(query.base.as_deref())
        .map_err(|e| ApiError::from(e).with_param("base"))?;

    Ok(Json(rates))
}

#[cfg(test)]
mod tests {
    use axum::http::Method;

    use super::*;
    use crate::domain::response_cache::{HttpExchange, RouteId, Transport};

    fn ctx(url: &str) -> RequestContext {
        RequestContext::new(
            RouteId::get("/v1/exchange-rates"),
            Transport::Http(HttpExchange::new(Method::GET, url)),
        )
    }

    #[test]
    fn test_rates_key_normalizes_base() {
        assert_eq!(rates_key(&ctx("/v1/exchange-rates?base=usd")), "exchange-rates:USD");
        assert_eq!(rates_key(&ctx("/v1/exchange-rates?base=USD")), "exchange-rates:USD");
        assert_eq!(rates_key(&ctx("/v1/exchange-rates")), "exchange-rates:USD");
        assert_eq!(rates_key(&ctx("/v1/exchange-rates?base=eur")), "exchange-rates:EUR");
    }

    #[test]
    fn test_live_ttl() {
        assert_eq!(live_ttl(&ctx("/v1/exchange-rates/live")).unwrap(), LIVE_DEFAULT_TTL);
        assert_eq!(live_ttl(&ctx("/v1/exchange-rates/live?base=")).unwrap(), LIVE_DEFAULT_TTL);
        assert_eq!(live_ttl(&ctx("/v1/exchange-rates/live?base=GBP")).unwrap(), LIVE_BASE_TTL);
    }
}
