//! Exchange rates
//!
//! A fixed table of USD reference rates; other bases are derived as cross
//! rates. Figures are illustrative only.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DomainError;

const REFERENCE_BASE: &str = "USD";

const USD_RATES: &[(&str, f64)] = &[
    ("USD", 1.0),
    ("EUR", 0.92),
    ("GBP", 0.79),
    ("JPY", 151.3),
    ("CAD", 1.36),
    ("AUD", 1.52),
    ("CHF", 0.9),
    ("MXN", 16.8),
];

/// Rates quoted against one base currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRates {
    pub base: String,
    pub as_of: DateTime<Utc>,
    pub rates: BTreeMap<String, f64>,
}

/// Static exchange rate table
#[derive(Debug, Clone)]
pub struct ExchangeRateTable {
    usd: BTreeMap<String, f64>,
    as_of: DateTime<Utc>,
}

impl Default for ExchangeRateTable {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl ExchangeRateTable {
    pub fn new(as_of: DateTime<Utc>) -> Self {
        Self {
            usd: USD_RATES
                .iter()
                .map(|(code, rate)| (code.to_string(), *rate))
                .collect(),
            as_of,
        }
    }

    /// Normalizes a currency code, defaulting to USD when absent or blank
    pub fn normalize_base(base: Option<&str>) -> String {
        base.map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_uppercase)
            .unwrap_or_else(|| REFERENCE_BASE.to_string())
    }

    pub fn currencies(&self) -> impl Iterator<Item = &str> {
        self.usd.keys().map(String::as_str)
    }

    /// Rates for every other currency against `base`
    pub fn quote(&self, base: Option<&str>) -> Result<ExchangeRates, DomainError> {
        self.quote_at(base, self.as_of)
    }

    /// Same as [`quote`](Self::quote) but stamped with the current time
    pub fn live_quote(&self, base: Option<&str>) -> Result<ExchangeRates, DomainError> {
        self.quote_at(base, Utc::now())
    }

    fn quote_at(&self, base: Option<&str>, as_of: DateTime<Utc>) -> Result<ExchangeRates, DomainError> {
        let base = Self::normalize_base(base);

        let base_per_usd = *self
            .usd
            .get(&base)
            .ok_or_else(|| DomainError::not_found(format!("Unknown currency '{}'", base)))?;

        let rates = self
            .usd
            .iter()
            .filter(|(code, _)| **code != base)
            .map(|(code, per_usd)| (code.clone(), round(per_usd / base_per_usd)))
            .collect();

        Ok(ExchangeRates { base, as_of, rates })
    }
}

fn round(rate: f64) -> f64 {
    (rate * 1_000_000.0).round() / 1_000_000.0
}
