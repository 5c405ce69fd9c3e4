//! Alpha Vantage company fundamentals

use crate::error::{Result, StockError};
use finsight_utils::ApiKey;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, instrument};

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Free tier allowance
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 5;

pub const ALPHA_VANTAGE_API_KEY_VAR: &str = "ALPHA_VANTAGE_API_KEY";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Per-ticker fundamentals; any value the provider does not report is `None`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Fundamentals {
    pub eps: Option<f64>,
    pub beta: Option<f64>,
}

/// The subset of the OVERVIEW payload in use
#[derive(Debug, Deserialize)]
struct Overview {
    #[serde(rename = "EPS")]
    eps: Option<String>,
    #[serde(rename = "Beta")]
    beta: Option<String>,
}

impl From<Overview> for Fundamentals {
    fn from(o: Overview) -> Self {
        Self {
            eps: o.eps.as_deref().and_then(parse_number),
            beta: o.beta.as_deref().and_then(parse_number),
        }
    }
}

/// Alpha Vantage reports missing numbers as "None" or "-"
fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: ApiKey,
    base_url: String,
    rate_limiter: SharedRateLimiter,
}

impl AlphaVantageClient {
    /// Client limited to `requests_per_minute` (0 falls back to the free tier limit)
    pub fn new(api_key: ApiKey, requests_per_minute: u32) -> Self {
        let per_minute = NonZeroU32::new(requests_per_minute)
            .or(NonZeroU32::new(DEFAULT_REQUESTS_PER_MINUTE))
            .unwrap_or(NonZeroU32::MIN);
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)));

        Self {
            client: Client::new(),
            api_key,
            base_url: BASE_URL.to_string(),
            rate_limiter,
        }
    }

    /// Point at a different endpoint (test servers, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// EPS and beta from the company OVERVIEW endpoint
    #[instrument(skip(self))]
    pub async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", "OVERVIEW"),
                ("symbol", symbol),
                ("apikey", self.api_key.expose()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StockError::AlphaVantageError(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let data: serde_json::Value = response.json().await?;
        let fundamentals = parse_overview(symbol, data)?;
        debug!(symbol, ?fundamentals, "Fetched fundamentals");
        Ok(fundamentals)
    }
}

fn parse_overview(symbol: &str, data: serde_json::Value) -> Result<Fundamentals> {
    if let Some(error) = data.get("Error Message") {
        return Err(StockError::AlphaVantageError(error.to_string()));
    }

    if data.get("Note").is_some() || data.get("Information").is_some() {
        return Err(StockError::RateLimitExceeded {
            provider: "Alpha Vantage".to_string(),
        });
    }

    // Unknown symbols come back as an empty object
    if data.as_object().is_none_or(serde_json::Map::is_empty) {
        return Err(StockError::InvalidSymbol(symbol.to_string()));
    }

    let overview: Overview = serde_json::from_value(data)?;
    Ok(overview.into())
}
