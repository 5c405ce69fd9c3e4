//! Market data clients
//!
//! Price history comes from Yahoo Finance. EPS and beta come from Alpha
//! Vantage when a key is configured and are best effort: any failure there
//! leaves them as `None`.

pub mod alpha_vantage;
pub mod yahoo;

pub use alpha_vantage::{
    ALPHA_VANTAGE_API_KEY_VAR, AlphaVantageClient, DEFAULT_REQUESTS_PER_MINUTE, Fundamentals,
};
pub use yahoo::YahooFinanceClient;

use crate::config::DashboardConfig;
use crate::error::Result;
use crate::series::PriceSeries;
use tracing::warn;

/// Everything fetched for one ticker
#[derive(Debug, Clone)]
pub struct TickerData {
    pub ticker: String,
    pub series: PriceSeries,
    pub fundamentals: Fundamentals,
}

/// Price history plus optional fundamentals
#[derive(Debug, Clone)]
pub struct MarketData {
    yahoo: YahooFinanceClient,
    alpha_vantage: Option<AlphaVantageClient>,
    history_years: u32,
}

impl MarketData {
    pub fn new(config: &DashboardConfig) -> Self {
        let alpha_vantage = config
            .alpha_vantage_api_key
            .clone()
            .map(|key| AlphaVantageClient::new(key, config.alpha_vantage_rate_limit));

        Self {
            yahoo: YahooFinanceClient::new(),
            alpha_vantage,
            history_years: config.history_years,
        }
    }

    pub fn has_fundamentals(&self) -> bool {
        self.alpha_vantage.is_some()
    }

    pub async fn price_history(&self, ticker: &str) -> Result<PriceSeries> {
        self.yahoo.history(ticker, self.history_years).await
    }

    /// Fundamentals, or all `None` when unconfigured or unavailable
    pub async fn fundamentals(&self, ticker: &str) -> Fundamentals {
        let Some(client) = &self.alpha_vantage else {
            return Fundamentals::default();
        };
        match client.fundamentals(ticker).await {
            Ok(fundamentals) => fundamentals,
            Err(e) => {
                warn!(ticker, error = %e, "Fundamentals unavailable");
                Fundamentals::default()
            }
        }
    }

    pub async fn fetch(&self, ticker: &str) -> Result<TickerData> {
        let series = self.price_history(ticker).await?;
        let fundamentals = self.fundamentals(ticker).await;
        Ok(TickerData {
            ticker: ticker.to_string(),
            series,
            fundamentals,
        })
    }
}
