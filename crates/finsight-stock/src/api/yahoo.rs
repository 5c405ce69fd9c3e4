//! Yahoo Finance price history

use crate::error::{Result, StockError};
use crate::series::{PriceBar, PriceSeries};
use chrono::{DateTime, Months, Utc};
use time::OffsetDateTime;
use tracing::{debug, instrument};
use yahoo_finance_api as yahoo;

/// Yahoo Finance client
#[derive(Debug, Clone, Default)]
pub struct YahooFinanceClient {}

impl YahooFinanceClient {
    pub fn new() -> Self {
        Self {}
    }

    /// Daily history for the last `years` years up to now
    pub async fn history(&self, symbol: &str, years: u32) -> Result<PriceSeries> {
        let end = Utc::now();
        let start = history_start(end, years)?;
        self.history_between(symbol, start, end).await
    }

    /// Daily history between two instants
    #[instrument(skip(self))]
    pub async fn history_between(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| StockError::YahooFinanceError(format!("Invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| StockError::YahooFinanceError(format!("Invalid end timestamp: {e}")))?;

        let response = provider
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        if quotes.is_empty() {
            return Err(StockError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "no price history returned".to_string(),
            });
        }
        debug!(symbol, quotes = quotes.len(), "Fetched price history");

        let bars = quotes
            .iter()
            .filter_map(|q| {
                let timestamp = DateTime::from_timestamp(q.timestamp as i64, 0)?;
                Some(PriceBar {
                    timestamp,
                    open: finite(q.open),
                    high: finite(q.high),
                    low: finite(q.low),
                    close: finite(q.close),
                    volume: Some(q.volume),
                })
            })
            .collect();

        ordered_series(bars)
    }
}

/// Instant `years` calendar years before `end`
fn history_start(end: DateTime<Utc>, years: u32) -> Result<DateTime<Utc>> {
    years
        .checked_mul(12)
        .and_then(|months| end.checked_sub_months(Months::new(months)))
        .ok_or_else(|| StockError::ConfigError(format!("Invalid history length: {years} years")))
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Sort bars by time and keep the last bar for any repeated timestamp
fn ordered_series(mut bars: Vec<PriceBar>) -> Result<PriceSeries> {
    bars.sort_by_key(|b| b.timestamp);
    bars.reverse();
    bars.dedup_by_key(|b| b.timestamp);
    bars.reverse();
    PriceSeries::new(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tokio_test::{assert_err, assert_ok};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_ordered_series_sorts_and_dedups() {
        let bars = vec![
            PriceBar::from_close(day(3), 3.0),
            PriceBar::from_close(day(1), 1.0),
            PriceBar::from_close(day(3), 4.0),
            PriceBar::from_close(day(2), 2.0),
        ];

        let series = ordered_series(bars).unwrap();
        let closes: Vec<_> = series.bars().iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![Some(1.0), Some(2.0), Some(4.0)]);
    }

    #[test]
    fn test_non_finite_prices_become_gaps() {
        assert_eq!(finite(f64::NAN), None);
        assert_eq!(finite(12.5), Some(12.5));
    }

    #[test]
    fn test_history_start_counts_calendar_years() {
        let start = assert_ok!(history_start(day(29), 2));
        assert_eq!(start, Utc.with_ymd_and_hms(2022, 2, 28, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_oversized_history_is_config_error() {
        let err = assert_err!(history_start(day(1), u32::MAX));
        assert!(matches!(err, StockError::ConfigError(_)));

        let err = assert_err!(history_start(day(1), 1_000_000));
        assert!(matches!(err, StockError::ConfigError(_)));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_history() {
        let client = YahooFinanceClient::new();
        let series = client.history("AAPL", 1).await.unwrap();
        assert!(series.len() > 200);
        assert!(series.latest_close().unwrap() > 0.0);
    }
}
