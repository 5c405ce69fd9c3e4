//! Price history model

use crate::error::{Result, StockError};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One dated price record
///
/// Only the timestamp is mandatory. A bar without a close is a gap and
/// reads as NaN in indicator computations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

impl PriceBar {
    /// A bar carrying only a closing price
    pub fn from_close(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self {
            timestamp,
            open: None,
            high: None,
            low: None,
            close: Some(close),
            volume: None,
        }
    }
}

/// Price history ordered by strictly increasing timestamp
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series, rejecting out-of-order or duplicate timestamps
    pub fn new(bars: Vec<PriceBar>) -> Result<Self> {
        if let Some(pair) = bars.windows(2).find(|w| w[1].timestamp <= w[0].timestamp) {
            return Err(StockError::InvalidSeries(format!(
                "timestamps must be strictly increasing: {} is followed by {}",
                pair[0].timestamp.to_rfc3339(),
                pair[1].timestamp.to_rfc3339()
            )));
        }
        Ok(Self { bars })
    }

    /// One bar per day starting at `start`, closing at each given price
    pub fn from_daily_closes(start: DateTime<Utc>, closes: &[f64]) -> Self {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar::from_close(start + Duration::days(i as i64), close))
            .collect();
        Self { bars }
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.bars.iter().map(|b| b.timestamp)
    }

    /// Most recent bar with a closing price
    pub fn latest_close(&self) -> Option<f64> {
        self.bars.iter().rev().find_map(|b| b.close)
    }

    /// Whether the close column exists at all
    pub fn has_close(&self) -> bool {
        self.is_empty() || self.bars.iter().any(|b| b.close.is_some())
    }

    /// Closing prices, NaN where a bar has none
    ///
    /// Fails when the series has rows but none of them carries a close.
    pub fn closes(&self, ticker: &str) -> Result<Vec<f64>> {
        if !self.has_close() {
            return Err(StockError::MissingField {
                ticker: ticker.to_string(),
                field: "Close",
            });
        }
        Ok(self
            .bars
            .iter()
            .map(|b| b.close.unwrap_or(f64::NAN))
            .collect())
    }
}
