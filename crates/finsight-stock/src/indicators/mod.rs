//! Technical indicator engine
//!
//! Each indicator has a `compute_*` function returning the numeric series
//! and a `plot_*` function packaging it as a [`Figure`](crate::chart::Figure).
//! Leading points without enough history are dropped; an indicator that ends
//! up with no defined points is an error, never an empty success.

pub mod beta;
pub mod bollinger;
pub mod macd;
pub mod pe;
pub mod rsi;

pub use beta::{BetaMap, plot_beta_comparison};
pub use bollinger::{BollingerPoint, DEFAULT_BOLLINGER_WINDOW, compute_bollinger_bands, plot_bollinger_bands};
pub use macd::{MACD_MIN_ROWS, MacdPoint, compute_macd, plot_macd};
pub use pe::{compute_pe_ratios, plot_pe_ratio};
pub use rsi::{DEFAULT_RSI_WINDOW, RsiZone, compute_rsi, plot_rsi};

use crate::chart::Point;
use crate::error::{Result, StockError};
use crate::series::PriceSeries;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single indicator value at a date
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DatedValue {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl From<&DatedValue> for Point {
    fn from(v: &DatedValue) -> Self {
        Point::at(v.timestamp, v.value)
    }
}

/// Closing prices after the field and length checks every windowed indicator shares
fn checked_closes(
    series: &PriceSeries,
    ticker: &str,
    indicator: &'static str,
    required: usize,
) -> Result<Vec<f64>> {
    if required == 0 {
        return Err(StockError::IndicatorError(format!(
            "{indicator} window must be greater than 0"
        )));
    }
    let closes = series.closes(ticker)?;
    if closes.len() < required {
        return Err(StockError::InsufficientData {
            indicator,
            required,
            actual: closes.len(),
        });
    }
    Ok(closes)
}

/// Mean of each full window, `None` where the window holds a NaN
///
/// Element `i` of the result corresponds to input index `i + window - 1`.
fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    values
        .windows(window)
        .map(|w| {
            if w.iter().all(|v| v.is_finite()) {
                Some(w.iter().sum::<f64>() / window as f64)
            } else {
                None
            }
        })
        .collect()
}

/// Sample standard deviation (n − 1) of each full window
fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    values
        .windows(window)
        .map(|w| {
            if window < 2 || !w.iter().all(|v| v.is_finite()) {
                return None;
            }
            let mean = w.iter().sum::<f64>() / window as f64;
            let variance =
                w.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (window - 1) as f64;
            Some(variance.sqrt())
        })
        .collect()
}

fn ensure_points<T>(points: Vec<T>, indicator: &'static str) -> Result<Vec<T>> {
    if points.is_empty() {
        Err(StockError::NoValidPoints { indicator })
    } else {
        Ok(points)
    }
}
