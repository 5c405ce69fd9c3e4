//! Bollinger Bands

use super::{checked_closes, ensure_points, rolling_mean, rolling_std};
use crate::chart::{Color, Figure, Point};
use crate::error::Result;
use crate::series::PriceSeries;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DEFAULT_BOLLINGER_WINDOW: usize = 20;

const BAND_WIDTH: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BollingerPoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub middle: f64,
    pub upper: f64,
    pub lower: f64,
}

/// Rolling mean of close ± two sample standard deviations
pub fn compute_bollinger_bands(
    series: &PriceSeries,
    ticker: &str,
    window: usize,
) -> Result<Vec<BollingerPoint>> {
    let closes = checked_closes(series, ticker, "Bollinger Bands", window)?;

    let means = rolling_mean(&closes, window);
    let stds = rolling_std(&closes, window);

    let points = series
        .timestamps()
        .zip(closes.iter().copied())
        .skip(window - 1)
        .zip(means.into_iter().zip(stds))
        .filter_map(|((timestamp, close), (mean, std))| {
            let (middle, std) = (mean?, std?);
            Some(BollingerPoint {
                timestamp,
                close,
                middle,
                upper: middle + BAND_WIDTH * std,
                lower: middle - BAND_WIDTH * std,
            })
        })
        .collect();

    ensure_points(points, "Bollinger Bands")
}

/// Close with middle, upper and lower bands and the shaded envelope
pub fn plot_bollinger_bands(series: &PriceSeries, ticker: &str, window: usize) -> Result<Figure> {
    let bands = compute_bollinger_bands(series, ticker, window)?;

    let pick = |f: fn(&BollingerPoint) -> f64| -> Vec<Point> {
        bands.iter().map(|b| Point::at(b.timestamp, f(b))).collect()
    };

    Ok(Figure::new(format!("Bollinger Bands of {ticker}"))
        .labels("Date", "Price")
        .line("Closing Price", Color::Black, pick(|b| b.close))
        .line("Middle Band", Color::Blue, pick(|b| b.middle))
        .line("Upper Band", Color::Red, pick(|b| b.upper))
        .line("Lower Band", Color::Green, pick(|b| b.lower))
        .fill_between(pick(|b| b.upper), pick(|b| b.lower), Color::Gray, 0.2))
}
