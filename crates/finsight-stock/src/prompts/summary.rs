//! Per-ticker indicator summary fed into the recommendation prompt

use crate::api::{Fundamentals, TickerData};
use crate::indicators::{
    DEFAULT_BOLLINGER_WINDOW, DEFAULT_RSI_WINDOW, RsiZone, compute_bollinger_bands, compute_macd,
    compute_rsi,
};
use crate::series::PriceSeries;
use serde::Serialize;
use tracing::debug;

/// Where the latest close sits relative to the Bollinger envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BandPosition {
    AboveUpper,
    WithinBands,
    BelowLower,
}

impl BandPosition {
    pub fn describe(self) -> &'static str {
        match self {
            BandPosition::AboveUpper => "above the upper band (stretched to the upside)",
            BandPosition::WithinBands => "within the bands",
            BandPosition::BelowLower => "below the lower band (stretched to the downside)",
        }
    }
}

/// Sign of the latest MACD histogram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Momentum {
    Bullish,
    Bearish,
    Flat,
}

impl Momentum {
    fn from_histogram(histogram: f64) -> Self {
        if histogram > 0.0 {
            Momentum::Bullish
        } else if histogram < 0.0 {
            Momentum::Bearish
        } else {
            Momentum::Flat
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Momentum::Bullish => "MACD above signal line (bullish momentum)",
            Momentum::Bearish => "MACD below signal line (bearish momentum)",
            Momentum::Flat => "MACD on the signal line",
        }
    }
}

/// Latest indicator readings for one ticker
///
/// Readings an indicator cannot produce (too little history, no EPS) are
/// `None` rather than errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummary {
    pub ticker: String,
    pub name: String,
    pub latest_close: Option<f64>,
    pub rsi: Option<f64>,
    pub rsi_zone: Option<RsiZone>,
    pub band_position: Option<BandPosition>,
    pub momentum: Option<Momentum>,
    pub pe_ratio: Option<f64>,
    pub beta: Option<f64>,
}

impl AnalysisSummary {
    pub fn from_series(
        ticker: &str,
        name: &str,
        series: &PriceSeries,
        fundamentals: Fundamentals,
    ) -> Self {
        let rsi = compute_rsi(series, ticker, DEFAULT_RSI_WINDOW)
            .inspect_err(|e| debug!(ticker, error = %e, "RSI unavailable"))
            .ok()
            .and_then(|points| points.last().map(|p| p.value));

        let band_position = compute_bollinger_bands(series, ticker, DEFAULT_BOLLINGER_WINDOW)
            .inspect_err(|e| debug!(ticker, error = %e, "Bollinger Bands unavailable"))
            .ok()
            .and_then(|bands| bands.last().copied())
            .map(|b| {
                if b.close > b.upper {
                    BandPosition::AboveUpper
                } else if b.close < b.lower {
                    BandPosition::BelowLower
                } else {
                    BandPosition::WithinBands
                }
            });

        let momentum = compute_macd(series, ticker)
            .inspect_err(|e| debug!(ticker, error = %e, "MACD unavailable"))
            .ok()
            .and_then(|points| points.last().map(|p| Momentum::from_histogram(p.histogram)));

        let latest_close = series.latest_close();
        let pe_ratio = match (latest_close, fundamentals.eps) {
            (Some(close), Some(eps)) if eps.is_finite() && eps != 0.0 => Some(close / eps),
            _ => None,
        };

        Self {
            ticker: ticker.to_string(),
            name: name.to_string(),
            latest_close,
            rsi,
            rsi_zone: rsi.map(RsiZone::classify),
            band_position,
            momentum,
            pe_ratio,
            beta: fundamentals.beta,
        }
    }

    pub fn from_data(data: &TickerData, name: &str) -> Self {
        Self::from_series(&data.ticker, name, &data.series, data.fundamentals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::from_daily_closes(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(), closes)
    }

    #[test]
    fn test_rising_series_summary() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + f64::from(i)).collect();
        let fundamentals = Fundamentals {
            eps: Some(4.0),
            beta: Some(1.3),
        };
        let summary = AnalysisSummary::from_series("NVDA", "Nvidia", &series(&closes), fundamentals);

        assert_eq!(summary.latest_close, Some(159.0));
        assert_eq!(summary.rsi, Some(100.0));
        assert_eq!(summary.rsi_zone, Some(RsiZone::Overbought));
        assert_eq!(summary.momentum, Some(Momentum::Bullish));
        assert_eq!(summary.pe_ratio, Some(159.0 / 4.0));
        assert_eq!(summary.beta, Some(1.3));
        assert!(summary.band_position.is_some());
    }

    #[test]
    fn test_short_series_leaves_indicators_empty() {
        let summary = AnalysisSummary::from_series(
            "AAPL",
            "Apple",
            &series(&[10.0, 11.0]),
            Fundamentals::default(),
        );

        assert_eq!(summary.latest_close, Some(11.0));
        assert!(summary.rsi.is_none());
        assert!(summary.band_position.is_none());
        assert!(summary.momentum.is_none());
        assert!(summary.pe_ratio.is_none());
    }

    #[test]
    fn test_close_below_lower_band() {
        let mut closes = vec![50.0, 51.0, 50.0, 51.0, 50.0, 51.0, 50.0, 51.0, 50.0, 51.0];
        closes.extend_from_slice(&[50.0, 51.0, 50.0, 51.0, 50.0, 51.0, 50.0, 51.0, 50.0, 30.0]);
        let summary =
            AnalysisSummary::from_series("X", "X", &series(&closes), Fundamentals::default());
        assert_eq!(summary.band_position, Some(BandPosition::BelowLower));
    }

    #[test]
    fn test_momentum_sign() {
        assert_eq!(Momentum::from_histogram(0.5), Momentum::Bullish);
        assert_eq!(Momentum::from_histogram(-0.5), Momentum::Bearish);
        assert_eq!(Momentum::from_histogram(0.0), Momentum::Flat);
    }
}
