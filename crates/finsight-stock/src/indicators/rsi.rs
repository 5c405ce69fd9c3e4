//! Relative Strength Index

use super::{DatedValue, checked_closes, ensure_points, rolling_mean};
use crate::chart::{Color, Figure, LineStyle, Point};
use crate::error::Result;
use crate::series::PriceSeries;
use serde::Serialize;

pub const DEFAULT_RSI_WINDOW: usize = 14;

const OVERBOUGHT: f64 = 70.0;
const OVERSOLD: f64 = 30.0;

/// Where an RSI reading sits relative to the 30/70 thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RsiZone {
    Overbought,
    Neutral,
    Oversold,
}

impl RsiZone {
    pub fn classify(rsi: f64) -> Self {
        if rsi > OVERBOUGHT {
            RsiZone::Overbought
        } else if rsi < OVERSOLD {
            RsiZone::Oversold
        } else {
            RsiZone::Neutral
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            RsiZone::Overbought => "Overbought - potential sell signal",
            RsiZone::Oversold => "Oversold - potential buy signal",
            RsiZone::Neutral => "Neutral",
        }
    }
}

/// RSI over a rolling window of simple average gains and losses
///
/// The first bar has no previous close and counts as zero gain and zero
/// loss. Windows with neither gains nor losses have no defined RSI and are
/// dropped.
pub fn compute_rsi(series: &PriceSeries, ticker: &str, window: usize) -> Result<Vec<DatedValue>> {
    let closes = checked_closes(series, ticker, "RSI calculation", window)?;

    let (gains, losses): (Vec<f64>, Vec<f64>) = std::iter::once(f64::NAN)
        .chain(closes.windows(2).map(|w| w[1] - w[0]))
        .map(|delta| {
            // NaN deltas fall through both comparisons and count as zero
            let gain = if delta > 0.0 { delta } else { 0.0 };
            let loss = if delta < 0.0 { -delta } else { 0.0 };
            (gain, loss)
        })
        .unzip();

    let avg_gains = rolling_mean(&gains, window);
    let avg_losses = rolling_mean(&losses, window);

    let points = series
        .timestamps()
        .skip(window - 1)
        .zip(avg_gains.into_iter().zip(avg_losses))
        .filter_map(|(timestamp, (gain, loss))| {
            let value = rsi_value(gain?, loss?)?;
            Some(DatedValue { timestamp, value })
        })
        .collect();

    ensure_points(points, "RSI")
}

fn rsi_value(gain: f64, loss: f64) -> Option<f64> {
    if loss == 0.0 {
        // gain / 0 is +inf, giving 100; 0 / 0 is undefined
        return (gain > 0.0).then_some(100.0);
    }
    let rs = gain / loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// RSI line with overbought and oversold guides
pub fn plot_rsi(series: &PriceSeries, ticker: &str, window: usize) -> Result<Figure> {
    let rsi = compute_rsi(series, ticker, window)?;

    Ok(Figure::new(format!("RSI of {ticker}"))
        .labels("Date", "RSI")
        .line("RSI", Color::Purple, rsi.iter().map(Point::from).collect())
        .hline(OVERBOUGHT, Some("Overbought (70)"), Color::Red, LineStyle::Dashed, 1.0)
        .hline(OVERSOLD, Some("Oversold (30)"), Color::Green, LineStyle::Dashed, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StockError;
    use chrono::{TimeZone, Utc};
    use tokio_test::{assert_err, assert_ok};

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::from_daily_closes(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(), closes)
    }

    #[test]
    fn test_short_series_is_insufficient() {
        let err = assert_err!(compute_rsi(&series(&[1.0; 13]), "AAPL", DEFAULT_RSI_WINDOW));
        match err {
            StockError::InsufficientData {
                required, actual, ..
            } => {
                assert_eq!(required, 14);
                assert_eq!(actual, 13);
            }
            other => panic!("expected insufficient data, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(matches!(
            compute_rsi(&series(&[1.0, 2.0]), "AAPL", 0),
            Err(StockError::IndicatorError(_))
        ));
    }

    #[test]
    fn test_strictly_increasing_closes_give_100() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + f64::from(i)).collect();
        let rsi = assert_ok!(compute_rsi(&series(&closes), "AAPL", DEFAULT_RSI_WINDOW));

        assert_eq!(rsi.len(), 30 - 14 + 1);
        assert!(rsi.iter().all(|p| p.value == 100.0));
    }

    #[test]
    fn test_strictly_decreasing_closes_give_0() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 - f64::from(i)).collect();
        let rsi = compute_rsi(&series(&closes), "AAPL", DEFAULT_RSI_WINDOW).unwrap();
        assert!(rsi.iter().all(|p| p.value == 0.0));
    }

    #[test]
    fn test_known_value() {
        // deltas: 0 (first), +2, -1, +1 over window 4: gain 3/4, loss 1/4, RS 3
        let rsi = compute_rsi(&series(&[10.0, 12.0, 11.0, 12.0]), "X", 4).unwrap();
        assert_eq!(rsi.len(), 1);
        assert!((rsi[0].value - 75.0).abs() < 1e-12);
    }

    #[test]
    fn test_values_stay_in_bounds() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + (f64::from(i) * 0.7).sin() * 5.0)
            .collect();
        let rsi = compute_rsi(&series(&closes), "X", DEFAULT_RSI_WINDOW).unwrap();
        assert!(rsi.iter().all(|p| (0.0..=100.0).contains(&p.value)));
    }

    #[test]
    fn test_flat_prices_have_no_valid_points() {
        let err = assert_err!(compute_rsi(&series(&[50.0; 20]), "FLAT", DEFAULT_RSI_WINDOW));
        assert!(matches!(err, StockError::NoValidPoints { .. }));
    }

    #[test]
    fn test_figure_has_guides() {
        let closes: Vec<f64> = (0..20).map(|i| f64::from(i % 5)).collect();
        let figure = plot_rsi(&series(&closes), "TSLA", DEFAULT_RSI_WINDOW).unwrap();

        assert_eq!(figure.title, "RSI of TSLA");
        assert_eq!(figure.series_named("RSI").unwrap().color, Color::Purple);
        let levels: Vec<f64> = figure.reference_lines.iter().map(|l| l.y).collect();
        assert_eq!(levels, vec![70.0, 30.0]);
    }

    #[test]
    fn test_zone_classification() {
        assert_eq!(RsiZone::classify(75.0), RsiZone::Overbought);
        assert_eq!(RsiZone::classify(25.0), RsiZone::Oversold);
        assert_eq!(RsiZone::classify(50.0), RsiZone::Neutral);
        assert_eq!(RsiZone::Overbought.describe(), "Overbought - potential sell signal");
    }
}
