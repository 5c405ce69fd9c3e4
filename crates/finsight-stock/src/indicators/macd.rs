//! Moving Average Convergence Divergence

use super::{checked_closes, ensure_points};
use crate::chart::{Color, Figure, LineStyle, Point};
use crate::error::{Result, StockError};
use crate::series::PriceSeries;
use chrono::{DateTime, Utc};
use serde::Serialize;
use ta::{Next, Reset, indicators::ExponentialMovingAverage};

/// Rows needed before a MACD is attempted; the slow EMA span
pub const MACD_MIN_ROWS: usize = 26;

const FAST_SPAN: usize = 12;
const SLOW_SPAN: usize = 26;
const SIGNAL_SPAN: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacdPoint {
    pub timestamp: DateTime<Utc>,
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Recursive EMA seeded with the first observation
///
/// Before the first observation the output is NaN. A gap repeats the last
/// average and decays its weight by `1 - alpha` per missed step; the next
/// observation is blended against the decayed weight and re-normalised.
struct Ema {
    inner: ExponentialMovingAverage,
    alpha: f64,
    last: Option<f64>,
    missed: i32,
}

impl Ema {
    fn new(span: usize) -> Result<Self> {
        let inner = ExponentialMovingAverage::new(span)
            .map_err(|e| StockError::IndicatorError(e.to_string()))?;
        Ok(Self {
            inner,
            alpha: 2.0 / (span as f64 + 1.0),
            last: None,
            missed: 0,
        })
    }

    fn next(&mut self, value: f64) -> f64 {
        let Some(prev) = self.last else {
            if !value.is_finite() {
                return f64::NAN;
            }
            let seeded = self.inner.next(value);
            self.last = Some(seeded);
            return seeded;
        };

        if !value.is_finite() {
            self.missed += 1;
            return prev;
        }

        let current = if self.missed == 0 {
            self.inner.next(value)
        } else {
            let old_weight = (1.0 - self.alpha).powi(self.missed + 1);
            let blended =
                (old_weight * prev + self.alpha * value) / (old_weight + self.alpha);
            self.missed = 0;
            // Reseed so later steps continue from the blended value
            self.inner.reset();
            self.inner.next(blended)
        };
        self.last = Some(current);
        current
    }
}

/// MACD line (EMA12 − EMA26), its 9-period signal and the histogram
pub fn compute_macd(series: &PriceSeries, ticker: &str) -> Result<Vec<MacdPoint>> {
    let closes = checked_closes(series, ticker, "MACD", MACD_MIN_ROWS)?;

    let mut fast = Ema::new(FAST_SPAN)?;
    let mut slow = Ema::new(SLOW_SPAN)?;
    let mut signal_ema = Ema::new(SIGNAL_SPAN)?;

    let points = series
        .timestamps()
        .zip(closes)
        .filter_map(|(timestamp, close)| {
            let macd = fast.next(close) - slow.next(close);
            let signal = signal_ema.next(macd);
            (macd.is_finite() && signal.is_finite()).then(|| MacdPoint {
                timestamp,
                macd,
                signal,
                histogram: macd - signal,
            })
        })
        .collect();

    ensure_points(points, "MACD")
}

/// MACD and signal lines over a histogram, 14×7
pub fn plot_macd(series: &PriceSeries, ticker: &str) -> Result<Figure> {
    let points = compute_macd(series, ticker)?;

    let line = |f: fn(&MacdPoint) -> f64| -> Vec<Point> {
        points.iter().map(|p| Point::at(p.timestamp, f(p))).collect()
    };

    Ok(Figure::new(format!("MACD and Signal Line of {ticker}"))
        .size(14.0, 7.0)
        .labels("Date", "MACD")
        .line(format!("{ticker} MACD"), Color::Blue, line(|p| p.macd))
        .line(format!("{ticker} Signal Line"), Color::Red, line(|p| p.signal))
        .bars("Histogram", Color::Gray, 0.3, line(|p| p.histogram))
        .hline(0.0, None, Color::Black, LineStyle::Solid, 0.5))
}
