//! Price-to-earnings ratio

use super::DatedValue;
use crate::chart::{Color, Figure, Point};
use crate::error::Result;
use crate::series::PriceSeries;

/// Close divided by `eps` at every date with a close
///
/// Returns `Ok(None)` when there is no usable EPS (absent, zero, NaN or
/// infinite). Gap bars produce no point.
pub fn compute_pe_ratios(
    series: &PriceSeries,
    ticker: &str,
    eps: Option<f64>,
) -> Result<Option<Vec<DatedValue>>> {
    let closes = series.closes(ticker)?;

    let Some(eps) = eps.filter(|e| e.is_finite() && *e != 0.0) else {
        return Ok(None);
    };

    Ok(Some(
        series
            .timestamps()
            .zip(closes)
            .filter(|(_, close)| close.is_finite())
            .map(|(timestamp, close)| DatedValue {
                timestamp,
                value: close / eps,
            })
            .collect(),
    ))
}

pub fn plot_pe_ratio(series: &PriceSeries, ticker: &str, eps: Option<f64>) -> Result<Option<Figure>> {
    let Some(ratios) = compute_pe_ratios(series, ticker, eps)? else {
        return Ok(None);
    };

    Ok(Some(
        Figure::new(format!("PE Ratio of {ticker}"))
            .labels("Date", "PE Ratio")
            .line(
                format!("{ticker} PE Ratio"),
                Color::Blue,
                ratios.iter().map(Point::from).collect(),
            ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StockError;
    use crate::series::PriceBar;
    use chrono::{TimeZone, Utc};

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::from_daily_closes(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(), closes)
    }

    #[test]
    fn test_ratio_per_date() {
        let ratios = compute_pe_ratios(&series(&[150.0, 120.0]), "AAPL", Some(3.0))
            .unwrap()
            .unwrap();
        assert_eq!(ratios[0].value, 50.0);
        assert_eq!(ratios[1].value, 40.0);
    }

    #[test]
    fn test_unusable_eps_is_not_an_error() {
        let s = series(&[150.0]);
        assert!(compute_pe_ratios(&s, "AAPL", Some(0.0)).unwrap().is_none());
        assert!(compute_pe_ratios(&s, "AAPL", None).unwrap().is_none());
        assert!(compute_pe_ratios(&s, "AAPL", Some(f64::NAN)).unwrap().is_none());
        assert!(plot_pe_ratio(&s, "AAPL", Some(f64::INFINITY)).unwrap().is_none());
    }

    #[test]
    fn test_negative_eps_gives_negative_ratio() {
        let ratios = compute_pe_ratios(&series(&[10.0]), "X", Some(-2.0)).unwrap().unwrap();
        assert_eq!(ratios[0].value, -5.0);
    }

    #[test]
    fn test_missing_close_is_an_error() {
        let mut bar = PriceBar::from_close(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(), 0.0);
        bar.close = None;
        let s = PriceSeries::new(vec![bar]).unwrap();

        assert!(matches!(
            compute_pe_ratios(&s, "GOOGL", Some(5.0)),
            Err(StockError::MissingField { .. })
        ));
    }

    #[test]
    fn test_figure_layout() {
        let figure = plot_pe_ratio(&series(&[100.0, 110.0]), "GOOGL", Some(5.0))
            .unwrap()
            .unwrap();
        assert_eq!(figure.title, "PE Ratio of GOOGL");
        let line = figure.series_named("GOOGL PE Ratio").unwrap();
        assert_eq!(line.color, Color::Blue);
        assert_eq!(line.points.len(), 2);
    }
}
