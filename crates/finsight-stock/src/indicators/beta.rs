//! Beta comparison across tickers

use crate::chart::{Color, Figure, LineStyle, Point};
use std::collections::BTreeMap;

/// Ticker to beta, iterated in ticker order
pub type BetaMap = BTreeMap<String, f64>;

const MARKET_BETA: f64 = 1.0;

/// Bar per ticker against the market line, `None` for an empty map
pub fn plot_beta_comparison(betas: &BetaMap) -> Option<Figure> {
    if betas.is_empty() {
        return None;
    }

    let bars = betas
        .iter()
        .map(|(ticker, beta)| Point::category(ticker.as_str(), *beta))
        .collect();

    Some(
        Figure::new("Beta Comparison of Selected Stocks")
            .labels("Ticker", "Beta")
            .bars("Beta", Color::Blue, 0.7, bars)
            .hline(
                MARKET_BETA,
                Some("Market Beta (1.0)"),
                Color::Red,
                LineStyle::Dashed,
                1.0,
            )
            .rotate_x_ticks(45.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::XValue;

    #[test]
    fn test_empty_map_has_no_figure() {
        assert!(plot_beta_comparison(&BetaMap::new()).is_none());
    }

    #[test]
    fn test_bars_in_ticker_order() {
        let betas = BetaMap::from([
            ("TSLA".to_string(), 2.3),
            ("AAPL".to_string(), 1.2),
            ("SPY".to_string(), 1.0),
        ]);
        let figure = plot_beta_comparison(&betas).unwrap();

        assert_eq!(figure.title, "Beta Comparison of Selected Stocks");
        assert_eq!(figure.x_tick_rotation, 45.0);
        assert_eq!((figure.x_label.as_str(), figure.y_label.as_str()), ("Ticker", "Beta"));

        let bars = figure.series_named("Beta").unwrap();
        assert_eq!(bars.alpha, 0.7);
        let tickers: Vec<_> = bars.points.iter().map(|p| p.x.clone()).collect();
        assert_eq!(
            tickers,
            vec![
                XValue::Category("AAPL".into()),
                XValue::Category("SPY".into()),
                XValue::Category("TSLA".into()),
            ]
        );

        let market = &figure.reference_lines[0];
        assert_eq!(market.y, 1.0);
        assert_eq!(market.label.as_deref(), Some("Market Beta (1.0)"));
        assert_eq!(market.style, LineStyle::Dashed);
    }
}
