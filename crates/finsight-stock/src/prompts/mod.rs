//! Recommendation prompt
//!
//! Renders indicator summaries into the text sent to the LLM. The client
//! caches by prompt text, so rendering must be deterministic for equal
//! inputs.

mod summary;

pub use summary::{AnalysisSummary, BandPosition, Momentum};

use crate::error::Result;
use minijinja::Environment;
use serde::Serialize;

const RECOMMENDATION_TEMPLATE: &str = "\
You are an experienced financial analyst. Using the indicators below, give a \
recommendation (buy, hold or sell) for each stock with a short justification, \
then summarise the main risks an investor should watch.

{% for stock in stocks -%}
## {{ stock.name }} ({{ stock.ticker }})
- Latest close: {{ stock.latest_close or \"unavailable\" }}
- RSI (14): {% if stock.rsi %}{{ stock.rsi }} ({{ stock.rsi_zone }}){% else %}unavailable{% endif %}
- Bollinger Bands (20): {{ stock.band_position or \"unavailable\" }}
- MACD: {{ stock.momentum or \"unavailable\" }}
- P/E ratio: {{ stock.pe_ratio or \"unavailable\" }}
- Beta: {{ stock.beta or \"unavailable\" }}

{% endfor -%}
Assume a risk-free rate of {{ risk_free_rate }}. Keep the answer under 300 words \
per stock and do not invent figures that are not listed above.
";

/// Display strings for one stock
#[derive(Serialize)]
struct StockView<'a> {
    ticker: &'a str,
    name: &'a str,
    latest_close: Option<String>,
    rsi: Option<String>,
    rsi_zone: Option<&'static str>,
    band_position: Option<&'static str>,
    momentum: Option<&'static str>,
    pe_ratio: Option<String>,
    beta: Option<String>,
}

impl<'a> From<&'a AnalysisSummary> for StockView<'a> {
    fn from(s: &'a AnalysisSummary) -> Self {
        let fixed = |v: f64| format!("{v:.2}");
        Self {
            ticker: &s.ticker,
            name: &s.name,
            latest_close: s.latest_close.map(fixed),
            rsi: s.rsi.map(fixed),
            rsi_zone: s.rsi_zone.map(|z| z.describe()),
            band_position: s.band_position.map(BandPosition::describe),
            momentum: s.momentum.map(Momentum::describe),
            pe_ratio: s.pe_ratio.map(fixed),
            beta: s.beta.map(fixed),
        }
    }
}

/// Prompt asking for a narrative recommendation across `stocks`
pub fn recommendation_prompt(stocks: &[AnalysisSummary], risk_free_rate: f64) -> Result<String> {
    let views: Vec<StockView<'_>> = stocks.iter().map(StockView::from).collect();

    let env = Environment::new();
    let prompt = env.render_str(
        RECOMMENDATION_TEMPLATE,
        minijinja::context! {
            stocks => views,
            risk_free_rate => format!("{:.2}%", risk_free_rate * 100.0),
        },
    )?;
    Ok(prompt)
}
