//! Command-line driver for finsight
//!
//! # Usage
//!
//! ```bash
//! # Indicator figures as JSON
//! cargo run --bin finsight -- indicators AAPL MSFT
//!
//! # LLM recommendation (needs OPENAI_API_KEY, a .env file or api_key.txt)
//! cargo run --bin finsight -- recommend AAPL NVDA
//! ```

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use finsight_llm::LlmClient;
use finsight_stock::indicators::{
    self, DEFAULT_BOLLINGER_WINDOW, DEFAULT_RSI_WINDOW, plot_beta_comparison,
};
use finsight_stock::{
    AnalysisSummary, BetaMap, DashboardConfig, Figure, MarketData, TickerData,
    recommendation_prompt,
};
use finsight_utils::KeyResolver;
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "finsight")]
#[command(about = "Stock indicators and LLM recommendations", long_about = None)]
struct Args {
    /// Years of price history to fetch
    #[arg(long, global = true)]
    years: Option<u32>,

    /// Directory searched for .env and api_key.txt
    #[arg(long, global = true, default_value = ".")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print indicator figures as JSON
    Indicators {
        #[arg(required = true)]
        tickers: Vec<String>,
    },
    /// Ask the LLM for a recommendation
    Recommend {
        #[arg(required = true)]
        tickers: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    finsight_utils::init_tracing();

    let args = Args::parse();

    let mut builder = DashboardConfig::builder().with_env_api_key(&args.config_dir);
    if let Some(years) = args.years {
        builder = builder.history_years(years);
    }
    let config = builder.build()?;
    let market = MarketData::new(&config);
    if !market.has_fundamentals() {
        info!("ALPHA_VANTAGE_API_KEY not set; P/E and beta are unavailable");
    }

    match args.command {
        Command::Indicators { tickers } => {
            let data = fetch_all(&market, &tickers).await?;
            let figures = indicator_figures(&data);
            println!("{}", serde_json::to_string_pretty(&figures)?);
        }
        Command::Recommend { tickers } => {
            let Some(api_key) = KeyResolver::openai(&args.config_dir).resolve() else {
                bail!("OpenAI API key not found. Set OPENAI_API_KEY or add it to .env or api_key.txt");
            };

            let data = fetch_all(&market, &tickers).await?;
            let summaries: Vec<AnalysisSummary> = data
                .iter()
                .map(|d| {
                    let name = config
                        .asset(&d.ticker)
                        .map_or(d.ticker.as_str(), |a| a.name.as_str());
                    AnalysisSummary::from_data(d, name)
                })
                .collect();
            let prompt = recommendation_prompt(&summaries, config.risk_free_rate_mpt)?;

            let llm = &config.llm;
            let client = LlmClient::initialize_with_settings(
                api_key.expose(),
                llm.max_retries,
                llm.settings.clone(),
            )
            .await?
            .with_cache(llm.response_cache());

            let response = client
                .get_response_with(&prompt, llm.max_retries, llm.retry_delay)
                .await?;
            println!("{response}");
        }
    }

    Ok(())
}

async fn fetch_all(market: &MarketData, tickers: &[String]) -> anyhow::Result<Vec<TickerData>> {
    let mut data = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        let ticker = ticker.to_ascii_uppercase();
        info!(%ticker, "Fetching market data");
        let fetched = market
            .fetch(&ticker)
            .await
            .with_context(|| format!("fetching data for {ticker}"))?;
        data.push(fetched);
    }
    Ok(data)
}

/// Figures keyed by ticker then indicator; indicators that cannot be drawn are skipped
fn indicator_figures(data: &[TickerData]) -> Map<String, Value> {
    let mut out = Map::new();
    let mut betas = BetaMap::new();

    for d in data {
        let ticker = d.ticker.as_str();
        let figures: [(&str, finsight_stock::Result<Option<Figure>>); 4] = [
            ("rsi", indicators::plot_rsi(&d.series, ticker, DEFAULT_RSI_WINDOW).map(Some)),
            (
                "bollinger",
                indicators::plot_bollinger_bands(&d.series, ticker, DEFAULT_BOLLINGER_WINDOW)
                    .map(Some),
            ),
            ("macd", indicators::plot_macd(&d.series, ticker).map(Some)),
            ("pe", indicators::plot_pe_ratio(&d.series, ticker, d.fundamentals.eps)),
        ];

        let mut entry = Map::new();
        for (name, figure) in figures {
            match figure {
                Ok(Some(figure)) => match serde_json::to_value(figure) {
                    Ok(value) => {
                        entry.insert(name.to_string(), value);
                    }
                    Err(e) => warn!(ticker, indicator = name, error = %e, "Figure not serializable"),
                },
                Ok(None) => {}
                Err(e) if e.is_data_error() => {
                    info!(ticker, indicator = name, reason = %e, "Indicator skipped");
                }
                Err(e) => warn!(ticker, indicator = name, error = %e, "Indicator failed"),
            }
        }
        out.insert(ticker.to_string(), Value::Object(entry));

        if let Some(beta) = d.fundamentals.beta {
            betas.insert(ticker.to_string(), beta);
        }
    }

    if let Some(figure) = plot_beta_comparison(&betas) {
        match serde_json::to_value(figure) {
            Ok(value) => {
                out.insert("beta".to_string(), value);
            }
            Err(e) => warn!(error = %e, "Beta figure not serializable"),
        }
    }

    out
}
