//! Stock indicator engine for finsight
//!
//! This crate turns daily price history into technical indicators and
//! chart-ready figures:
//!
//! - RSI with overbought/oversold guides
//! - Bollinger Bands
//! - MACD with signal line and histogram
//! - P/E ratio over time (when EPS is known)
//! - Beta comparison across tickers
//!
//! It also fetches market data (Yahoo Finance, Alpha Vantage) and renders the
//! indicator summary into a recommendation prompt for
//! [`finsight_llm::LlmClient`].
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use finsight_stock::{PriceSeries, indicators};
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let closes: Vec<f64> = (0..40).map(|i| 100.0 + f64::from(i % 7)).collect();
//! let series = PriceSeries::from_daily_closes(start, &closes);
//!
//! let figure = indicators::plot_rsi(&series, "AAPL", indicators::DEFAULT_RSI_WINDOW).unwrap();
//! assert_eq!(figure.title, "RSI of AAPL");
//! ```

pub mod api;
pub mod chart;
pub mod config;
pub mod error;
pub mod indicators;
pub mod prompts;
pub mod series;

pub use api::{Fundamentals, MarketData, TickerData};
pub use chart::Figure;
pub use config::{Asset, DashboardConfig, LlmConfig};
pub use error::{Result, StockError};
pub use indicators::BetaMap;
pub use prompts::{AnalysisSummary, recommendation_prompt};
pub use series::{PriceBar, PriceSeries};
