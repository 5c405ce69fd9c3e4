//! Error types for stock analysis operations

use thiserror::Error;

/// Stock analysis specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// Fewer rows than the indicator's window needs
    #[error("Not enough data points for {indicator}. Need at least {required}, got {actual}")]
    InsufficientData {
        indicator: &'static str,
        required: usize,
        actual: usize,
    },

    /// A required column is absent from the price series
    #[error("Missing '{field}' column in data for {ticker}")]
    MissingField {
        ticker: String,
        field: &'static str,
    },

    /// Every computed point was undefined
    #[error("{indicator} calculation resulted in no valid data points")]
    NoValidPoints { indicator: &'static str },

    /// Price bars violate the series invariants
    #[error("Invalid price series: {0}")]
    InvalidSeries(String),

    /// Invalid indicator parameter (e.g. a zero window)
    #[error("Technical indicator error: {0}")]
    IndicatorError(String),

    /// Invalid stock symbol or request parameter
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Rate limit exceeded for API
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded { provider: String },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Alpha Vantage API error
    #[error("Alpha Vantage error: {0}")]
    AlphaVantageError(String),

    /// Prompt template error
    #[error("Template error: {0}")]
    TemplateError(#[from] minijinja::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StockError {
    /// Whether this is a data-sufficiency failure (short or incomplete input)
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            StockError::InsufficientData { .. }
                | StockError::MissingField { .. }
                | StockError::NoValidPoints { .. }
        )
    }
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;
