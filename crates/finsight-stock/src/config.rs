//! Dashboard configuration

use crate::api::{ALPHA_VANTAGE_API_KEY_VAR, DEFAULT_REQUESTS_PER_MINUTE};
use crate::error::{Result, StockError};
use finsight_llm::cache::DEFAULT_RESPONSE_TTL;
use finsight_llm::client::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};
use finsight_llm::{LlmSettings, NoCache, ResponseCache, TimedResponseCache, shared_response_cache};
use finsight_utils::{ApiKey, DotEnvFile, EnvVar, KeyResolver};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// The assets offered by default, as (display name, ticker)
pub const DEFAULT_ASSETS: [(&str, &str); 8] = [
    ("Apple", "AAPL"),
    ("Amazon", "AMZN"),
    ("Alphabet", "GOOGL"),
    ("Meta", "META"),
    ("Microsoft", "MSFT"),
    ("Nvidia", "NVDA"),
    ("S&P 500 index", "SPY"),
    ("Tesla", "TSLA"),
];

pub const DEFAULT_HISTORY_YEARS: u32 = 2;

/// Risk-free rate for mean-variance optimisation
pub const DEFAULT_RISK_FREE_RATE_MPT: f64 = 0.04;

/// Risk-free rate for Black-Litterman
pub const DEFAULT_RISK_FREE_RATE_BL: f64 = 0.001;

/// A selectable asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    pub name: String,
    pub ticker: String,
}

impl Asset {
    pub fn new(name: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ticker: ticker.into(),
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.ticker)
    }
}

/// Parses `"Apple (AAPL)"`, or a bare ticker used as its own name
impl FromStr for Asset {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (name, ticker) = match s.rsplit_once(" (") {
            Some((name, rest)) => {
                let ticker = rest.strip_suffix(')').ok_or_else(|| {
                    StockError::ConfigError(format!("unterminated ticker in asset '{s}'"))
                })?;
                (name.trim(), ticker.trim())
            }
            None => (s, s),
        };

        if ticker.is_empty() || ticker.contains(char::is_whitespace) {
            return Err(StockError::ConfigError(format!("invalid asset '{s}'")));
        }
        Ok(Self::new(name, ticker.to_ascii_uppercase()))
    }
}

/// LLM request and caching settings
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub settings: LlmSettings,
    pub max_retries: u32,
    pub retry_delay: Duration,
    /// Response lifespan; zero disables caching
    pub cache_ttl: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            settings: LlmSettings::default(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            cache_ttl: DEFAULT_RESPONSE_TTL,
        }
    }
}

impl LlmConfig {
    /// Cache matching `cache_ttl`
    ///
    /// The default lifespan maps to the process-wide cache so separate
    /// clients share responses.
    pub fn response_cache(&self) -> Arc<dyn ResponseCache> {
        if self.cache_ttl.is_zero() {
            Arc::new(NoCache)
        } else if self.cache_ttl == DEFAULT_RESPONSE_TTL {
            Arc::new(shared_response_cache())
        } else {
            Arc::new(TimedResponseCache::new(self.cache_ttl))
        }
    }
}

/// Configuration for the dashboard
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub assets: Vec<Asset>,

    /// Years of daily price history to fetch
    pub history_years: u32,

    pub risk_free_rate_mpt: f64,
    pub risk_free_rate_bl: f64,

    pub llm: LlmConfig,

    /// Alpha Vantage API key (optional; enables EPS and beta)
    pub alpha_vantage_api_key: Option<ApiKey>,

    /// Alpha Vantage requests per minute
    pub alpha_vantage_rate_limit: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            assets: DEFAULT_ASSETS
                .iter()
                .map(|(name, ticker)| Asset::new(*name, *ticker))
                .collect(),
            history_years: DEFAULT_HISTORY_YEARS,
            risk_free_rate_mpt: DEFAULT_RISK_FREE_RATE_MPT,
            risk_free_rate_bl: DEFAULT_RISK_FREE_RATE_BL,
            llm: LlmConfig::default(),
            alpha_vantage_api_key: None,
            alpha_vantage_rate_limit: DEFAULT_REQUESTS_PER_MINUTE,
        }
    }
}

impl DashboardConfig {
    /// Create a new configuration builder
    pub fn builder() -> DashboardConfigBuilder {
        DashboardConfigBuilder::default()
    }

    /// Look up an asset by ticker, ignoring case
    pub fn asset(&self, ticker: &str) -> Option<&Asset> {
        self.assets
            .iter()
            .find(|a| a.ticker.eq_ignore_ascii_case(ticker))
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.assets.iter().map(|a| a.ticker.as_str())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.history_years == 0 {
            return Err(StockError::ConfigError(
                "history_years must be greater than 0".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for asset in &self.assets {
            if asset.ticker.trim().is_empty() {
                return Err(StockError::ConfigError(format!(
                    "asset '{}' has an empty ticker",
                    asset.name
                )));
            }
            if !seen.insert(asset.ticker.to_ascii_uppercase()) {
                return Err(StockError::ConfigError(format!(
                    "duplicate ticker {}",
                    asset.ticker
                )));
            }
        }

        if self.llm.max_retries == 0 {
            return Err(StockError::ConfigError(
                "max_retries must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.settings.temperature) {
            return Err(StockError::ConfigError(format!(
                "temperature must be between 0 and 2, got {}",
                self.llm.settings.temperature
            )));
        }

        if self.llm.settings.timeout.is_zero() {
            return Err(StockError::ConfigError(
                "LLM timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for DashboardConfig
#[derive(Debug, Default)]
pub struct DashboardConfigBuilder {
    assets: Option<Vec<Asset>>,
    history_years: Option<u32>,
    risk_free_rate_mpt: Option<f64>,
    risk_free_rate_bl: Option<f64>,
    model: Option<String>,
    temperature: Option<f32>,
    llm_timeout: Option<Duration>,
    api_base: Option<String>,
    max_retries: Option<u32>,
    retry_delay: Option<Duration>,
    cache_ttl: Option<Duration>,
    alpha_vantage_api_key: Option<ApiKey>,
    alpha_vantage_rate_limit: Option<u32>,
}

impl DashboardConfigBuilder {
    /// Replace the asset universe
    pub fn assets(mut self, assets: Vec<Asset>) -> Self {
        self.assets = Some(assets);
        self
    }

    pub fn history_years(mut self, years: u32) -> Self {
        self.history_years = Some(years);
        self
    }

    pub fn risk_free_rates(mut self, mpt: f64, black_litterman: f64) -> Self {
        self.risk_free_rate_mpt = Some(mpt);
        self.risk_free_rate_bl = Some(black_litterman);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn llm_timeout(mut self, timeout: Duration) -> Self {
        self.llm_timeout = Some(timeout);
        self
    }

    /// Use an OpenAI-compatible endpoint
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    pub fn alpha_vantage_api_key(mut self, key: ApiKey) -> Self {
        self.alpha_vantage_api_key = Some(key);
        self
    }

    pub fn alpha_vantage_rate_limit(mut self, per_minute: u32) -> Self {
        self.alpha_vantage_rate_limit = Some(per_minute);
        self
    }

    /// Resolve the Alpha Vantage key from the environment, then `root/.env`
    ///
    /// An explicitly set key is kept.
    pub fn with_env_api_key(mut self, root: impl AsRef<Path>) -> Self {
        if self.alpha_vantage_api_key.is_none() {
            self.alpha_vantage_api_key = KeyResolver::new()
                .with_source(EnvVar::new(ALPHA_VANTAGE_API_KEY_VAR))
                .with_source(DotEnvFile::new(
                    root.as_ref().join(".env"),
                    ALPHA_VANTAGE_API_KEY_VAR,
                ))
                .resolve();
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<DashboardConfig> {
        let defaults = DashboardConfig::default();
        let llm_defaults = defaults.llm;

        let config = DashboardConfig {
            assets: self.assets.unwrap_or(defaults.assets),
            history_years: self.history_years.unwrap_or(defaults.history_years),
            risk_free_rate_mpt: self.risk_free_rate_mpt.unwrap_or(defaults.risk_free_rate_mpt),
            risk_free_rate_bl: self.risk_free_rate_bl.unwrap_or(defaults.risk_free_rate_bl),
            llm: LlmConfig {
                settings: LlmSettings {
                    model: self.model.unwrap_or(llm_defaults.settings.model),
                    temperature: self
                        .temperature
                        .unwrap_or(llm_defaults.settings.temperature),
                    timeout: self.llm_timeout.unwrap_or(llm_defaults.settings.timeout),
                    api_base: self.api_base.or(llm_defaults.settings.api_base),
                },
                max_retries: self.max_retries.unwrap_or(llm_defaults.max_retries),
                retry_delay: self.retry_delay.unwrap_or(llm_defaults.retry_delay),
                cache_ttl: self.cache_ttl.unwrap_or(llm_defaults.cache_ttl),
            },
            alpha_vantage_api_key: self.alpha_vantage_api_key.filter(|k| !k.is_empty()),
            alpha_vantage_rate_limit: self
                .alpha_vantage_rate_limit
                .unwrap_or(defaults.alpha_vantage_rate_limit),
        };

        config.validate()?;
        Ok(config)
    }
}
