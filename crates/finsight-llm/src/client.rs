//! Retrying, caching chat client
//!
//! [`LlmClient::initialize`] builds a provider bound to a fixed model,
//! temperature and timeout, then probes it once so connectivity problems
//! surface at start-up. [`LlmClient::get_response`] sends a prompt and
//! returns the reply text, consulting the response cache first.

use crate::cache::{ResponseCache, shared_response_cache};
use crate::error::{ClientError, ClientResult, LLMError};
use crate::providers::{OpenAIConfig, OpenAIProvider};
use crate::retry::RetryPolicy;
use crate::{ChatProvider, CompletionRequest, Message};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Model used for recommendations
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Per-request timeout baked into the provider
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of attempts for initialization and requests
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay unit between request retries
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Delay unit between initialization retries
pub const INIT_RETRY_DELAY: Duration = Duration::from_secs(2);

const PROBE_PROMPT: &str = "test";

/// Fixed request parameters for a client
#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
    /// Override for OpenAI-compatible endpoints
    pub api_base: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            timeout: DEFAULT_TIMEOUT,
            api_base: None,
        }
    }
}

/// Chat client with retry and response caching
pub struct LlmClient {
    provider: Arc<dyn ChatProvider>,
    settings: LlmSettings,
    cache: Arc<dyn ResponseCache>,
}

impl LlmClient {
    /// Initialize an OpenAI-backed client with default settings
    ///
    /// Fails with [`ClientError::MissingApiKey`] before any network activity
    /// when `api_key` is empty.
    pub async fn initialize(api_key: &str, max_retries: u32) -> ClientResult<Self> {
        Self::initialize_with_settings(api_key, max_retries, LlmSettings::default()).await
    }

    /// Initialize an OpenAI-backed client with custom model, temperature,
    /// timeout or endpoint
    pub async fn initialize_with_settings(
        api_key: &str,
        max_retries: u32,
        settings: LlmSettings,
    ) -> ClientResult<Self> {
        Self::initialize_with(api_key, max_retries, settings, openai_provider).await
    }

    /// Initialize with custom settings and provider construction
    ///
    /// `build_provider` receives the key and settings; a construction failure
    /// is reported as [`ClientError::Api`] without retrying. The probe call
    /// is retried on transient errors with a `2s × (attempt + 1)` backoff.
    pub async fn initialize_with<F>(
        api_key: &str,
        max_retries: u32,
        settings: LlmSettings,
        build_provider: F,
    ) -> ClientResult<Self>
    where
        F: FnOnce(&str, &LlmSettings) -> Result<Arc<dyn ChatProvider>, LLMError>,
    {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ClientError::MissingApiKey);
        }

        let policy = RetryPolicy::new(max_retries, INIT_RETRY_DELAY).with_rate_limit_retries(false);
        policy.validate()?;

        let provider = build_provider(api_key, &settings).map_err(ClientError::Api)?;

        policy
            .execute("initialize LLM", || {
                let provider = provider.clone();
                let request = build_request(&settings, PROBE_PROMPT);
                async move { probe(provider.as_ref(), request).await }
            })
            .await?;

        info!(model = %settings.model, "LLM client initialized");

        Ok(Self {
            provider,
            settings,
            cache: Arc::new(shared_response_cache()),
        })
    }

    /// Replace the response cache
    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn settings(&self) -> &LlmSettings {
        &self.settings
    }

    /// Send a prompt with the default retry budget
    pub async fn get_response(&self, prompt: &str) -> ClientResult<String> {
        self.get_response_with(prompt, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY)
            .await
    }

    /// Send a prompt, retrying transient and rate-limit failures
    ///
    /// Responses are cached by prompt text alone. A cache hit returns
    /// without contacting the provider, so replies may be as old as the
    /// cache lifespan.
    pub async fn get_response_with(
        &self,
        prompt: &str,
        max_retries: u32,
        retry_delay: Duration,
    ) -> ClientResult<String> {
        if let Some(cached) = self.cache.get(prompt).await {
            debug!("Response cache hit");
            return Ok(cached);
        }
        debug!("Response cache miss");

        let policy = RetryPolicy::new(max_retries, retry_delay);
        let text = policy
            .execute("get LLM response", || {
                let provider = self.provider.clone();
                let request = build_request(&self.settings, prompt);
                async move {
                    provider
                        .complete(request)
                        .await
                        .map(|response| response.message.content)
                }
            })
            .await?;

        self.cache.insert(prompt.to_string(), text.clone()).await;
        Ok(text)
    }
}

fn openai_provider(api_key: &str, settings: &LlmSettings) -> Result<Arc<dyn ChatProvider>, LLMError> {
    let mut config = OpenAIConfig::new(api_key).with_timeout(settings.timeout);
    if let Some(api_base) = &settings.api_base {
        config = config.with_api_base(api_base.clone());
    }
    Ok(Arc::new(OpenAIProvider::with_config(config)?))
}

fn build_request(settings: &LlmSettings, prompt: &str) -> CompletionRequest {
    CompletionRequest::builder(settings.model.clone())
        .add_message(Message::user(prompt))
        .temperature(settings.temperature)
        .build()
}

/// Probe outcome: only transient and credential failures count
async fn probe(provider: &dyn ChatProvider, request: CompletionRequest) -> Result<(), LLMError> {
    match provider.complete(request).await {
        Ok(_) => Ok(()),
        Err(e) if e.is_transient() || e.is_credential_error() => Err(e),
        Err(e) => {
            warn!("Ignoring probe failure during initialization: {}", e);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{NoCache, TimedResponseCache};
    use crate::provider::MockChatProvider;
    use crate::{CompletionResponse, StopReason, TokenUsage};
    use tokio::time::Instant;
    use tokio_test::{assert_err, assert_ok};

    fn reply(text: &str) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant(text),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }

    fn client_with(mock: MockChatProvider) -> LlmClient {
        LlmClient {
            provider: Arc::new(mock),
            settings: LlmSettings::default(),
            cache: Arc::new(TimedResponseCache::new(Duration::from_secs(60))),
        }
    }

    async fn initialize_mock(mock: MockChatProvider, max_retries: u32) -> ClientResult<LlmClient> {
        let provider: Arc<dyn ChatProvider> = Arc::new(mock);
        LlmClient::initialize_with("sk-test", max_retries, LlmSettings::default(), |_, _| {
            Ok(provider)
        })
        .await
    }

    #[tokio::test]
    async fn test_initialize_rejects_empty_key_without_network() {
        let mut mock = MockChatProvider::new();
        mock.expect_complete().times(0);
        let provider: Arc<dyn ChatProvider> = Arc::new(mock);
        let mut built = false;

        let result =
            LlmClient::initialize_with("  ", 3, LlmSettings::default(), |_, _| {
                built = true;
                Ok(provider)
            })
            .await;

        assert!(matches!(result, Err(ClientError::MissingApiKey)));
        assert!(!built);
    }

    #[tokio::test]
    async fn test_initialize_real_provider_rejects_empty_key() {
        let result = LlmClient::initialize("", 3).await;
        assert!(matches!(result, Err(ClientError::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_initialize_rejects_zero_retries() {
        let mut mock = MockChatProvider::new();
        mock.expect_complete().times(0);

        let result = initialize_mock(mock, 0).await;
        assert!(matches!(result, Err(ClientError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_initialize_probes_once() {
        let mut mock = MockChatProvider::new();
        mock.expect_complete()
            .withf(|req| {
                req.model == DEFAULT_MODEL
                    && req.temperature == Some(0.0)
                    && req.messages[0].content == PROBE_PROMPT
            })
            .times(1)
            .returning(|_| Ok(reply("ok")));

        let client = assert_ok!(initialize_mock(mock, 3).await);
        assert_eq!(client.settings().timeout, DEFAULT_TIMEOUT);
    }

    #[tokio::test]
    async fn test_initialize_construction_failure_is_api_error() {
        let result = LlmClient::initialize_with("sk-test", 3, LlmSettings::default(), |_, _| {
            Err(LLMError::ConfigurationError("bad base url".to_string()))
        })
        .await;

        assert!(matches!(
            result,
            Err(ClientError::Api(LLMError::ConfigurationError(_)))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialize_retries_transient_probe_failures() {
        let mut mock = MockChatProvider::new();
        mock.expect_complete()
            .times(3)
            .returning(|_| Err(LLMError::Connection("unreachable".to_string())));
        let start = Instant::now();

        let result = initialize_mock(mock, 3).await;

        assert_eq!(start.elapsed(), Duration::from_secs(2 + 4));
        match result {
            Err(err @ ClientError::Connection { .. }) => {
                assert_eq!(err.attempts(), Some(3));
                assert!(err.to_string().contains("initialize LLM"));
            }
            Err(other) => panic!("expected connection error, got {other:?}"),
            Ok(_) => panic!("expected connection error, got a client"),
        }
    }

    #[tokio::test]
    async fn test_initialize_fails_fast_on_bad_credentials() {
        let mut mock = MockChatProvider::new();
        mock.expect_complete()
            .times(1)
            .returning(|_| Err(LLMError::AuthenticationFailed));

        let result = initialize_mock(mock, 3).await;
        assert!(matches!(
            result,
            Err(ClientError::Api(LLMError::AuthenticationFailed))
        ));
    }

    #[tokio::test]
    async fn test_initialize_ignores_other_probe_failures() {
        let mut mock = MockChatProvider::new();
        mock.expect_complete()
            .times(1)
            .returning(|_| Err(LLMError::RateLimitExceeded("busy".to_string())));

        assert_ok!(initialize_mock(mock, 3).await);
    }

    #[tokio::test]
    async fn test_get_response_returns_text() {
        let mut mock = MockChatProvider::new();
        mock.expect_complete()
            .withf(|req| req.messages[0].content == "Analyze AAPL")
            .times(1)
            .returning(|_| Ok(reply("Hold.")));

        let client = client_with(mock);
        assert_eq!(client.get_response("Analyze AAPL").await.unwrap(), "Hold.");
    }

    #[tokio::test]
    async fn test_identical_prompts_hit_the_cache() {
        let mut mock = MockChatProvider::new();
        mock.expect_complete()
            .times(1)
            .returning(|_| Ok(reply("Buy.")));

        let client = client_with(mock);
        let first = client.get_response("same prompt").await.unwrap();
        let second = client.get_response("same prompt").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_clients_sharing_a_cache_share_entries() {
        let cache: Arc<dyn ResponseCache> =
            Arc::new(TimedResponseCache::new(Duration::from_secs(60)));

        let mut first = MockChatProvider::new();
        first.expect_complete().times(1).returning(|_| Ok(reply("Sell.")));
        let mut second = MockChatProvider::new();
        second.expect_complete().times(0);

        let a = client_with(first).with_cache(cache.clone());
        let b = client_with(second).with_cache(cache);

        assert_eq!(a.get_response("p").await.unwrap(), "Sell.");
        assert_eq!(b.get_response("p").await.unwrap(), "Sell.");
    }

    #[tokio::test]
    async fn test_no_cache_passes_through() {
        let mut mock = MockChatProvider::new();
        mock.expect_complete().times(2).returning(|_| Ok(reply("Hold.")));

        let client = client_with(mock).with_cache(Arc::new(NoCache));
        assert_ok!(client.get_response("p").await);
        assert_ok!(client.get_response("p").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_timeouts_exhaust_three_attempts() {
        let mut mock = MockChatProvider::new();
        mock.expect_complete()
            .times(3)
            .returning(|_| Err(LLMError::Timeout("30s elapsed".to_string())));
        let client = client_with(mock);
        let start = Instant::now();

        let result = client
            .get_response_with("p", 3, Duration::from_secs(2))
            .await;

        // retry_delay × 1, then retry_delay × 2
        assert_eq!(start.elapsed(), Duration::from_secs(6));
        let err = assert_err!(result);
        assert!(matches!(err, ClientError::Connection { attempts: 3, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_then_success() {
        let mut mock = MockChatProvider::new();
        let mut calls = 0;
        mock.expect_complete().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(LLMError::RateLimitExceeded("rate_limit_exceeded".to_string()))
            } else {
                Ok(reply("Accumulate."))
            }
        });
        let client = client_with(mock);
        let start = Instant::now();

        let text = client
            .get_response_with("p", 3, Duration::from_secs(2))
            .await
            .unwrap();

        assert_eq!(text, "Accumulate.");
        assert_eq!(start.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_api_errors_are_not_cached_or_retried() {
        let mut mock = MockChatProvider::new();
        let mut calls = 0;
        mock.expect_complete().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(LLMError::InvalidRequest("context too long".to_string()))
            } else {
                Ok(reply("Recovered."))
            }
        });
        let client = client_with(mock);

        let err = assert_err!(client.get_response("p").await);
        assert!(matches!(err, ClientError::Api(LLMError::InvalidRequest(_))));
        assert_eq!(client.get_response("p").await.unwrap(), "Recovered.");
    }
}
