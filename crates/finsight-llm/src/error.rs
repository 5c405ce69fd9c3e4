//! Error types for LLM operations
//!
//! [`LLMError`] describes what went wrong on a single provider call.
//! [`ClientError`] is what [`crate::LlmClient`] surfaces after its retry
//! policy has run: a missing key, exhausted connection retries, or an API
//! failure that is not worth retrying.

use thiserror::Error;

/// Result type for provider calls
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors from a single provider call
#[derive(Error, Debug)]
pub enum LLMError {
    /// Could not reach the provider
    #[error("Connection error: {0}")]
    Connection(String),

    /// The request timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Invalid API key or authentication failed
    #[error("Invalid API key or authentication failed")]
    AuthenticationFailed,

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Any other non-success response
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Unexpected response format
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl LLMError {
    /// Network-layer failures that may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(self, LLMError::Connection(_) | LLMError::Timeout(_))
    }

    /// Provider-side throttling, either reported by status or mentioned in the message
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, LLMError::RateLimitExceeded(_))
            || self.to_string().to_lowercase().contains("rate_limit")
    }

    /// The provider rejected our credentials
    pub fn is_credential_error(&self) -> bool {
        matches!(self, LLMError::AuthenticationFailed)
    }
}

impl From<reqwest::Error> for LLMError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LLMError::Timeout(err.to_string())
        } else if err.is_connect() {
            LLMError::Connection(err.to_string())
        } else if err.is_builder() {
            LLMError::ConfigurationError(err.to_string())
        } else if err.is_decode() {
            LLMError::UnexpectedResponse(err.to_string())
        } else if err.is_request() {
            LLMError::Connection(err.to_string())
        } else {
            LLMError::RequestFailed(err.to_string())
        }
    }
}

/// Result type for [`crate::LlmClient`] operations
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Errors surfaced by the retrying client
#[derive(Error, Debug)]
pub enum ClientError {
    /// No API key was supplied
    #[error("API key is required to initialize the LLM")]
    MissingApiKey,

    /// Client settings are unusable
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    /// Transient failures persisted through every attempt
    #[error(
        "Failed to {operation} after {attempts} attempts. \
         Please check your internet connection or VPN. Error: {source}"
    )]
    Connection {
        operation: &'static str,
        attempts: u32,
        #[source]
        source: LLMError,
    },

    /// The provider rejected the request; retrying will not help
    #[error("OpenAI API error: {0}")]
    Api(#[source] LLMError),
}

impl ClientError {
    /// Number of attempts made before giving up, for connection failures
    pub fn attempts(&self) -> Option<u32> {
        match self {
            ClientError::Connection { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(LLMError::Connection("reset".to_string()).is_transient());
        assert!(LLMError::Timeout("30s".to_string()).is_transient());
        assert!(!LLMError::AuthenticationFailed.is_transient());
        assert!(!LLMError::RateLimitExceeded("slow down".to_string()).is_transient());
    }

    #[test]
    fn test_rate_limit_detected_from_message() {
        assert!(LLMError::RateLimitExceeded("x".to_string()).is_rate_limited());
        assert!(
            LLMError::RequestFailed("HTTP 503: {\"code\": \"Rate_Limit_exceeded\"}".to_string())
                .is_rate_limited()
        );
        assert!(!LLMError::InvalidRequest("bad prompt".to_string()).is_rate_limited());
    }

    #[test]
    fn test_connection_error_message() {
        let err = ClientError::Connection {
            operation: "get LLM response",
            attempts: 3,
            source: LLMError::Timeout("deadline".to_string()),
        };
        let message = err.to_string();
        assert!(message.starts_with("Failed to get LLM response after 3 attempts"));
        assert!(message.contains("deadline"));
        assert_eq!(err.attempts(), Some(3));
    }

    #[test]
    fn test_api_error_wraps_cause() {
        let err = ClientError::Api(LLMError::AuthenticationFailed);
        assert_eq!(
            err.to_string(),
            "OpenAI API error: Invalid API key or authentication failed"
        );
        assert!(err.attempts().is_none());
    }
}
