//! Chat-completion client for finsight
//!
//! This crate provides:
//!
//! - Message and completion types for chat requests
//! - The [`ChatProvider`] trait and an OpenAI implementation
//! - [`LlmClient`], which retries transient failures with backoff and
//!   caches replies by prompt text
//! - Pluggable response caches ([`TimedResponseCache`], [`NoCache`])
//!
//! # Example
//!
//! ```rust,no_run
//! use finsight_llm::LlmClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = LlmClient::initialize("sk-...", 3).await?;
//!     let text = client.get_response("Summarize AAPL's momentum.").await?;
//!     println!("{text}");
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod client;
pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod providers;
pub mod retry;

// Re-export main types
pub use cache::{NoCache, ResponseCache, TimedResponseCache, shared_response_cache};
pub use client::{LlmClient, LlmSettings};
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{ClientError, ClientResult, LLMError, Result};
pub use messages::{Message, Role};
pub use provider::ChatProvider;
pub use retry::RetryPolicy;
