//! Response caching keyed by prompt text
//!
//! Caching is a pluggable capability: [`crate::LlmClient`] holds any
//! [`ResponseCache`]. [`TimedResponseCache`] expires entries after a fixed
//! lifespan; [`NoCache`] passes every call through.

use async_trait::async_trait;
use cached::{Cached, TimedCache};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::RwLock;

/// How long LLM responses stay fresh
pub const DEFAULT_RESPONSE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Storage for prompt → response pairs
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Cached response for this exact prompt, if still fresh
    async fn get(&self, prompt: &str) -> Option<String>;

    /// Remember a response
    async fn insert(&self, prompt: String, response: String);

    /// Drop every entry
    async fn clear(&self);
}

/// Thread-safe cache whose entries expire after a fixed lifespan
///
/// Clones share storage.
#[derive(Clone)]
pub struct TimedResponseCache {
    cache: Arc<RwLock<TimedCache<String, String>>>,
}

impl TimedResponseCache {
    /// Create a new cache with specified TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Get the number of cached entries, including expired ones not yet evicted
    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for TimedResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_RESPONSE_TTL)
    }
}

#[async_trait]
impl ResponseCache for TimedResponseCache {
    async fn get(&self, prompt: &str) -> Option<String> {
        let mut cache = self.cache.write().await;
        cache.cache_get(prompt).cloned()
    }

    async fn insert(&self, prompt: String, response: String) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(prompt, response);
    }

    async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.cache_clear();
    }
}

/// Pass-through cache that never stores anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

#[async_trait]
impl ResponseCache for NoCache {
    async fn get(&self, _prompt: &str) -> Option<String> {
        None
    }

    async fn insert(&self, _prompt: String, _response: String) {}

    async fn clear(&self) {}
}

/// Process-wide 24 hour response cache
///
/// Every client built with the default cache shares this instance, so two
/// clients asking the same prompt hit the same entry.
pub fn shared_response_cache() -> TimedResponseCache {
    static SHARED: OnceLock<TimedResponseCache> = OnceLock::new();
    SHARED.get_or_init(TimedResponseCache::default).clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_get() {
        let cache = TimedResponseCache::new(Duration::from_secs(60));
        cache
            .insert("prompt".to_string(), "response".to_string())
            .await;

        assert_eq!(cache.get("prompt").await, Some("response".to_string()));
        assert!(cache.get("other prompt").await.is_none());
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let cache = TimedResponseCache::new(Duration::from_secs(60));
        let other = cache.clone();
        cache.insert("p".to_string(), "r".to_string()).await;

        assert_eq!(other.get("p").await, Some("r".to_string()));
        assert_eq!(other.len().await, 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = TimedResponseCache::new(Duration::from_secs(60));
        for i in 0..5 {
            cache.insert(format!("prompt {i}"), format!("r{i}")).await;
        }
        assert_eq!(cache.len().await, 5);

        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_expired_entries_are_misses() {
        let cache = TimedResponseCache::new(Duration::from_millis(20));
        cache.insert("p".to_string(), "r".to_string()).await;

        std::thread::sleep(Duration::from_millis(50));
        assert!(cache.get("p").await.is_none());
    }

    #[tokio::test]
    async fn test_no_cache_never_stores() {
        let cache = NoCache;
        cache.insert("p".to_string(), "r".to_string()).await;
        assert!(cache.get("p").await.is_none());
    }

    #[tokio::test]
    async fn test_shared_cache_is_process_wide() {
        let a = shared_response_cache();
        let b = shared_response_cache();
        a.insert(
            "test_shared_cache_is_process_wide".to_string(),
            "r".to_string(),
        )
        .await;

        assert_eq!(
            b.get("test_shared_cache_is_process_wide").await,
            Some("r".to_string())
        );
    }
}
