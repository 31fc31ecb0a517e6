//! Cache-aside layer for completion results
//!
//! Keys are a SHA-256 over the normalized request: messages with roles
//! lowercased and both roles and contents trimmed, the task tag, and the
//! temperature rounded to one decimal. Exact match only — two requests
//! differing only in incidental whitespace hash to the same key, nothing
//! fuzzier. Entries expire by TTL inside moka; reads never return an
//! expired entry. Concurrent writes to one key are last-writer-wins.

use super::types::{CompletionRequest, CompletionResult};
use moka::future::Cache;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// TTL cache of completion results keyed by normalized request hash
pub struct ResponseCache {
    inner: Option<Cache<String, CompletionResult>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResponseCache {
    /// Create a cache with the given TTL and capacity.
    ///
    /// A zero TTL or `enabled = false` yields a disabled cache where
    /// every lookup is a miss, the degraded mode for deployments that
    /// opt out of memoization.
    #[must_use]
    pub fn new(ttl_secs: u64, max_capacity: u64, enabled: bool) -> Self {
        let inner = (enabled && ttl_secs > 0).then(|| {
            Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(Duration::from_secs(ttl_secs))
                .build()
        });
        Self {
            inner,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Stable key for a request under the normalization contract
    #[must_use]
    pub fn cache_key(request: &CompletionRequest) -> String {
        let mut hasher = Sha256::new();
        for msg in &request.messages {
            hasher.update(msg.role.trim().to_lowercase().as_bytes());
            hasher.update([0x1f]);
            hasher.update(msg.content.trim().as_bytes());
            hasher.update([0x1e]);
        }
        if let Some(task) = request.task_type {
            hasher.update(task.as_str().as_bytes());
        }
        hasher.update([0x1f]);
        hasher.update(format!("{:.1}", request.temperature).as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Look up a fresh entry, marking the returned copy as a cache hit
    pub async fn get(&self, key: &str) -> Option<CompletionResult> {
        let cache = self.inner.as_ref()?;
        match cache.get(key).await {
            Some(mut result) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                result.cache_hit = true;
                Some(result)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a successful result with a fresh TTL
    pub async fn insert(&self, key: String, result: CompletionResult) {
        if let Some(cache) = &self.inner {
            cache.insert(key, result).await;
        }
    }

    /// Whether memoization is active
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Current number of cached entries
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.as_ref().map_or(0, Cache::entry_count)
    }

    /// Hits observed since startup
    #[must_use]
    pub fn hit_count(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Misses observed since startup
    #[must_use]
    pub fn miss_count(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Flush moka's pending maintenance so `entry_count` is exact.
    ///
    /// Monitoring and test support.
    pub async fn sync(&self) {
        if let Some(cache) = &self.inner {
            cache.run_pending_tasks().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::types::CompletionRequest;

    fn request(json: serde_json::Value) -> CompletionRequest {
        serde_json::from_value(json).expect("request parses")
    }

    #[test]
    fn whitespace_variants_share_a_key() {
        let a = request(serde_json::json!({
            "messages": [{"role": "user", "content": "what is 2+2?"}]
        }));
        let b = request(serde_json::json!({
            "messages": [{"role": " User ", "content": "  what is 2+2?\n"}]
        }));
        assert_eq!(ResponseCache::cache_key(&a), ResponseCache::cache_key(&b));
    }

    #[test]
    fn different_content_changes_the_key() {
        let a = request(serde_json::json!({
            "messages": [{"role": "user", "content": "what is 2+2?"}]
        }));
        let b = request(serde_json::json!({
            "messages": [{"role": "user", "content": "what is 3+3?"}]
        }));
        assert_ne!(ResponseCache::cache_key(&a), ResponseCache::cache_key(&b));
    }

    #[test]
    fn task_tag_and_temperature_are_part_of_the_key() {
        let base = serde_json::json!({
            "messages": [{"role": "user", "content": "hi"}]
        });
        let a = request(base.clone());

        let mut with_task = base.clone();
        with_task["task_type"] = "code".into();
        let b = request(with_task);
        assert_ne!(ResponseCache::cache_key(&a), ResponseCache::cache_key(&b));

        let mut warm = base.clone();
        warm["temperature"] = 0.9.into();
        let c = request(warm);
        assert_ne!(ResponseCache::cache_key(&a), ResponseCache::cache_key(&c));

        // Rounding to one decimal: 0.70 and 0.74 collapse together
        let mut near = base;
        near["temperature"] = 0.74.into();
        let d = request(near);
        assert_eq!(ResponseCache::cache_key(&a), ResponseCache::cache_key(&d));
    }

    #[tokio::test]
    async fn disabled_cache_never_hits() {
        let cache = ResponseCache::new(0, 100, true);
        assert!(!cache.enabled());
        assert!(cache.get("anything").await.is_none());
        // A disabled cache counts no traffic either
        assert_eq!(cache.miss_count(), 0);
    }
}
