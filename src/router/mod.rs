//! Smart model routing
//!
//! The linear per-request flow: cache lookup → model selection → attempt
//! with bounded retries → fallback chain on terminal failure. All shared
//! state (catalog, cache, performance history, request history) hangs off
//! [`SmartRouter`], an explicit context object owned by the service.

pub mod analytics;
pub mod cache;
pub mod catalog;
pub mod fallback;
pub mod performance;
pub mod selector;
pub mod transport;
pub mod types;

use crate::config::Settings;
use crate::llm::{LlmError, ProviderSet};
use analytics::{AnalyticsReport, RequestHistory, RequestRecord};
use cache::ResponseCache;
use catalog::ModelCatalog;
use chrono::Utc;
use performance::PerformanceTracker;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::{info, warn};
use transport::{CompletionTransport, ProviderTransport};
use types::{CompletionRequest, CompletionResult, ModelDescriptor};

/// Terminal routing failures surfaced to the caller
#[derive(Debug, Error)]
pub enum RouterError {
    /// The task-type filter left no candidates
    #[error("no suitable model for task {task:?}")]
    NoSuitableModel {
        /// Task tag that could not be satisfied
        task: Option<String>,
    },
    /// Every model in the fallback chain failed
    #[error("all models exhausted; {model_attempted} failed first: {error}")]
    AllModelsExhausted {
        /// Original error from the primary attempt
        error: String,
        /// Primary model that was attempted first
        model_attempted: String,
    },
}

/// Per-model retry bounds for transient errors
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total tries per model, including the first
    pub attempts: usize,
    /// Initial backoff delay in milliseconds
    pub base_delay_ms: u64,
    /// Backoff ceiling in milliseconds
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay_ms: 2000,
            max_delay_ms: 30_000,
        }
    }
}

/// Tunables for a router instance
#[derive(Debug, Clone, Copy)]
pub struct RouterOptions {
    /// Cache time-to-live in seconds; zero disables the cache
    pub cache_ttl_secs: u64,
    /// Maximum cached entries
    pub cache_max_entries: u64,
    /// Master switch for the response cache
    pub cache_enabled: bool,
    /// Retry bounds per model attempt
    pub retry: RetryPolicy,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 3600,
            cache_max_entries: 10_000,
            cache_enabled: true,
            retry: RetryPolicy::default(),
        }
    }
}

impl RouterOptions {
    /// Derive options from settings
    #[must_use]
    pub const fn from_settings(settings: &Settings) -> Self {
        Self {
            cache_ttl_secs: settings.cache_ttl_secs,
            cache_max_entries: settings.cache_max_entries,
            cache_enabled: settings.cache_enabled,
            retry: RetryPolicy {
                attempts: settings.llm_retry_attempts,
                base_delay_ms: settings.llm_retry_base_ms,
                max_delay_ms: settings.llm_retry_max_ms,
            },
        }
    }
}

/// Routing context owned by the service instance
pub struct SmartRouter {
    catalog: ModelCatalog,
    transport: Arc<dyn CompletionTransport>,
    cache: ResponseCache,
    performance: PerformanceTracker,
    history: RequestHistory,
    retry: RetryPolicy,
}

impl SmartRouter {
    /// Build the production router from settings: builtin catalog,
    /// provider transport for every configured API key.
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        let transport = Arc::new(ProviderTransport::new(ProviderSet::new(settings)));
        Self::with_transport(
            ModelCatalog::builtin(),
            transport,
            RouterOptions::from_settings(settings),
        )
    }

    /// Build a router over an arbitrary transport, the seam used by
    /// integration tests.
    #[must_use]
    pub fn with_transport(
        catalog: ModelCatalog,
        transport: Arc<dyn CompletionTransport>,
        options: RouterOptions,
    ) -> Self {
        Self {
            catalog,
            transport,
            cache: ResponseCache::new(
                options.cache_ttl_secs,
                options.cache_max_entries,
                options.cache_enabled,
            ),
            performance: PerformanceTracker::new(),
            history: RequestHistory::new(),
            retry: options.retry,
        }
    }

    /// Run one completion: cache-aside, selection, attempt, fallback.
    ///
    /// # Errors
    ///
    /// `RouterError::NoSuitableModel` when the task filter leaves no
    /// candidates, `RouterError::AllModelsExhausted` when the whole
    /// fallback chain fails.
    pub async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResult, RouterError> {
        let cache_key = ResponseCache::cache_key(&request);
        if let Some(hit) = self.cache.get(&cache_key).await {
            info!(key = %&cache_key[..16], model = hit.model_used, "Cache hit");
            return Ok(hit);
        }

        let primary = selector::select_model(&self.catalog, &self.performance, &request)?;
        match self.attempt(primary, &request).await {
            Ok(result) => Ok(self.finish_success(&request, &cache_key, result).await),
            Err(original) => {
                self.run_fallback(primary, original, &request, &cache_key)
                    .await
            }
        }
    }

    /// One model attempt with bounded retries for transient errors.
    /// Every attempt, success or failure, leaves a performance sample.
    async fn attempt(
        &self,
        model: &ModelDescriptor,
        request: &CompletionRequest,
    ) -> Result<CompletionResult, LlmError> {
        let max_tokens = request
            .max_tokens
            .unwrap_or(model.max_tokens)
            .min(model.max_tokens);

        let strategy = ExponentialBackoff::from_millis(self.retry.base_delay_ms)
            .max_delay(Duration::from_millis(self.retry.max_delay_ms))
            .map(jitter)
            .take(self.retry.attempts.saturating_sub(1));

        let start = Instant::now();
        let outcome = RetryIf::spawn(
            strategy,
            || {
                self.transport
                    .complete(model, &request.messages, max_tokens, request.temperature)
            },
            LlmError::is_transient,
        )
        .await;
        let latency = start.elapsed().as_secs_f64();

        match outcome {
            Ok(reply) => {
                self.performance
                    .record(&model.name, PerformanceTracker::success_score(latency));
                let usage = reply.usage.unwrap_or_default();
                Ok(CompletionResult {
                    success: true,
                    model_used: model.name.clone(),
                    content: reply.content,
                    cost_estimate: model.cost_for_tokens(usage.total_tokens),
                    usage,
                    execution_time: latency,
                    provider: model.provider,
                    tier: model.tier,
                    cache_hit: false,
                })
            }
            Err(e) => {
                self.performance.record(&model.name, 0.0);
                warn!(model = model.name, error = %e, "Model attempt failed");
                Err(e)
            }
        }
    }

    /// Walk the fallback chain after the primary attempt failed
    /// terminally. The first success wins; exhaustion reports the
    /// original error.
    async fn run_fallback(
        &self,
        primary: &ModelDescriptor,
        original: LlmError,
        request: &CompletionRequest,
        cache_key: &str,
    ) -> Result<CompletionResult, RouterError> {
        let chain = fallback::fallback_chain(&self.catalog, primary);
        info!(
            failed = primary.name,
            candidates = chain.len(),
            "Walking fallback chain"
        );

        for model in chain {
            info!(model = model.name, "Trying fallback model");
            match self.attempt(model, request).await {
                Ok(result) => {
                    return Ok(self.finish_success(request, cache_key, result).await);
                }
                Err(e) => {
                    warn!(model = model.name, error = %e, "Fallback model failed");
                }
            }
        }

        self.history.record(RequestRecord {
            model_used: primary.name.clone(),
            response_time: 0.0,
            tokens_used: 0,
            cost: 0.0,
            success: false,
            task_type: request.task_type,
            timestamp: Utc::now(),
        });
        Err(RouterError::AllModelsExhausted {
            error: original.to_string(),
            model_attempted: primary.name.clone(),
        })
    }

    /// Store a successful result and record it into history
    async fn finish_success(
        &self,
        request: &CompletionRequest,
        cache_key: &str,
        result: CompletionResult,
    ) -> CompletionResult {
        self.cache
            .insert(cache_key.to_string(), result.clone())
            .await;
        self.history.record(RequestRecord {
            model_used: result.model_used.clone(),
            response_time: result.execution_time,
            tokens_used: result.usage.total_tokens,
            cost: result.cost_estimate,
            success: true,
            task_type: request.task_type,
            timestamp: Utc::now(),
        });
        result
    }

    /// Derived analytics over the in-memory history
    #[must_use]
    pub fn analytics(&self) -> AnalyticsReport {
        self.history.report(self.catalog.len(), 10)
    }

    /// The model catalog backing this router
    #[must_use]
    pub const fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// The response cache, for health reporting and tests
    #[must_use]
    pub const fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// The rolling performance tracker, for tests and diagnostics
    #[must_use]
    pub const fn performance(&self) -> &PerformanceTracker {
        &self.performance
    }
}
