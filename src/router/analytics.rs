//! Request history and derived analytics
//!
//! Aggregates are maintained incrementally (exact counters per model plus
//! running totals) with a bounded ring of recent requests for the
//! activity feed, so analytics stay O(models) regardless of uptime.

use super::types::TaskType;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

/// Recent requests retained for the activity feed
const RECENT_CAPACITY: usize = 100;

/// One finished request as recorded into history
#[derive(Debug, Clone, Serialize)]
pub struct RequestRecord {
    /// Catalog name of the model that handled (or last failed) the request
    pub model_used: String,
    /// Wall-clock seconds spent
    pub response_time: f64,
    /// Total tokens reported by the provider
    pub tokens_used: u32,
    /// Estimated cost in USD
    pub cost: f64,
    /// Whether the request ultimately succeeded
    pub success: bool,
    /// Task tag supplied by the caller, if any
    pub task_type: Option<TaskType>,
    /// Completion timestamp
    pub timestamp: DateTime<Utc>,
}

#[derive(Default)]
struct Totals {
    requests: u64,
    successes: u64,
    cost: f64,
    response_time: f64,
}

#[derive(Default, Clone)]
struct ModelStats {
    count: u64,
    successes: u64,
    cost_sum: f64,
}

/// Thread-safe incremental request history
#[derive(Default)]
pub struct RequestHistory {
    totals: Mutex<Totals>,
    per_model: Mutex<HashMap<String, ModelStats>>,
    recent: Mutex<VecDeque<RequestRecord>>,
}

/// Aggregate view over all recorded requests
#[derive(Debug, Serialize)]
pub struct AnalyticsReport {
    /// Headline counters
    pub overview: AnalyticsOverview,
    /// Per-model usage breakdown
    pub model_performance: HashMap<String, ModelUsage>,
    /// Most recent requests, newest last
    pub recent_activity: Vec<RequestRecord>,
}

/// Headline counters for the analytics report
#[derive(Debug, Serialize)]
pub struct AnalyticsOverview {
    /// Requests recorded since startup
    pub total_requests: u64,
    /// Fraction of requests that succeeded
    pub success_rate: f64,
    /// Total estimated cost in USD
    pub total_cost: f64,
    /// Mean response time in seconds
    pub average_response_time: f64,
    /// Models available in the catalog
    pub available_models: usize,
}

/// Per-model usage counters
#[derive(Debug, Serialize)]
pub struct ModelUsage {
    /// Requests routed to this model
    pub count: u64,
    /// Fraction that succeeded
    pub success_rate: f64,
    /// Mean estimated cost per request in USD
    pub avg_cost: f64,
}

impl RequestHistory {
    /// Create an empty history
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished request
    pub fn record(&self, record: RequestRecord) {
        {
            let mut totals = self.totals.lock().unwrap_or_else(PoisonError::into_inner);
            totals.requests += 1;
            if record.success {
                totals.successes += 1;
            }
            totals.cost += record.cost;
            totals.response_time += record.response_time;
        }
        {
            let mut per_model = self
                .per_model
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let stats = per_model.entry(record.model_used.clone()).or_default();
            stats.count += 1;
            if record.success {
                stats.successes += 1;
            }
            stats.cost_sum += record.cost;
        }
        let mut recent = self.recent.lock().unwrap_or_else(PoisonError::into_inner);
        recent.push_back(record);
        while recent.len() > RECENT_CAPACITY {
            recent.pop_front();
        }
    }

    /// Derive the analytics report; `available_models` comes from the
    /// catalog and is threaded through by the router.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn report(&self, available_models: usize, recent_limit: usize) -> AnalyticsReport {
        let overview = {
            let totals = self.totals.lock().unwrap_or_else(PoisonError::into_inner);
            let requests = totals.requests.max(1) as f64;
            AnalyticsOverview {
                total_requests: totals.requests,
                success_rate: totals.successes as f64 / requests,
                total_cost: totals.cost,
                average_response_time: totals.response_time / requests,
                available_models,
            }
        };

        let model_performance = {
            let per_model = self
                .per_model
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            per_model
                .iter()
                .map(|(name, stats)| {
                    let count = stats.count.max(1) as f64;
                    (
                        name.clone(),
                        ModelUsage {
                            count: stats.count,
                            success_rate: stats.successes as f64 / count,
                            avg_cost: stats.cost_sum / count,
                        },
                    )
                })
                .collect()
        };

        let recent_activity = {
            let recent = self.recent.lock().unwrap_or_else(PoisonError::into_inner);
            recent
                .iter()
                .rev()
                .take(recent_limit)
                .rev()
                .cloned()
                .collect()
        };

        AnalyticsReport {
            overview,
            model_performance,
            recent_activity,
        }
    }

    /// Requests recorded so far
    #[must_use]
    pub fn total_requests(&self) -> u64 {
        self.totals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(model: &str, success: bool, cost: f64) -> RequestRecord {
        RequestRecord {
            model_used: model.to_string(),
            response_time: 0.5,
            tokens_used: 100,
            cost,
            success,
            task_type: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn report_aggregates_totals_and_per_model() {
        let history = RequestHistory::new();
        history.record(record("openai/gpt-4o", true, 0.01));
        history.record(record("openai/gpt-4o", false, 0.0));
        history.record(record("google/gemini-2.5-flash", true, 0.002));

        let report = history.report(13, 10);
        assert_eq!(report.overview.total_requests, 3);
        assert!((report.overview.success_rate - 2.0 / 3.0).abs() < 1e-9);
        assert!((report.overview.total_cost - 0.012).abs() < 1e-9);

        let gpt = &report.model_performance["openai/gpt-4o"];
        assert_eq!(gpt.count, 2);
        assert!((gpt.success_rate - 0.5).abs() < 1e-9);
    }

    #[test]
    fn recent_activity_keeps_newest_and_respects_limit() {
        let history = RequestHistory::new();
        for i in 0..120 {
            history.record(record(&format!("m/{i}"), true, 0.0));
        }
        let report = history.report(13, 10);
        assert_eq!(report.recent_activity.len(), 10);
        // Newest last, oldest of the window first
        assert_eq!(report.recent_activity[9].model_used, "m/119");
        assert_eq!(report.recent_activity[0].model_used, "m/110");
    }

    #[test]
    fn empty_history_reports_zeroes() {
        let history = RequestHistory::new();
        let report = history.report(13, 10);
        assert_eq!(report.overview.total_requests, 0);
        assert!((report.overview.success_rate).abs() < f64::EPSILON);
        assert!(report.recent_activity.is_empty());
    }
}
