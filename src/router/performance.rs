//! Rolling per-model performance history
//!
//! Each attempt contributes one score; success is weighted by speed
//! (`min(1.0, 1/max(0.1, latency_secs))`), failure scores 0.0. Only the
//! 100 most recent samples per model are kept, and the append is atomic
//! with respect to the trim.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

/// Samples retained per model
const MAX_SAMPLES: usize = 100;

/// Thread-safe rolling score history keyed by model name
#[derive(Default)]
pub struct PerformanceTracker {
    samples: Mutex<HashMap<String, VecDeque<f64>>>,
}

impl PerformanceTracker {
    /// Create an empty tracker
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Score for a successful attempt with the given latency
    #[must_use]
    pub fn success_score(latency_secs: f64) -> f64 {
        (1.0 / latency_secs.max(0.1)).min(1.0)
    }

    /// Append a sample for a model, trimming to the retention cap
    pub fn record(&self, model: &str, score: f64) {
        let mut samples = self
            .samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let history = samples.entry(model.to_string()).or_default();
        history.push_back(score);
        while history.len() > MAX_SAMPLES {
            history.pop_front();
        }
    }

    /// Rolling average score for a model, `None` without history
    #[must_use]
    pub fn average(&self, model: &str) -> Option<f64> {
        let samples = self
            .samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let history = samples.get(model)?;
        if history.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        Some(history.iter().sum::<f64>() / history.len() as f64)
    }

    /// Number of retained samples for a model
    #[must_use]
    pub fn sample_count(&self, model: &str) -> usize {
        self.samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(model)
            .map_or(0, VecDeque::len)
    }
}
