//! Model selection
//!
//! Picks exactly one model to attempt first, per the caller's cost
//! preference. An explicit `force_model` naming a cataloged model skips
//! scoring entirely; unknown overrides fall back to normal scoring.

use super::catalog::ModelCatalog;
use super::performance::PerformanceTracker;
use super::types::{CompletionRequest, CostPreference, ModelDescriptor, ModelTier};
use super::RouterError;
use tracing::debug;

/// Select the model to attempt first for a request.
///
/// # Errors
///
/// Returns `RouterError::NoSuitableModel` when the task-type filter
/// leaves no candidates.
pub fn select_model<'a>(
    catalog: &'a ModelCatalog,
    performance: &PerformanceTracker,
    request: &CompletionRequest,
) -> Result<&'a ModelDescriptor, RouterError> {
    if let Some(forced) = &request.force_model {
        if let Some(model) = catalog.get(forced) {
            debug!("Model selection overridden: {forced}");
            return Ok(model);
        }
        debug!("Unknown force_model {forced:?}, falling back to scoring");
    }

    let candidates: Vec<&ModelDescriptor> = catalog
        .iter()
        .filter(|m| request.task_type.is_none_or(|task| m.suits(task)))
        .collect();

    if candidates.is_empty() {
        return Err(RouterError::NoSuitableModel {
            task: request.task_type.map(|t| t.as_str().to_string()),
        });
    }

    let picked = match request.cost_preference {
        CostPreference::Cost => pick_cheapest(&candidates, request.complexity),
        CostPreference::Performance => pick_strongest(&candidates, request.complexity),
        CostPreference::Balanced => {
            pick_balanced(&candidates, catalog.max_cost(), performance, request.complexity)
        }
    };

    debug!(
        model = picked.name,
        tier = picked.tier.as_str(),
        complexity = request.complexity,
        urgency = request.urgency,
        "Model selected"
    );
    Ok(picked)
}

/// Cost preference: sort ascending by cost and index by complexity
/// bracket (0 / 1 / 2), clamped to the candidate count.
fn pick_cheapest<'a>(candidates: &[&'a ModelDescriptor], complexity: f64) -> &'a ModelDescriptor {
    let mut by_cost: Vec<&ModelDescriptor> = candidates.to_vec();
    by_cost.sort_by(|a, b| a.cost_per_1m_tokens.total_cmp(&b.cost_per_1m_tokens));

    let index = if complexity < 0.3 {
        0
    } else if complexity < 0.7 {
        1
    } else {
        2
    };
    by_cost[index.min(by_cost.len() - 1)]
}

/// Performance preference: power tier for genuinely complex tasks,
/// otherwise the first balanced candidate, otherwise the first candidate.
fn pick_strongest<'a>(candidates: &[&'a ModelDescriptor], complexity: f64) -> &'a ModelDescriptor {
    if complexity > 0.7 {
        if let Some(power) = candidates.iter().find(|m| m.tier == ModelTier::Power) {
            return power;
        }
    }
    candidates
        .iter()
        .find(|m| m.tier == ModelTier::Balanced)
        .unwrap_or(&candidates[0])
}

/// Balanced preference: weighted score per candidate. Ties resolve to
/// the earliest catalog entry via the strictly-greater comparison.
fn pick_balanced<'a>(
    candidates: &[&'a ModelDescriptor],
    max_cost: f64,
    performance: &PerformanceTracker,
    complexity: f64,
) -> &'a ModelDescriptor {
    let mut best = candidates[0];
    let mut best_score = f64::MIN;

    for model in candidates {
        let mut score = model.tier.base_score();

        if model.tier.matches_complexity(complexity) {
            score += 0.2;
        }

        if let Some(avg) = performance.average(&model.name) {
            score += avg * 0.3;
        }

        if max_cost > 0.0 {
            score += (1.0 - model.cost_per_1m_tokens / max_cost) * 0.2;
        }

        if score > best_score {
            best_score = score;
            best = model;
        }
    }

    best
}
