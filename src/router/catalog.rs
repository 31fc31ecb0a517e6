//! Static model catalog
//!
//! The catalog is immutable after startup and its insertion order is the
//! documented tie-break order everywhere: equal-score candidates in the
//! selector and same-tier entries in the fallback chain resolve to the
//! earliest catalog entry.

use super::types::{ModelDescriptor, ModelTier, TaskType};
use crate::llm::ProviderKind;
use std::collections::HashMap;

/// Ordered, immutable set of routable models
pub struct ModelCatalog {
    models: Vec<ModelDescriptor>,
}

impl ModelCatalog {
    /// Build a catalog from descriptors, preserving order.
    ///
    /// Duplicate names keep the first occurrence; names must be unique
    /// for `model_used` lookups to stay unambiguous.
    #[must_use]
    pub fn new(models: Vec<ModelDescriptor>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let models = models
            .into_iter()
            .filter(|m| seen.insert(m.name.clone()))
            .collect();
        Self { models }
    }

    /// The production model table: tiers, costs per million tokens and
    /// declared strengths. Specialist models are reached through the
    /// OpenRouter aggregator.
    #[must_use]
    pub fn builtin() -> Self {
        use ProviderKind::{Anthropic, Google, Groq, OpenAi, OpenRouter};
        use TaskType::{Analysis, Code, Creative, General, Math, Review};

        let entry = |name: &str,
                    tier: ModelTier,
                    cost: f64,
                    max_tokens: u32,
                    strengths: &[TaskType],
                    provider: ProviderKind| ModelDescriptor {
            name: name.to_string(),
            tier,
            cost_per_1m_tokens: cost,
            max_tokens,
            strengths: strengths.to_vec(),
            provider,
        };

        Self::new(vec![
            // Flash tier: ultra-fast, cost-optimized
            entry(
                "google/gemini-2.5-flash",
                ModelTier::Flash,
                0.075,
                8192,
                &[General, Code],
                Google,
            ),
            entry(
                "anthropic/claude-3-haiku",
                ModelTier::Flash,
                0.25,
                4096,
                &[General, Analysis],
                Anthropic,
            ),
            entry(
                "openai/gpt-4o-mini",
                ModelTier::Flash,
                0.15,
                4096,
                &[General, Code],
                OpenAi,
            ),
            entry(
                "deepseek/deepseek-v3",
                ModelTier::Flash,
                0.14,
                8192,
                &[Code, Math],
                OpenRouter,
            ),
            entry(
                "groq/llama-3.3-70b-versatile",
                ModelTier::Flash,
                0.59,
                8192,
                &[General, Code],
                Groq,
            ),
            // Balanced tier: speed + quality balance
            entry(
                "anthropic/claude-3-5-sonnet",
                ModelTier::Balanced,
                3.0,
                8192,
                &[Analysis, Review, Creative],
                Anthropic,
            ),
            entry(
                "openai/gpt-4o",
                ModelTier::Balanced,
                5.0,
                8192,
                &[Code, Analysis, General],
                OpenAi,
            ),
            entry(
                "google/gemini-2.5-pro",
                ModelTier::Balanced,
                1.25,
                8192,
                &[Math, Analysis],
                Google,
            ),
            entry(
                "groq/mixtral-8x7b-32768",
                ModelTier::Balanced,
                0.27,
                32768,
                &[Code, Analysis],
                Groq,
            ),
            // Power tier: maximum quality
            entry(
                "anthropic/claude-3-opus",
                ModelTier::Power,
                15.0,
                8192,
                &[Creative, Analysis, Review],
                Anthropic,
            ),
            entry(
                "openai/o1-preview",
                ModelTier::Power,
                15.0,
                8192,
                &[Math, Code, Analysis],
                OpenAi,
            ),
            // Specialist tier: domain-specific
            entry(
                "moonshot/kimi-k2",
                ModelTier::Specialist,
                2.0,
                32768,
                &[Analysis],
                OpenRouter,
            ),
            entry(
                "alibaba/qwen-max-0428",
                ModelTier::Specialist,
                1.8,
                8192,
                &[Code, Math],
                OpenRouter,
            ),
        ])
    }

    /// Look up a model by catalog name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.name == name)
    }

    /// All models in catalog (tie-break) order
    pub fn iter(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.iter()
    }

    /// Number of models in the catalog
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the catalog holds no models
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Highest cost per million tokens across the catalog, used to
    /// normalize inverse-cost scores
    #[must_use]
    pub fn max_cost(&self) -> f64 {
        self.models
            .iter()
            .map(|m| m.cost_per_1m_tokens)
            .fold(0.0, f64::max)
    }

    /// Distinct providers referenced by the catalog
    #[must_use]
    pub fn providers(&self) -> Vec<ProviderKind> {
        let mut out = Vec::new();
        for model in &self.models {
            if !out.contains(&model.provider) {
                out.push(model.provider);
            }
        }
        out
    }

    /// Model counts per tier, for the health endpoint
    #[must_use]
    pub fn count_by_tier(&self) -> HashMap<&'static str, usize> {
        let mut counts = HashMap::new();
        for model in &self.models {
            *counts.entry(model.tier.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_names_are_unique() {
        let catalog = ModelCatalog::builtin();
        let mut seen = std::collections::HashSet::new();
        for model in catalog.iter() {
            assert!(seen.insert(model.name.clone()), "duplicate {}", model.name);
        }
    }

    #[test]
    fn duplicate_names_keep_first_entry() {
        let mk = |cost: f64| ModelDescriptor {
            name: "openai/gpt-4o".into(),
            tier: ModelTier::Balanced,
            cost_per_1m_tokens: cost,
            max_tokens: 8192,
            strengths: vec![TaskType::General],
            provider: ProviderKind::OpenAi,
        };
        let catalog = ModelCatalog::new(vec![mk(5.0), mk(1.0)]);
        assert_eq!(catalog.len(), 1);
        let kept = catalog.get("openai/gpt-4o").expect("model present");
        assert!((kept.cost_per_1m_tokens - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn max_cost_covers_power_tier() {
        let catalog = ModelCatalog::builtin();
        assert!((catalog.max_cost() - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn tier_counts_sum_to_len() {
        let catalog = ModelCatalog::builtin();
        let total: usize = catalog.count_by_tier().values().sum();
        assert_eq!(total, catalog.len());
    }
}
