//! Routing data model: model descriptors, requests and results.

use crate::llm::{Message, ProviderKind, TokenUsage};
use serde::{Deserialize, Serialize};

/// Coarse cost/quality bucket assigned to each model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// Ultra-fast, cost-optimized
    Flash,
    /// Balance of speed and quality
    Balanced,
    /// High-quality, slower
    Power,
    /// Domain-specific models
    Specialist,
}

impl ModelTier {
    /// Base score used by balanced-preference selection
    #[must_use]
    pub const fn base_score(self) -> f64 {
        match self {
            Self::Flash => 0.6,
            Self::Balanced => 0.8,
            Self::Power => 1.0,
            Self::Specialist => 0.9,
        }
    }

    /// Whether this tier is the natural match for a complexity score.
    ///
    /// Brackets: below 0.3 flash, below 0.7 balanced, otherwise
    /// power or specialist.
    #[must_use]
    pub fn matches_complexity(self, complexity: f64) -> bool {
        if complexity < 0.3 {
            self == Self::Flash
        } else if complexity < 0.7 {
            self == Self::Balanced
        } else {
            self == Self::Power || self == Self::Specialist
        }
    }

    /// Stable lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flash => "flash",
            Self::Balanced => "balanced",
            Self::Power => "power",
            Self::Specialist => "specialist",
        }
    }
}

/// Task classification used to filter models by declared strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    /// Programming and code generation
    Code,
    /// Mathematical reasoning
    Math,
    /// Creative writing
    Creative,
    /// Data and document analysis
    Analysis,
    /// General conversation
    General,
    /// Code or document review
    Review,
}

impl TaskType {
    /// Stable lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Math => "math",
            Self::Creative => "creative",
            Self::Analysis => "analysis",
            Self::General => "general",
            Self::Review => "review",
        }
    }
}

/// Cost/quality trade-off requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostPreference {
    /// Cheapest suitable model
    Cost,
    /// Weighted score across tier, cost and history
    #[default]
    Balanced,
    /// Highest-quality tier available
    Performance,
}

/// Static description of one routable model
#[derive(Debug, Clone, Serialize)]
pub struct ModelDescriptor {
    /// Unique catalog name, "vendor/model"
    pub name: String,
    /// Cost/quality tier
    pub tier: ModelTier,
    /// Cost per million tokens, USD
    pub cost_per_1m_tokens: f64,
    /// Maximum output tokens the model accepts
    pub max_tokens: u32,
    /// Task types this model is declared good at
    pub strengths: Vec<TaskType>,
    /// Provider owning the model
    pub provider: ProviderKind,
}

impl ModelDescriptor {
    /// Whether the model declares strength for the task
    #[must_use]
    pub fn suits(&self, task: TaskType) -> bool {
        self.strengths.contains(&task)
    }

    /// Estimated cost in USD for a token count
    #[must_use]
    pub fn cost_for_tokens(&self, total_tokens: u32) -> f64 {
        (f64::from(total_tokens) / 1_000_000.0) * self.cost_per_1m_tokens
    }
}

fn default_complexity() -> f64 {
    0.5
}

fn default_urgency() -> f64 {
    0.5
}

fn default_temperature() -> f32 {
    0.7
}

/// One completion request as accepted by `POST /complete`
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionRequest {
    /// Ordered conversation messages
    pub messages: Vec<Message>,
    /// Optional task tag for strength filtering
    #[serde(default)]
    pub task_type: Option<TaskType>,
    /// Task complexity in [0, 1]
    #[serde(default = "default_complexity")]
    pub complexity: f64,
    /// Response urgency in [0, 1]; accepted and logged, not used in scoring
    #[serde(default = "default_urgency")]
    pub urgency: f64,
    /// Cost/quality trade-off
    #[serde(default)]
    pub cost_preference: CostPreference,
    /// Explicit model override; unknown names fall back to scoring
    #[serde(default)]
    pub force_model: Option<String>,
    /// Response token cap; clamped to the model's own maximum
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// Successful completion outcome, also the cached value shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResult {
    /// Always true; failures use a separate body
    pub success: bool,
    /// Catalog name of the model that answered
    pub model_used: String,
    /// Generated text
    pub content: String,
    /// Token accounting from the provider
    pub usage: TokenUsage,
    /// Estimated cost in USD
    pub cost_estimate: f64,
    /// Wall-clock seconds for the winning attempt
    pub execution_time: f64,
    /// Provider that served the request
    pub provider: ProviderKind,
    /// Tier of the model used
    pub tier: ModelTier,
    /// Whether the result came from the response cache
    pub cache_hit: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complexity_brackets_match_tiers() {
        assert!(ModelTier::Flash.matches_complexity(0.1));
        assert!(!ModelTier::Flash.matches_complexity(0.5));
        assert!(ModelTier::Balanced.matches_complexity(0.5));
        assert!(ModelTier::Power.matches_complexity(0.9));
        assert!(ModelTier::Specialist.matches_complexity(0.7));
    }

    #[test]
    fn cost_estimate_scales_with_tokens() {
        let model = ModelDescriptor {
            name: "openai/gpt-4o".into(),
            tier: ModelTier::Balanced,
            cost_per_1m_tokens: 5.0,
            max_tokens: 8192,
            strengths: vec![TaskType::General],
            provider: crate::llm::ProviderKind::OpenAi,
        };
        let cost = model.cost_for_tokens(500_000);
        assert!((cost - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn request_defaults_fill_optional_fields() {
        let req: CompletionRequest = serde_json::from_value(serde_json::json!({
            "messages": [{"role": "user", "content": "hi"}]
        }))
        .expect("request parses");
        assert!((req.complexity - 0.5).abs() < f64::EPSILON);
        assert_eq!(req.cost_preference, CostPreference::Balanced);
        assert!(req.force_model.is_none());
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
    }
}
