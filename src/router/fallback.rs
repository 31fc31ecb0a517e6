//! Fallback chain construction
//!
//! After the primary model fails terminally, the remaining models are
//! tried in a deterministic order: same-tier models in catalog order,
//! then every other tier ascending by cost.

use super::catalog::ModelCatalog;
use super::types::ModelDescriptor;

/// Ordered list of alternate models to try after `failed`.
#[must_use]
pub fn fallback_chain<'a>(
    catalog: &'a ModelCatalog,
    failed: &ModelDescriptor,
) -> Vec<&'a ModelDescriptor> {
    let mut chain: Vec<&ModelDescriptor> = catalog
        .iter()
        .filter(|m| m.tier == failed.tier && m.name != failed.name)
        .collect();

    let mut other_tiers: Vec<&ModelDescriptor> =
        catalog.iter().filter(|m| m.tier != failed.tier).collect();
    other_tiers.sort_by(|a, b| a.cost_per_1m_tokens.total_cmp(&b.cost_per_1m_tokens));

    chain.extend(other_tiers);
    chain
}
