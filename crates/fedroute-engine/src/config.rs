//! Router configuration.

use fedroute_core::types::{BlendWeights, Tier};
use fedroute_taxonomy::TaxonomyConfig;
use std::collections::BTreeMap;

/// Tunable parameters of the ensemble router.
///
/// The defaults are the reference federation values; every knob has a
/// builder-style setter.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Default tier when no explicit weights are given.
    pub tier: Tier,
    /// Explicit blend override; takes precedence over the tier preset.
    pub weights: Option<BlendWeights>,
    /// TF-IDF neighbours aggregated per query.
    pub top_k: usize,
    /// Expand query/document tokens with bigrams.
    pub use_bigrams: bool,
    /// Expand query/document tokens with trigrams.
    pub use_trigrams: bool,
    /// Per-agent acceptance thresholds.
    pub agent_thresholds: BTreeMap<String, f64>,
    /// Threshold applied to agents missing from the table.
    pub default_threshold: f64,
    /// Agent adopted when no winner clears its threshold and no close
    /// runner-up exists.
    pub fallback_agent: String,
    /// Deadline for live embedding calls, in milliseconds.
    pub embedding_timeout_ms: u64,
    /// Keyword-scoring factors.
    pub taxonomy: TaxonomyConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        let agent_thresholds = [
            ("kimi", 0.35),
            ("claude", 0.45),
            ("copilot", 0.30),
            ("codex", 0.40),
            ("ollama", 0.50),
        ]
        .into_iter()
        .map(|(a, t)| (a.to_string(), t))
        .collect();

        Self {
            tier: Tier::Hybrid,
            weights: None,
            top_k: 3,
            use_bigrams: true,
            use_trigrams: true,
            agent_thresholds,
            default_threshold: 0.40,
            fallback_agent: "kimi".to_string(),
            embedding_timeout_ms: 5_000,
            taxonomy: TaxonomyConfig::default(),
        }
    }
}

impl RouterConfig {
    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = tier;
        self
    }

    pub fn with_weights(mut self, weights: BlendWeights) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn with_ngrams(mut self, bigrams: bool, trigrams: bool) -> Self {
        self.use_bigrams = bigrams;
        self.use_trigrams = trigrams;
        self
    }

    pub fn with_fallback_agent(mut self, agent: impl Into<String>) -> Self {
        self.fallback_agent = agent.into();
        self
    }

    pub fn with_threshold(mut self, agent: impl Into<String>, threshold: f64) -> Self {
        self.agent_thresholds.insert(agent.into(), threshold);
        self
    }

    pub fn with_embedding_timeout_ms(mut self, ms: u64) -> Self {
        self.embedding_timeout_ms = ms;
        self
    }

    pub fn with_taxonomy_config(mut self, taxonomy: TaxonomyConfig) -> Self {
        self.taxonomy = taxonomy;
        self
    }

    /// Acceptance threshold for an agent.
    pub fn threshold(&self, agent: &str) -> f64 {
        self.agent_thresholds
            .get(agent)
            .copied()
            .unwrap_or(self.default_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_thresholds() {
        let config = RouterConfig::default();
        assert_eq!(config.threshold("kimi"), 0.35);
        assert_eq!(config.threshold("ollama"), 0.50);
        assert_eq!(config.threshold("unknown"), 0.40);
        assert_eq!(config.fallback_agent, "kimi");
        assert_eq!(config.tier, Tier::Hybrid);
    }

    #[test]
    fn builder_chain() {
        let config = RouterConfig::default()
            .with_tier(Tier::Tier2)
            .with_top_k(5)
            .with_threshold("claude", 0.6)
            .with_fallback_agent("copilot")
            .with_ngrams(true, false)
            .with_taxonomy_config(TaxonomyConfig {
                phrase_bonus: 3.0,
                negative_penalty: 0.25,
            });
        assert_eq!(config.tier, Tier::Tier2);
        assert_eq!(config.top_k, 5);
        assert_eq!(config.threshold("claude"), 0.6);
        assert_eq!(config.fallback_agent, "copilot");
        assert!(!config.use_trigrams);
        assert_eq!(config.taxonomy.phrase_bonus, 3.0);
    }
}
