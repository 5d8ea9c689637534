//! Signal sources for the ensemble.
//!
//! Each signal produces a per-agent score map, or `None` when it has
//! nothing to say (provider down, cache missing, no index). Unavailability
//! is a value here, not an error; the router redistributes the weight.

use fedroute_embeddings::{agent_similarities, EmbeddingCache, EmbeddingProvider};
use fedroute_index::TfidfIndex;
use fedroute_taxonomy::TaxonomyConfig;
use std::collections::BTreeMap;
use tracing::debug;

/// Per-agent scores from one source.
pub type SignalScores = BTreeMap<String, f64>;

/// One pluggable input to the ensemble.
pub trait Signal {
    fn name(&self) -> &'static str;

    /// Score every agent for this task, or report unavailability.
    fn scores(&self, task: &str) -> Option<SignalScores>;
}

/// Keyword-taxonomy scores. Always available; may be uniformly zero.
pub struct KeywordSignal {
    pub config: TaxonomyConfig,
}

impl Signal for KeywordSignal {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn scores(&self, task: &str) -> Option<SignalScores> {
        Some(fedroute_taxonomy::keyword_scores(task, &self.config))
    }
}

/// Complexity-bias match scores. Always available.
pub struct ComplexitySignal;

impl Signal for ComplexitySignal {
    fn name(&self) -> &'static str {
        "complexity"
    }

    fn scores(&self, task: &str) -> Option<SignalScores> {
        Some(fedroute_taxonomy::complexity_scores(task))
    }
}

/// TF-IDF neighbour scores from the corpus index.
pub struct TfidfSignal<'a> {
    pub index: &'a TfidfIndex,
    pub top_k: usize,
}

impl Signal for TfidfSignal<'_> {
    fn name(&self) -> &'static str {
        "tfidf"
    }

    fn scores(&self, task: &str) -> Option<SignalScores> {
        if self.index.is_empty() {
            return None;
        }
        Some(self.index.agent_scores(task, self.top_k))
    }
}

/// Dense-embedding scores: one live provider call for the query, compared
/// against the prebuilt cache.
pub struct EmbeddingSignal<'a> {
    pub provider: &'a dyn EmbeddingProvider,
    pub cache: &'a EmbeddingCache,
}

impl Signal for EmbeddingSignal<'_> {
    fn name(&self) -> &'static str {
        "embedding"
    }

    fn scores(&self, task: &str) -> Option<SignalScores> {
        if self.cache.is_empty() {
            return None;
        }
        let query = match self.provider.embed(task) {
            Ok(vector) => vector,
            Err(e) => {
                debug!(error = %e, "embedding provider unavailable");
                return None;
            }
        };
        agent_similarities(&query, self.cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fedroute_embeddings::{EmbeddingError, EmbeddingResult};

    struct DownProvider;

    impl EmbeddingProvider for DownProvider {
        fn embed(&self, _text: &str) -> EmbeddingResult<Vec<f32>> {
            Err(EmbeddingError::ConnectionFailed("test".into()))
        }

        fn model_name(&self) -> &str {
            "down"
        }
    }

    #[test]
    fn keyword_signal_is_always_available() {
        let signal = KeywordSignal {
            config: TaxonomyConfig::default(),
        };
        let scores = signal.scores("xyzzy").unwrap();
        assert!(scores.values().all(|s| *s == 0.0));
    }

    #[test]
    fn embedding_signal_unavailable_without_cache_or_provider() {
        let cache = EmbeddingCache::new();
        let provider = DownProvider;
        let signal = EmbeddingSignal {
            provider: &provider,
            cache: &cache,
        };
        assert!(signal.scores("deploy the api").is_none());
    }
}
