//! The ensemble router — blends the available signals, applies the
//! per-agent threshold gate, and always answers.
//!
//! Degradation is encoded in the `method` string rather than in errors:
//! `tier2-keyword-fallback` when embeddings were requested but
//! unavailable, `-threshold-adjusted` when a close runner-up was adopted,
//! `-fallback` when the configured fallback agent was, and
//! `fallback-error` when no signal existed at all.

use crate::config::RouterConfig;
use crate::signal::{
    ComplexitySignal, EmbeddingSignal, KeywordSignal, Signal, SignalScores, TfidfSignal,
};
use fedroute_core::error::{Result, RouteError};
use fedroute_core::types::{
    round4, AgentScore, BlendWeights, MatchResult, SignalBreakdown, Tier,
};
use fedroute_embeddings::{EmbeddingCache, EmbeddingProvider, OllamaConfig, OllamaProvider};
use fedroute_index::TfidfIndex;
use fedroute_taxonomy::registry;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// The routing interface exposed to consumers.
pub trait Route {
    /// Route a task to its best-fit agent.
    fn route(&self, task: &str) -> Result<MatchResult>;

    /// Route with the per-signal breakdown populated.
    fn explain(&self, task: &str) -> Result<MatchResult>;
}

/// Per-tier comparison of one task.
#[derive(Debug, Clone, Serialize)]
pub struct TierComparison {
    pub task: String,
    pub tier1: MatchResult,
    pub tier2: MatchResult,
    pub tier3: MatchResult,
    pub hybrid: MatchResult,
}

impl TierComparison {
    /// The agreed agent when every tier recommends the same one.
    pub fn consensus(&self) -> Option<&str> {
        let first = self.tier1.recommended_agent.as_str();
        [&self.tier2, &self.tier3, &self.hybrid]
            .iter()
            .all(|r| r.recommended_agent == first)
            .then_some(first)
    }
}

/// Multi-tier similarity router over a fixed agent federation.
///
/// The index and cache are immutable during queries; `swap_index`
/// replaces the index wholesale after an offline rebuild.
pub struct EnsembleRouter {
    config: RouterConfig,
    index: Option<TfidfIndex>,
    cache: Option<EmbeddingCache>,
    provider: Option<Box<dyn EmbeddingProvider>>,
}

impl EnsembleRouter {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            index: None,
            cache: None,
            provider: None,
        }
    }

    /// Attach a prebuilt TF-IDF index (Tier 2).
    pub fn with_index(mut self, index: TfidfIndex) -> Self {
        self.index = Some(index);
        self
    }

    /// Attach the embedding tier (Tier 1): a live provider for the query
    /// plus the prebuilt training cache.
    pub fn with_embeddings(
        mut self,
        provider: Box<dyn EmbeddingProvider>,
        cache: EmbeddingCache,
    ) -> Self {
        self.provider = Some(provider);
        self.cache = Some(cache);
        self
    }

    /// Attach an Ollama-backed embedding tier at `endpoint`, honouring
    /// the configured embedding timeout.
    pub fn with_ollama(
        self,
        endpoint: &str,
        cache: EmbeddingCache,
    ) -> std::result::Result<Self, fedroute_embeddings::EmbeddingError> {
        let provider_config = OllamaConfig {
            timeout_ms: self.config.embedding_timeout_ms,
            ..OllamaConfig::default()
        };
        let provider = OllamaProvider::new(endpoint, provider_config)?;
        Ok(self.with_embeddings(Box::new(provider), cache))
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Replace the index after an offline rebuild.
    pub fn swap_index(&mut self, index: TfidfIndex) {
        self.index = Some(index);
    }

    /// Rebuild the index from a training corpus with the configured
    /// n-gram options and swap it in. Queries in flight on other clones
    /// keep the index they started with.
    pub fn rebuild_index(&mut self, corpus: &fedroute_index::TrainingCorpus) {
        let index = TfidfIndex::build(corpus, self.config.use_bigrams, self.config.use_trigrams);
        self.swap_index(index);
    }

    /// Route under an explicit tier preset, ignoring any configured
    /// weight override.
    pub fn route_tier(&self, task: &str, tier: Tier) -> Result<MatchResult> {
        self.route_inner(task, tier, BlendWeights::for_tier(tier), false)
    }

    /// Route with the task-type tag prefixed into the scored text.
    pub fn route_with_type(&self, task: &str, task_type: Option<&str>) -> Result<MatchResult> {
        if task.trim().is_empty() {
            return Err(RouteError::InvalidInput(
                "task description is empty".to_string(),
            ));
        }
        match task_type {
            Some(t) if !t.trim().is_empty() => self.route(&format!("{t} {task}")),
            _ => self.route(task),
        }
    }

    /// Run every tier against the task and report agreement.
    pub fn route_all_tiers(&self, task: &str) -> Result<TierComparison> {
        Ok(TierComparison {
            task: task.to_string(),
            tier1: self.route_tier(task, Tier::Tier1)?,
            tier2: self.route_tier(task, Tier::Tier2)?,
            tier3: self.route_tier(task, Tier::Tier3)?,
            hybrid: self.route_tier(task, Tier::Hybrid)?,
        })
    }

    fn embedding_scores(&self, task: &str) -> Option<SignalScores> {
        let cache = self.cache.as_ref()?;
        let provider = self.provider.as_ref()?;
        EmbeddingSignal {
            provider: provider.as_ref(),
            cache,
        }
        .scores(task)
    }

    fn route_inner(
        &self,
        task: &str,
        tier: Tier,
        weights: BlendWeights,
        explain: bool,
    ) -> Result<MatchResult> {
        if task.trim().is_empty() {
            return Err(RouteError::InvalidInput(
                "task description is empty".to_string(),
            ));
        }

        let mut tier = tier;
        let mut weights = weights;

        // A TF-IDF-only request without an index degrades straight to the
        // keyword tier.
        if weights.tfidf > 0.0
            && self.index.is_none()
            && weights.keyword == 0.0
            && weights.embedding == 0.0
        {
            debug!("no index available, degrading to tier3");
            tier = Tier::Tier3;
            weights = BlendWeights::for_tier(Tier::Tier3);
        }

        let embed_scores = (weights.embedding > 0.0)
            .then(|| self.embedding_scores(task))
            .flatten();
        let kw_scores = (weights.keyword > 0.0).then(|| {
            KeywordSignal {
                config: self.config.taxonomy,
            }
            .scores(task)
        });
        let kw_scores = kw_scores.flatten();
        let tfidf_scores = if weights.tfidf > 0.0 {
            self.index.as_ref().and_then(|index| {
                TfidfSignal {
                    index,
                    top_k: self.config.top_k,
                }
                .scores(task)
            })
        } else {
            None
        };
        let cx_scores = (weights.complexity > 0.0)
            .then(|| ComplexitySignal.scores(task))
            .flatten();

        let mut method_base = tier.as_str().to_string();

        // Embeddings requested but unavailable: rebalance onto keywords,
        // or give up entirely when there is no keyword weight to carry.
        if weights.embedding > 0.0 && embed_scores.is_none() {
            if weights.keyword > 0.0 {
                debug!("embedding signal unavailable, rebalancing to keyword-heavy blend");
                weights = BlendWeights::new(0.0, 0.8, 0.2, 0.0);
                tier = Tier::Tier2;
                method_base = "tier2-keyword-fallback".to_string();
            } else {
                debug!("no usable signal, emitting fallback-error result");
                return Ok(self.fallback_error_result());
            }
        }

        // Blend, walking agents in canonical registry order so exact ties
        // resolve stably.
        let final_scores: Vec<(String, f64)> = registry::agent_ids()
            .map(|agent| {
                let mut score = 0.0;
                if let Some(s) = &embed_scores {
                    score += weights.embedding * s.get(agent).copied().unwrap_or(0.0);
                }
                if let Some(s) = &kw_scores {
                    score += weights.keyword * s.get(agent).copied().unwrap_or(0.0);
                }
                if let Some(s) = &tfidf_scores {
                    score += weights.tfidf * s.get(agent).copied().unwrap_or(0.0);
                }
                if let Some(s) = &cx_scores {
                    score += weights.complexity * s.get(agent).copied().unwrap_or(0.0);
                }
                (agent.to_string(), score)
            })
            .collect();

        let (mut winner, mut confidence) = final_scores
            .iter()
            .fold((String::new(), f64::NEG_INFINITY), |(best, max), (agent, score)| {
                if *score > max {
                    (agent.clone(), *score)
                } else {
                    (best, max)
                }
            });

        // Threshold gate: adopt a close qualifying runner-up, else the
        // configured fallback agent.
        let mut suffix = "";
        if confidence < self.config.threshold(&winner) {
            let mut sorted = final_scores.clone();
            sorted.sort_by(|a, b| {
                b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal)
            });

            let adopted_second = sorted.get(1).is_some_and(|(second, second_score)| {
                if *second_score >= self.config.threshold(second)
                    && (confidence - second_score) < 0.10
                {
                    winner = second.clone();
                    confidence = *second_score;
                    true
                } else {
                    false
                }
            });

            if adopted_second {
                suffix = "-threshold-adjusted";
            } else {
                winner = self.config.fallback_agent.clone();
                confidence = final_scores
                    .iter()
                    .find(|(agent, _)| *agent == winner)
                    .map(|(_, score)| *score)
                    .unwrap_or(0.0);
                suffix = "-fallback";
            }
        }

        let mut scores: Vec<AgentScore> = final_scores
            .iter()
            .map(|(agent, score)| AgentScore {
                agent: agent.clone(),
                score: round4(*score),
            })
            .collect();
        scores.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let alternatives: Vec<AgentScore> = scores
            .iter()
            .filter(|s| s.agent != winner)
            .cloned()
            .collect();

        let signals = explain.then(|| SignalBreakdown {
            embedding: embed_scores.as_ref().map(full_rounded),
            keyword: kw_scores.as_ref().map(full_rounded),
            tfidf: tfidf_scores.as_ref().map(full_rounded),
            complexity: cx_scores.as_ref().map(full_rounded),
        });

        Ok(MatchResult {
            recommended_agent: winner,
            // The complexity mismatch penalty can push a raw blend below
            // zero; the reported confidence stays a probability.
            confidence: round4(confidence.clamp(0.0, 1.0)),
            method: format!("{method_base}-ensemble{suffix}"),
            tier,
            weights,
            scores,
            alternatives,
            signals,
        })
    }

    fn fallback_error_result(&self) -> MatchResult {
        MatchResult {
            recommended_agent: self.config.fallback_agent.clone(),
            confidence: 0.0,
            method: "fallback-error".to_string(),
            tier: Tier::FallbackError,
            weights: BlendWeights::new(0.0, 0.0, 0.0, 0.0),
            scores: Vec::new(),
            alternatives: Vec::new(),
            signals: None,
        }
    }
}

impl Route for EnsembleRouter {
    fn route(&self, task: &str) -> Result<MatchResult> {
        let tier = self.config.tier;
        let weights = self
            .config
            .weights
            .unwrap_or_else(|| BlendWeights::for_tier(tier));
        self.route_inner(task, tier, weights, false)
    }

    fn explain(&self, task: &str) -> Result<MatchResult> {
        let tier = self.config.tier;
        let weights = self
            .config
            .weights
            .unwrap_or_else(|| BlendWeights::for_tier(tier));
        self.route_inner(task, tier, weights, true)
    }
}

/// Expand a signal map to every registry agent, rounded for display.
fn full_rounded(scores: &SignalScores) -> BTreeMap<String, f64> {
    registry::agent_ids()
        .map(|agent| {
            (
                agent.to_string(),
                round4(scores.get(agent).copied().unwrap_or(0.0)),
            )
        })
        .collect()
}
