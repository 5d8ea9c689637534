//! # fedroute
//!
//! Predictive task routing for a heterogeneous agent federation. Given a
//! free-form task description, fedroute picks the best-fit agent from a
//! fixed roster and returns a confidence score, a decision trace and
//! ranked alternatives.
//!
//! ## Quick start
//!
//! ```rust
//! use fedroute::prelude::*;
//!
//! let router = EnsembleRouter::new(RouterConfig::default());
//! let result = router.route("Quick fix: rename this variable inline")?;
//!
//! println!(
//!     "{} (confidence {:.2}, via {})",
//!     result.recommended_agent, result.confidence, result.method
//! );
//! # Ok::<(), fedroute::RouteError>(())
//! ```
//!
//! ## Signals and tiers
//!
//! The router blends up to four signals, each producing a per-agent
//! score distribution:
//!
//! | Signal | Source |
//! |--------|--------|
//! | embedding | dense vectors from an external provider, against a prebuilt cache |
//! | keyword | per-agent taxonomies (keywords, phrase patterns, negative keywords) |
//! | tfidf | cosine neighbours in the historical corpus index |
//! | complexity | coarse task-size match against each agent's bias |
//!
//! A *tier* is a preset weight vector: `tier1` (embedding only), `tier2`
//! (no embedding), `tier3` (keyword only) and the default `hybrid`.
//! Missing signals never fail a query; their weight is redistributed and
//! the degradation is recorded in the result's `method` string.
//!
//! ## Learning
//!
//! The [`HistoricalLearner`] folds completed tasks into per-agent
//! profiles (success-rate EMA, duration running mean, capability-vector
//! reinforcement) so profile-based matching improves over time. Each task
//! id is learned at most once.
//!
//! ## Crates
//!
//! - [`fedroute_core`] — shared types, tokeniser, sparse vectors, storage
//! - [`fedroute_index`] — training corpus and TF-IDF index
//! - [`fedroute_embeddings`] — provider seam, cache, resumable builder
//! - [`fedroute_taxonomy`] — agent registry, taxonomies, complexity
//! - [`fedroute_engine`] — ensemble router, profiles, learner

pub use fedroute_core::{
    AgentScore, BlendWeights, Complexity, MatchResult, Result, RouteError, SignalBreakdown,
    SparseVector, Task, Tier,
};
pub use fedroute_embeddings::{
    BuildProgress, BuildReport, CacheBuilder, CacheStatus, CachedEmbedding, EmbeddingCache,
    EmbeddingError, EmbeddingProvider, EmbeddingResult, OllamaConfig, OllamaProvider,
};
pub use fedroute_engine::{
    best_profile_matches, AgentProfile, CompletionRecord, EnsembleRouter, HistoricalLearner,
    LearnSummary, LearningEvent, LearningStats, ProfileMatch, ProfileStore, Route, RouterConfig,
    Signal, TierComparison,
};
pub use fedroute_index::{TfidfIndex, TrainingCorpus, TrainingSample, Vectorizer};
pub use fedroute_taxonomy::{AgentDefinition, TaxonomyConfig, TaxonomyEntry, AGENTS, TAXONOMY};

/// Prelude for convenient imports.
pub mod prelude {
    pub use fedroute_core::prelude::*;
    pub use fedroute_embeddings::{CacheBuilder, EmbeddingCache, EmbeddingProvider, OllamaProvider};
    pub use fedroute_engine::{
        CompletionRecord, EnsembleRouter, HistoricalLearner, ProfileStore, Route, RouterConfig,
    };
    pub use fedroute_index::{TfidfIndex, TrainingCorpus};
    pub use fedroute_taxonomy::TaxonomyConfig;
}
