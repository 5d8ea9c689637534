//! # fedroute-engine
//!
//! The decision layer of fedroute: the ensemble router that blends the
//! embedding, keyword, TF-IDF and complexity signals, the mutable agent
//! profile store, the profile matcher, and the historical learner that
//! folds completed tasks back into the profiles.
//!
//! The router is read-only during a query; the profile store and learning
//! log are the only mutable persistent state, owned by the learner.

pub mod config;
pub mod learner;
pub mod matcher;
pub mod profile;
pub mod router;
pub mod signal;

pub use config::RouterConfig;
pub use learner::{
    CompletionRecord, HistoricalLearner, LearnSummary, LearningEvent, LearningStats,
};
pub use matcher::{best_profile_matches, ProfileMatch};
pub use profile::{AgentProfile, ProfileStore};
pub use router::{EnsembleRouter, Route, TierComparison};
pub use signal::{
    ComplexitySignal, EmbeddingSignal, KeywordSignal, Signal, SignalScores, TfidfSignal,
};
