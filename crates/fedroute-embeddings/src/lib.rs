//! # fedroute-embeddings
//!
//! The dense-vector tier of the routing ensemble:
//!
//! - [`EmbeddingProvider`] — the seam to an external embedding service,
//!   with an Ollama implementation behind a bounded timeout
//! - [`EmbeddingCache`] — precomputed training-task vectors, validated
//!   for dimensional consistency at load time
//! - [`CacheBuilder`] — resumable, idempotent batch construction of the
//!   cache with per-sample progress tracking
//! - similarity helpers for query-time aggregation
//!
//! The router never calls the provider for training tasks at query time;
//! only the incoming task is embedded live and compared against the cache.

pub mod builder;
pub mod cache;
pub mod provider;
pub mod similarity;

pub use builder::{BuildProgress, BuildReport, CacheBuilder, CacheStatus, FailedSample};
pub use cache::{CachedEmbedding, EmbeddingCache};
pub use provider::{
    EmbeddingError, EmbeddingProvider, EmbeddingResult, OllamaConfig, OllamaProvider,
};
pub use similarity::{agent_similarities, cosine_similarity};
