//! # fedroute-index
//!
//! Sparse-vector retrieval over the historical routing corpus: corpus
//! loading with dedup, TF-IDF vectorisation, cosine nearest-neighbour
//! queries, and per-agent score aggregation. The index is built offline
//! and persisted as a single JSON document; rebuilds are full
//! replacements.

pub mod corpus;
pub mod tfidf;

pub use corpus::{TrainingCorpus, TrainingSample};
pub use tfidf::{IndexedDocument, QueryMatch, TfidfIndex, Vectorizer};
