//! The on-disk embedding cache.
//!
//! Every entry must share one embedding dimension; the dimension is
//! validated when a cache is loaded and a mismatch invalidates the whole
//! file (the router then routes without the embedding signal).

use fedroute_core::error::Result;
use fedroute_core::storage;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::warn;

/// One cached training embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedEmbedding {
    pub task: String,
    pub agent: String,
    pub embedding: Vec<f32>,
}

/// An ordered collection of cached training embeddings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbeddingCache {
    embeddings: Vec<CachedEmbedding>,
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    pub fn entries(&self) -> &[CachedEmbedding] {
        &self.embeddings
    }

    pub fn push(&mut self, entry: CachedEmbedding) {
        self.embeddings.push(entry);
    }

    /// Task texts already present, for resume bookkeeping.
    pub fn task_texts(&self) -> HashSet<&str> {
        self.embeddings.iter().map(|e| e.task.as_str()).collect()
    }

    /// The shared embedding dimension, if any entries exist.
    pub fn dimension(&self) -> Option<usize> {
        self.embeddings.first().map(|e| e.embedding.len())
    }

    /// True when every entry matches the first entry's dimension.
    pub fn dimensions_consistent(&self) -> bool {
        match self.dimension() {
            Some(dim) => self.embeddings.iter().all(|e| e.embedding.len() == dim),
            None => true,
        }
    }

    /// Load a cache from disk.
    ///
    /// Missing and corrupt files read as `None`; so does a cache whose
    /// entries disagree on dimension.
    pub fn load(path: &Path) -> Option<Self> {
        let cache: Self = storage::read_json(path)?;
        if !cache.dimensions_consistent() {
            warn!(
                path = %path.display(),
                "embedding cache has inconsistent dimensions, treating as invalid"
            );
            return None;
        }
        Some(cache)
    }

    /// Persist to disk (atomic write).
    pub fn save(&self, path: &Path) -> Result<()> {
        storage::write_json_atomic(path, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(task: &str, agent: &str, embedding: Vec<f32>) -> CachedEmbedding {
        CachedEmbedding {
            task: task.into(),
            agent: agent.into(),
            embedding,
        }
    }

    #[test]
    fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ollama_index.json");

        let mut cache = EmbeddingCache::new();
        cache.push(entry("Fix the bug", "kimi", vec![0.1, 0.2, 0.3]));
        cache.push(entry("Research auth", "claude", vec![0.4, 0.5, 0.6]));
        cache.save(&path).unwrap();

        let loaded = EmbeddingCache::load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.dimension(), Some(3));
    }

    #[test]
    fn dimension_mismatch_invalidates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ollama_index.json");

        let mut cache = EmbeddingCache::new();
        cache.push(entry("a task", "kimi", vec![0.1, 0.2]));
        cache.push(entry("another", "claude", vec![0.1, 0.2, 0.3]));
        assert!(!cache.dimensions_consistent());
        cache.save(&path).unwrap();

        assert!(EmbeddingCache::load(&path).is_none());
    }

    #[test]
    fn empty_cache_is_consistent() {
        assert!(EmbeddingCache::new().dimensions_consistent());
        assert_eq!(EmbeddingCache::new().dimension(), None);
    }
}
