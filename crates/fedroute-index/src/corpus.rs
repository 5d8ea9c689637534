//! The training corpus — historical `{task, agent}` pairs.

use fedroute_core::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;

/// One historical routing decision.
///
/// `expected_agent` is accepted as a legacy key for `agent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSample {
    pub task: String,
    #[serde(alias = "expected_agent")]
    pub agent: String,
}

/// An ordered, deduplicated collection of training samples.
#[derive(Debug, Clone, Default)]
pub struct TrainingCorpus {
    samples: Vec<TrainingSample>,
}

impl TrainingCorpus {
    /// Build a corpus, dropping duplicate task texts (case-insensitive,
    /// first occurrence wins).
    pub fn new(samples: Vec<TrainingSample>) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        let mut deduped = Vec::with_capacity(samples.len());
        for sample in samples {
            if seen.insert(sample.task.to_lowercase()) {
                deduped.push(sample);
            }
        }
        Self { samples: deduped }
    }

    /// Load a corpus from a JSON array on disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let samples: Vec<TrainingSample> = serde_json::from_str(&raw)?;
        let corpus = Self::new(samples);
        debug!(path = %path.display(), samples = corpus.len(), "loaded training corpus");
        Ok(corpus)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[TrainingSample] {
        &self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrainingSample> {
        self.samples.iter()
    }
}
