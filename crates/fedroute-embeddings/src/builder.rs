//! Resumable embedding-cache builder.
//!
//! Walks the training corpus in order, embedding each task and saving the
//! cache plus a progress record every few samples, so an interrupted build
//! loses at most one batch. Re-running on an unchanged corpus is a no-op:
//! cached texts are skipped, and texts that failed earlier are skipped too
//! unless the caller opts into retrying them.

use crate::cache::{CachedEmbedding, EmbeddingCache};
use crate::provider::EmbeddingProvider;
use chrono::{DateTime, Utc};
use fedroute_core::error::Result;
use fedroute_core::storage;
use fedroute_index::TrainingCorpus;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A sample the provider could not embed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedSample {
    pub task: String,
    pub timestamp: DateTime<Utc>,
}

/// Companion progress record for the cache file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildProgress {
    pub completed: Vec<String>,
    pub failed: Vec<FailedSample>,
    pub last_run: Option<DateTime<Utc>>,
}

impl BuildProgress {
    fn record_failure(&mut self, task: &str) {
        match self.failed.iter_mut().find(|f| f.task == task) {
            Some(existing) => existing.timestamp = Utc::now(),
            None => self.failed.push(FailedSample {
                task: task.to_string(),
                timestamp: Utc::now(),
            }),
        }
    }

    fn clear_failure(&mut self, task: &str) {
        self.failed.retain(|f| f.task != task);
    }
}

/// Outcome of one builder run.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub processed: usize,
    pub newly_cached: usize,
    pub failed: usize,
    pub total_cached: usize,
}

/// Snapshot of cache coverage against a corpus.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub training_samples: usize,
    pub cached: usize,
    pub failed: usize,
    pub pending: usize,
    pub cached_by_agent: BTreeMap<String, usize>,
    pub last_run: Option<DateTime<Utc>>,
}

/// Builds and maintains the on-disk embedding cache.
pub struct CacheBuilder<'a> {
    provider: &'a dyn EmbeddingProvider,
    cache_path: PathBuf,
    progress_path: PathBuf,
    save_interval: usize,
    retry_failed: bool,
}

impl<'a> CacheBuilder<'a> {
    pub fn new(
        provider: &'a dyn EmbeddingProvider,
        cache_path: impl Into<PathBuf>,
        progress_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            provider,
            cache_path: cache_path.into(),
            progress_path: progress_path.into(),
            save_interval: 5,
            retry_failed: false,
        }
    }

    /// Save the cache and progress every `n` processed samples.
    pub fn with_save_interval(mut self, n: usize) -> Self {
        self.save_interval = n.max(1);
        self
    }

    /// Re-attempt samples that failed in an earlier run.
    pub fn with_retry_failed(mut self, retry: bool) -> Self {
        self.retry_failed = retry;
        self
    }

    /// Run the builder over the corpus.
    pub fn build(&self, corpus: &TrainingCorpus) -> Result<BuildReport> {
        let mut cache = EmbeddingCache::load(&self.cache_path).unwrap_or_default();
        let mut progress: BuildProgress =
            storage::read_json(&self.progress_path).unwrap_or_default();

        let mut done: HashSet<String> =
            cache.task_texts().iter().map(|t| t.to_string()).collect();
        done.extend(progress.completed.iter().cloned());
        if !self.retry_failed {
            done.extend(progress.failed.iter().map(|f| f.task.clone()));
        }

        let to_process: Vec<_> = corpus
            .iter()
            .filter(|s| !done.contains(&s.task))
            .cloned()
            .collect();

        debug!(
            total = corpus.len(),
            cached = cache.len(),
            pending = to_process.len(),
            model = self.provider.model_name(),
            "starting embedding cache build"
        );

        let mut report = BuildReport {
            total_cached: cache.len(),
            ..Default::default()
        };

        for sample in &to_process {
            match self.provider.embed(&sample.task) {
                Ok(embedding) => {
                    if let Some(dim) = cache.dimension() {
                        if embedding.len() != dim {
                            warn!(
                                task = %sample.task,
                                expected = dim,
                                got = embedding.len(),
                                "embedding dimension mismatch, recording as failed"
                            );
                            progress.record_failure(&sample.task);
                            report.failed += 1;
                            report.processed += 1;
                            continue;
                        }
                    }
                    cache.push(CachedEmbedding {
                        task: sample.task.clone(),
                        agent: sample.agent.clone(),
                        embedding,
                    });
                    progress.completed.push(sample.task.clone());
                    progress.clear_failure(&sample.task);
                    report.newly_cached += 1;
                }
                Err(e) => {
                    debug!(task = %sample.task, error = %e, "embedding failed");
                    progress.record_failure(&sample.task);
                    report.failed += 1;
                }
            }
            report.processed += 1;

            if report.processed % self.save_interval == 0 {
                cache.save(&self.cache_path)?;
                storage::write_json_atomic(&self.progress_path, &progress)?;
            }
        }

        progress.last_run = Some(Utc::now());
        cache.save(&self.cache_path)?;
        storage::write_json_atomic(&self.progress_path, &progress)?;

        report.total_cached = cache.len();
        Ok(report)
    }

    /// Coverage of the cache against a corpus, without embedding anything.
    pub fn status(&self, corpus: &TrainingCorpus) -> CacheStatus {
        let cache = EmbeddingCache::load(&self.cache_path).unwrap_or_default();
        let progress: BuildProgress =
            storage::read_json(&self.progress_path).unwrap_or_default();

        let cached: HashSet<&str> = cache.task_texts();
        let failed: HashSet<&str> = progress
            .failed
            .iter()
            .map(|f| f.task.as_str())
            .filter(|t| !cached.contains(t))
            .collect();
        let pending = corpus
            .iter()
            .filter(|s| !cached.contains(s.task.as_str()) && !failed.contains(s.task.as_str()))
            .count();

        let mut by_agent: BTreeMap<String, usize> = BTreeMap::new();
        for entry in cache.entries() {
            *by_agent.entry(entry.agent.clone()).or_insert(0) += 1;
        }

        CacheStatus {
            training_samples: corpus.len(),
            cached: cached.len(),
            failed: failed.len(),
            pending,
            cached_by_agent: by_agent,
            last_run: progress.last_run,
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{EmbeddingError, EmbeddingResult};
    use fedroute_index::TrainingSample;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Deterministic in-memory provider for builder tests.
    struct StubProvider {
        dimension: usize,
        fail_tasks: Mutex<HashSet<String>>,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn new(dimension: usize) -> Self {
            Self {
                dimension,
                fail_tasks: Mutex::new(HashSet::new()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing_on(self, task: &str) -> Self {
            self.fail_tasks.lock().unwrap().insert(task.to_string());
            self
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl EmbeddingProvider for StubProvider {
        fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_tasks.lock().unwrap().contains(text) {
                return Err(EmbeddingError::ConnectionFailed("stub".into()));
            }
            // Cheap deterministic vector derived from the text bytes.
            let mut v = vec![0.0f32; self.dimension];
            for (i, b) in text.bytes().enumerate() {
                v[i % self.dimension] += b as f32 / 255.0;
            }
            Ok(v)
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }

    fn corpus() -> TrainingCorpus {
        TrainingCorpus::new(vec![
            TrainingSample {
                task: "Deploy the billing service".into(),
                agent: "kimi".into(),
            },
            TrainingSample {
                task: "Research caching strategies".into(),
                agent: "claude".into(),
            },
            TrainingSample {
                task: "Draft the release notes".into(),
                agent: "ollama".into(),
            },
        ])
    }

    #[test]
    fn build_then_rebuild_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("ollama_index.json");
        let progress_path = dir.path().join("build_progress.json");
        let provider = StubProvider::new(8);

        let builder = CacheBuilder::new(&provider, &cache_path, &progress_path);
        let first = builder.build(&corpus()).unwrap();
        assert_eq!(first.newly_cached, 3);
        assert_eq!(provider.call_count(), 3);

        let second = builder.build(&corpus()).unwrap();
        assert_eq!(second.newly_cached, 0);
        assert_eq!(second.total_cached, 3);
        assert_eq!(provider.call_count(), 3, "no provider calls on rebuild");
    }

    #[test]
    fn failures_are_recorded_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("ollama_index.json");
        let progress_path = dir.path().join("build_progress.json");
        let provider = StubProvider::new(8).failing_on("Research caching strategies");

        let builder = CacheBuilder::new(&provider, &cache_path, &progress_path);
        let report = builder.build(&corpus()).unwrap();
        assert_eq!(report.newly_cached, 2);
        assert_eq!(report.failed, 1);

        // Without retry the failed task stays skipped.
        let again = builder.build(&corpus()).unwrap();
        assert_eq!(again.processed, 0);

        let status = builder.status(&corpus());
        assert_eq!(status.cached, 2);
        assert_eq!(status.failed, 1);
        assert_eq!(status.pending, 0);
        assert!(status.last_run.is_some());
    }

    #[test]
    fn retry_failed_clears_the_failure() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("ollama_index.json");
        let progress_path = dir.path().join("build_progress.json");

        let failing = StubProvider::new(8).failing_on("Draft the release notes");
        CacheBuilder::new(&failing, &cache_path, &progress_path)
            .build(&corpus())
            .unwrap();

        let healthy = StubProvider::new(8);
        let report = CacheBuilder::new(&healthy, &cache_path, &progress_path)
            .with_retry_failed(true)
            .build(&corpus())
            .unwrap();
        assert_eq!(report.newly_cached, 1);
        assert_eq!(report.total_cached, 3);

        let status = CacheBuilder::new(&healthy, &cache_path, &progress_path).status(&corpus());
        assert_eq!(status.failed, 0);
    }

    #[test]
    fn dimension_drift_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("ollama_index.json");
        let progress_path = dir.path().join("build_progress.json");

        let narrow = StubProvider::new(4);
        let partial = TrainingCorpus::new(vec![TrainingSample {
            task: "Deploy the billing service".into(),
            agent: "kimi".into(),
        }]);
        CacheBuilder::new(&narrow, &cache_path, &progress_path)
            .build(&partial)
            .unwrap();

        // A provider that suddenly returns wider vectors must not poison
        // the cache.
        let wide = StubProvider::new(16);
        let report = CacheBuilder::new(&wide, &cache_path, &progress_path)
            .build(&corpus())
            .unwrap();
        assert_eq!(report.failed, 2);

        let cache = EmbeddingCache::load(&cache_path).unwrap();
        assert!(cache.dimensions_consistent());
        assert_eq!(cache.dimension(), Some(4));
    }
}
