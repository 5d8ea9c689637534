//! The historical learner — folds completed tasks into agent profiles.
//!
//! Each completion is learned at most once: the learning log keeps the
//! observed task ids and is consulted before any profile mutation. The log
//! entry is persisted before the profile update so a crash between the two
//! can only under-count, never double-apply.

use crate::profile::ProfileStore;
use chrono::{DateTime, Utc};
use fedroute_core::error::Result;
use fedroute_core::sparse::SparseVector;
use fedroute_core::storage;
use fedroute_core::types::Task;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

/// Minimum cosine similarity for a past task to count as "similar".
const SIMILARITY_THRESHOLD: f64 = 0.3;
/// How many recent similar tasks feed the success prediction.
const RECENT_WINDOW: usize = 5;
/// Per-agent cap on retained completion vectors.
const HISTORY_CAP: usize = 50;
/// Events considered "recent" in the stats summary.
const STATS_WINDOW: usize = 50;

/// A completed task ready to be learned.
#[derive(Debug, Clone)]
pub struct CompletionRecord {
    pub task_id: String,
    pub agent_id: String,
    pub description: String,
    pub success: bool,
    pub duration_minutes: f64,
}

impl CompletionRecord {
    /// Derive a record from a task and its completing agent.
    pub fn from_task(task: &Task, agent_id: impl Into<String>, success: bool) -> Self {
        Self {
            task_id: task.id.clone(),
            agent_id: agent_id.into(),
            description: task.description.clone(),
            success,
            duration_minutes: task.duration_minutes(),
        }
    }
}

/// One persisted learning event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningEvent {
    pub timestamp: DateTime<Utc>,
    pub task_id: String,
    pub agent_id: String,
    pub success: bool,
    pub duration: f64,
    pub learned: bool,
}

/// Outcome of a bulk learning pass.
#[derive(Debug, Clone, Default)]
pub struct LearnSummary {
    pub total: usize,
    pub learned: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

/// Aggregated learning statistics.
#[derive(Debug, Clone, Serialize)]
pub struct LearningStats {
    pub total_events: usize,
    pub recent_success_rate: f64,
    pub avg_task_duration: f64,
    pub events_by_agent: BTreeMap<String, usize>,
    pub first_event: Option<DateTime<Utc>>,
    pub last_event: Option<DateTime<Utc>>,
}

struct CompletedVector {
    vector: SparseVector,
    success: bool,
}

/// Learns from completions and predicts per-agent success.
///
/// Owns the profile store; the router holds no reference back.
pub struct HistoricalLearner {
    store: ProfileStore,
    log_path: PathBuf,
    log: Vec<LearningEvent>,
    history: BTreeMap<String, Vec<CompletedVector>>,
}

impl HistoricalLearner {
    /// Open a learner over an existing profile store. A missing or
    /// corrupt log starts empty.
    pub fn open(store: ProfileStore, log_path: impl Into<PathBuf>) -> Self {
        let log_path = log_path.into();
        let log: Vec<LearningEvent> = storage::read_json(&log_path).unwrap_or_default();
        Self {
            store,
            log_path,
            log,
            history: BTreeMap::new(),
        }
    }

    pub fn profiles(&self) -> &ProfileStore {
        &self.store
    }

    pub fn log(&self) -> &[LearningEvent] {
        &self.log
    }

    /// Learn one completion. Returns `Ok(false)` when the task id was
    /// already learned (the record is skipped entirely).
    pub fn learn(&mut self, record: &CompletionRecord) -> Result<bool> {
        if self.log.iter().any(|e| e.task_id == record.task_id) {
            debug!(task_id = %record.task_id, "completion already learned, skipping");
            return Ok(false);
        }

        self.log.push(LearningEvent {
            timestamp: Utc::now(),
            task_id: record.task_id.clone(),
            agent_id: record.agent_id.clone(),
            success: record.success,
            duration: record.duration_minutes,
            learned: true,
        });
        if let Err(e) = storage::write_json_atomic(&self.log_path, &self.log) {
            self.log.pop();
            return Err(e);
        }

        if let Err(e) = self.store.record_completion(
            &record.agent_id,
            &record.description,
            record.success,
            record.duration_minutes,
        ) {
            // Undo the log entry so the record stays learnable.
            self.log.pop();
            let _ = storage::write_json_atomic(&self.log_path, &self.log);
            return Err(e);
        }

        let vector = self.store.vectorize(&record.description);
        let agent_history = self.history.entry(record.agent_id.clone()).or_default();
        agent_history.insert(
            0,
            CompletedVector {
                vector,
                success: record.success,
            },
        );
        agent_history.truncate(HISTORY_CAP);

        Ok(true)
    }

    /// Learn a batch of completions, skipping duplicates and collecting
    /// per-record errors.
    pub fn learn_all(&mut self, records: &[CompletionRecord]) -> LearnSummary {
        let mut summary = LearnSummary {
            total: records.len(),
            ..Default::default()
        };
        for record in records {
            match self.learn(record) {
                Ok(true) => summary.learned += 1,
                Ok(false) => summary.skipped += 1,
                Err(e) => summary.errors.push(format!("{}: {e}", record.task_id)),
            }
        }
        summary
    }

    /// Predict the probability that `agent_id` completes a task like
    /// `task_description` successfully.
    ///
    /// Base rate from the profile; when recent similar completions exist
    /// (cosine >= 0.3 among the agent's last learned tasks) the result is
    /// `0.6 * base + 0.4 * similar_success_rate`. Unknown agents predict
    /// the neutral 0.5.
    pub fn predict_success(&self, agent_id: &str, task_description: &str) -> f64 {
        let Some(profile) = self.store.get(agent_id) else {
            return 0.5;
        };
        let base = profile.success_rate;

        let Some(history) = self.history.get(agent_id) else {
            return base;
        };
        let task_vector = self.store.vectorize(task_description);
        let similar: Vec<&CompletedVector> = history
            .iter()
            .filter(|c| task_vector.cosine(&c.vector) >= SIMILARITY_THRESHOLD)
            .take(RECENT_WINDOW)
            .collect();

        if similar.is_empty() {
            return base;
        }
        let similar_rate =
            similar.iter().filter(|c| c.success).count() as f64 / similar.len() as f64;
        0.6 * base + 0.4 * similar_rate
    }

    /// Summarise learning progress.
    pub fn stats(&self) -> LearningStats {
        let recent: Vec<&LearningEvent> =
            self.log.iter().rev().take(STATS_WINDOW).collect();
        let recent_success_rate = if recent.is_empty() {
            0.0
        } else {
            recent.iter().filter(|e| e.success).count() as f64 / recent.len() as f64
        };

        let durations: Vec<f64> = self.log.iter().map(|e| e.duration).collect();
        let avg_task_duration = if durations.is_empty() {
            0.0
        } else {
            durations.iter().sum::<f64>() / durations.len() as f64
        };

        let mut events_by_agent: BTreeMap<String, usize> = BTreeMap::new();
        for event in &self.log {
            *events_by_agent.entry(event.agent_id.clone()).or_insert(0) += 1;
        }

        LearningStats {
            total_events: self.log.len(),
            recent_success_rate,
            avg_task_duration,
            events_by_agent,
            first_event: self.log.first().map(|e| e.timestamp),
            last_event: self.log.last().map(|e| e.timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn learner() -> (tempfile::TempDir, HistoricalLearner) {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::open(dir.path().join("agent_profiles.json")).unwrap();
        let learner = HistoricalLearner::open(store, dir.path().join("learning_log.json"));
        (dir, learner)
    }

    fn record(task_id: &str, agent: &str, description: &str, success: bool) -> CompletionRecord {
        CompletionRecord {
            task_id: task_id.into(),
            agent_id: agent.into(),
            description: description.into(),
            success,
            duration_minutes: 15.0,
        }
    }

    #[test]
    fn duplicate_task_ids_are_learned_once() {
        let (_dir, mut learner) = learner();
        let r = record("t-1", "kimi", "deploy the billing service", true);

        assert!(learner.learn(&r).unwrap());
        let rate_after_first = learner.profiles().get("kimi").unwrap().success_rate;

        assert!(!learner.learn(&r).unwrap());
        let rate_after_second = learner.profiles().get("kimi").unwrap().success_rate;
        assert_eq!(rate_after_first, rate_after_second);
        assert_eq!(learner.profiles().get("kimi").unwrap().task_count, 1);
        assert_eq!(learner.log().len(), 1);
    }

    #[test]
    fn failed_profile_update_keeps_the_record_learnable() {
        let (_dir, mut learner) = learner();
        let bad = record("t-2", "nobody", "mystery work", true);

        assert!(learner.learn(&bad).is_err());
        assert!(learner.log().is_empty(), "failed learn must not log");

        // The same task id learns fine once the agent is valid.
        let good = record("t-2", "kimi", "mystery work", true);
        assert!(learner.learn(&good).unwrap());
    }

    #[test]
    fn batch_learning_summarises() {
        let (_dir, mut learner) = learner();
        let records = vec![
            record("t-1", "kimi", "deploy the api", true),
            record("t-1", "kimi", "deploy the api", true),
            record("t-3", "claude", "research caching options", false),
        ];
        let summary = learner.learn_all(&records);
        assert_eq!(summary.learned, 2);
        assert_eq!(summary.skipped, 1);
        assert!(summary.errors.is_empty());
    }

    #[test]
    fn predict_success_blends_similar_history() {
        let (_dir, mut learner) = learner();
        let base = learner.profiles().get("codex").unwrap().success_rate;
        assert_eq!(learner.predict_success("codex", "build the oauth module"), base);

        // Two failed oauth builds shift the prediction below base.
        learner
            .learn(&record("t-10", "codex", "build the oauth module for login", false))
            .unwrap();
        learner
            .learn(&record("t-11", "codex", "build the oauth module for signup", false))
            .unwrap();

        let predicted = learner.predict_success("codex", "build the oauth module");
        let current_base = learner.profiles().get("codex").unwrap().success_rate;
        assert!((predicted - 0.6 * current_base).abs() < 1e-10);
        assert!(predicted < current_base);
    }

    #[test]
    fn predict_success_unknown_agent_is_neutral() {
        let (_dir, learner) = learner();
        assert_eq!(learner.predict_success("gpt", "anything"), 0.5);
    }

    #[test]
    fn dissimilar_history_falls_back_to_base_rate() {
        let (_dir, mut learner) = learner();
        learner
            .learn(&record("t-20", "ollama", "draft the quarterly newsletter", false))
            .unwrap();

        let base = learner.profiles().get("ollama").unwrap().success_rate;
        assert_eq!(
            learner.predict_success("ollama", "prototype a websocket bridge"),
            base
        );
    }

    #[test]
    fn stats_count_by_agent() {
        let (_dir, mut learner) = learner();
        learner.learn(&record("t-1", "kimi", "deploy it", true)).unwrap();
        learner.learn(&record("t-2", "kimi", "fix the parser", true)).unwrap();
        learner.learn(&record("t-3", "claude", "research it", false)).unwrap();

        let stats = learner.stats();
        assert_eq!(stats.total_events, 3);
        assert_eq!(stats.events_by_agent["kimi"], 2);
        assert!((stats.recent_success_rate - 2.0 / 3.0).abs() < 1e-10);
        assert_eq!(stats.avg_task_duration, 15.0);
        assert!(stats.first_event.is_some());
    }

    #[test]
    fn log_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let profiles_path = dir.path().join("agent_profiles.json");
        let log_path = dir.path().join("learning_log.json");

        let store = ProfileStore::open(&profiles_path).unwrap();
        let mut learner = HistoricalLearner::open(store, &log_path);
        learner.learn(&record("t-1", "kimi", "deploy it", true)).unwrap();

        let store = ProfileStore::open(&profiles_path).unwrap();
        let reopened = HistoricalLearner::open(store, &log_path);
        assert_eq!(reopened.log().len(), 1);
        // A reopened learner still refuses duplicates.
        let mut reopened = reopened;
        assert!(!reopened.learn(&record("t-1", "kimi", "deploy it", true)).unwrap());
    }
}
