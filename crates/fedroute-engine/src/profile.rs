//! Mutable per-agent capability profiles.
//!
//! Profiles are seeded from the static registry on first use and mutated
//! only by the historical learner. Every mutation persists before it is
//! committed in memory, so a failed write leaves both disk and memory in
//! the pre-mutation state. Writers must be serialised per process; readers
//! tolerate a slightly stale snapshot.

use fedroute_core::error::{Result, RouteError};
use fedroute_core::sparse::SparseVector;
use fedroute_core::storage;
use fedroute_index::Vectorizer;
use fedroute_taxonomy::registry::{AgentDefinition, AGENTS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Smoothing factor for the success-rate moving average.
const SUCCESS_EMA_ALPHA: f64 = 0.1;

/// An agent's learned capability profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    pub agent_id: String,
    pub emoji: String,
    pub specialty: String,
    pub capability_vector: SparseVector,
    pub success_rate: f64,
    pub avg_task_duration: f64,
    pub task_count: u64,
    pub domains: Vec<String>,
    pub keywords: Vec<String>,
}

impl AgentProfile {
    /// Seed a profile from a registry definition: keywords at 1.0,
    /// domains at 0.8, specialty terms at 0.9.
    pub fn seed(definition: &AgentDefinition) -> Self {
        let mut capability = SparseVector::new();
        for kw in definition.keywords {
            capability.insert(*kw, 1.0);
        }
        for domain in definition.domains {
            capability.insert(*domain, 0.8);
        }
        for term in definition.specialty.to_lowercase().split_whitespace() {
            if term != "&" {
                capability.insert(term, 0.9);
            }
        }

        Self {
            agent_id: definition.id.to_string(),
            emoji: definition.emoji.to_string(),
            specialty: definition.specialty.to_string(),
            capability_vector: capability,
            success_rate: definition.base_success_rate,
            avg_task_duration: 30.0,
            task_count: 0,
            domains: definition.domains.iter().map(|d| d.to_string()).collect(),
            keywords: definition.keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Fold one completed task into the profile.
    fn apply_completion(&mut self, task_vector: &SparseVector, success: bool, duration_minutes: f64) {
        self.task_count += 1;

        let observed = if success { 1.0 } else { 0.0 };
        self.success_rate =
            (1.0 - SUCCESS_EMA_ALPHA) * self.success_rate + SUCCESS_EMA_ALPHA * observed;

        if self.task_count == 1 {
            self.avg_task_duration = duration_minutes;
        } else {
            let n = self.task_count as f64;
            self.avg_task_duration = (self.avg_task_duration * (n - 1.0) + duration_minutes) / n;
        }

        for (term, weight) in task_vector.iter() {
            self.capability_vector.update_or_insert(
                term,
                |current| (current + 0.01 * weight).min(1.0),
                0.1 * weight,
            );
        }
    }
}

/// The persisted collection of agent profiles.
pub struct ProfileStore {
    path: PathBuf,
    profiles: BTreeMap<String, AgentProfile>,
    vectorizer: Vectorizer,
}

impl ProfileStore {
    /// Open a store at `path`, loading existing profiles or seeding (and
    /// persisting) fresh ones from the registry. A corrupt file is
    /// treated as missing and reseeded.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let loaded: Option<BTreeMap<String, AgentProfile>> = storage::read_json(&path);

        let mut store = Self {
            path,
            profiles: loaded.unwrap_or_default(),
            vectorizer: Vectorizer::unseeded(true, true),
        };

        if store.profiles.is_empty() {
            for definition in AGENTS {
                store
                    .profiles
                    .insert(definition.id.to_string(), AgentProfile::seed(definition));
            }
            store.persist()?;
            debug!(path = %store.path.display(), "seeded agent profiles from registry");
        }
        Ok(store)
    }

    /// Use a vectoriser bound to a corpus IDF table instead of the bare
    /// term-frequency default.
    pub fn with_vectorizer(mut self, vectorizer: Vectorizer) -> Self {
        self.vectorizer = vectorizer;
        self
    }

    pub fn get(&self, agent_id: &str) -> Option<&AgentProfile> {
        self.profiles.get(agent_id)
    }

    pub fn all(&self) -> impl Iterator<Item = &AgentProfile> {
        self.profiles.values()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Vectorise task text with this store's vectoriser.
    pub fn vectorize(&self, text: &str) -> SparseVector {
        self.vectorizer.vectorize(text)
    }

    /// Fold a completed task into an agent's profile and persist.
    ///
    /// The updated map is written to disk before the in-memory profile is
    /// replaced; a failed write rolls back to the pre-mutation state.
    pub fn record_completion(
        &mut self,
        agent_id: &str,
        task_description: &str,
        success: bool,
        duration_minutes: f64,
    ) -> Result<()> {
        let Some(profile) = self.profiles.get(agent_id) else {
            return Err(RouteError::UnknownAgent(agent_id.to_string()));
        };

        let task_vector = self.vectorizer.vectorize(task_description);
        let mut updated = profile.clone();
        updated.apply_completion(&task_vector, success, duration_minutes);

        let mut next = self.profiles.clone();
        next.insert(agent_id.to_string(), updated);
        storage::write_json_atomic(&self.path, &next)?;

        self.profiles = next;
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        storage::write_json_atomic(&self.path, &self.profiles)
    }
}
