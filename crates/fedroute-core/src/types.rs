//! Shared record types for the routing pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A unit of work entering the router.
///
/// Only `description` and optionally `task_type` are consumed when routing;
/// the timestamps feed the historical learner's duration accounting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a task with a fresh opaque id.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            description: description.into(),
            task_type: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    pub fn with_type(mut self, task_type: impl Into<String>) -> Self {
        self.task_type = Some(task_type.into());
        self
    }

    /// Wall-clock duration in minutes, measured from `started_at` (or
    /// `created_at`) to `completed_at`. Incomplete tasks report the
    /// 30-minute default; completed ones report at least 1 minute.
    pub fn duration_minutes(&self) -> f64 {
        const DEFAULT_MINUTES: f64 = 30.0;
        let Some(end) = self.completed_at else {
            return DEFAULT_MINUTES;
        };
        let start = self.started_at.unwrap_or(self.created_at);
        let minutes = (end - start).num_seconds() as f64 / 60.0;
        minutes.max(1.0)
    }
}

/// Routing tier — a preset selection of signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "tier1")]
    Tier1,
    #[serde(rename = "tier2")]
    Tier2,
    #[serde(rename = "tier3")]
    Tier3,
    #[serde(rename = "hybrid")]
    Hybrid,
    #[serde(rename = "fallback-error")]
    FallbackError,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Tier1 => "tier1",
            Tier::Tier2 => "tier2",
            Tier::Tier3 => "tier3",
            Tier::Hybrid => "hybrid",
            Tier::FallbackError => "fallback-error",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Blend weights over the four signals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendWeights {
    pub embedding: f64,
    pub keyword: f64,
    pub tfidf: f64,
    pub complexity: f64,
}

impl BlendWeights {
    pub fn new(embedding: f64, keyword: f64, tfidf: f64, complexity: f64) -> Self {
        Self {
            embedding,
            keyword,
            tfidf,
            complexity,
        }
    }

    /// Default weights for a tier.
    pub fn for_tier(tier: Tier) -> Self {
        match tier {
            Tier::Tier1 => Self::new(1.0, 0.0, 0.0, 0.0),
            Tier::Tier2 => Self::new(0.0, 0.5, 0.3, 0.2),
            Tier::Tier3 => Self::new(0.0, 1.0, 0.0, 0.0),
            Tier::Hybrid => Self::new(0.35, 0.45, 0.20, 0.0),
            Tier::FallbackError => Self::new(0.0, 0.0, 0.0, 0.0),
        }
    }

    pub fn sum(&self) -> f64 {
        self.embedding + self.keyword + self.tfidf + self.complexity
    }
}

/// Coarse task complexity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Complexity::Low => "low",
            Complexity::Medium => "medium",
            Complexity::High => "high",
        };
        f.write_str(s)
    }
}

/// One agent's final blended score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentScore {
    pub agent: String,
    pub score: f64,
}

/// Per-signal score breakdown, populated by `explain`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalBreakdown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tfidf: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<BTreeMap<String, f64>>,
}

/// The router's decision for one task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub recommended_agent: String,
    /// Blended ensemble score of the winner, in [0, 1].
    pub confidence: f64,
    /// Diagnostic string: tier, ensemble marker, and any degradation
    /// suffix (`-threshold-adjusted`, `-fallback`, `fallback-error`).
    pub method: String,
    pub tier: Tier,
    /// The blend actually used after any redistribution.
    pub weights: BlendWeights,
    /// Per-agent final scores, descending.
    pub scores: Vec<AgentScore>,
    /// Ranked candidates other than the winner, descending.
    pub alternatives: Vec<AgentScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signals: Option<SignalBreakdown>,
}

/// Round to four decimal places, the precision reported in results.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn tier_round_trip() {
        for tier in [
            Tier::Tier1,
            Tier::Tier2,
            Tier::Tier3,
            Tier::Hybrid,
            Tier::FallbackError,
        ] {
            let json = serde_json::to_string(&tier).unwrap();
            let back: Tier = serde_json::from_str(&json).unwrap();
            assert_eq!(tier, back);
        }
        assert_eq!(serde_json::to_string(&Tier::FallbackError).unwrap(), "\"fallback-error\"");
    }

    #[test]
    fn hybrid_weights_sum_to_one() {
        let w = BlendWeights::for_tier(Tier::Hybrid);
        assert!((w.sum() - 1.0).abs() < 1e-10);
        assert_eq!(w.complexity, 0.0);
    }

    #[test]
    fn duration_defaults_without_completion() {
        let task = Task::new("deploy the service").with_type("deployment");
        assert_eq!(task.duration_minutes(), 30.0);
        assert_eq!(task.task_type.as_deref(), Some("deployment"));
        assert!(!task.id.is_empty());
    }

    #[test]
    fn duration_uses_started_at_and_floors_at_one_minute() {
        let created = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let started = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        let completed = Utc.with_ymd_and_hms(2025, 6, 1, 10, 45, 0).unwrap();

        let mut task = Task::new("fix the login bug");
        task.created_at = created;
        task.started_at = Some(started);
        task.completed_at = Some(completed);
        assert!((task.duration_minutes() - 45.0).abs() < 1e-10);

        task.started_at = Some(completed);
        assert_eq!(task.duration_minutes(), 1.0);
    }

    #[test]
    fn round4_truncates_noise() {
        assert_eq!(round4(0.123_456), 0.1235);
        assert_eq!(round4(1.0), 1.0);
    }
}
