//! Profile-based matching — capability cosine, domain overlap, keyword
//! overlap and historical bias blended into a per-agent confidence.
//!
//! This matcher reads the learned profiles rather than the static
//! taxonomy, so its ranking drifts with the federation's actual history.

use crate::profile::{AgentProfile, ProfileStore};
use fedroute_core::sparse::SparseVector;
use fedroute_taxonomy::extract_domains;
use std::collections::HashSet;

/// One agent's profile-match breakdown.
#[derive(Debug, Clone)]
pub struct ProfileMatch {
    pub agent_id: String,
    pub emoji: String,
    pub similarity: f64,
    pub domain_match: f64,
    pub keyword_match: f64,
    pub historical_bias: f64,
    pub confidence: f64,
    pub explanation: String,
}

/// Rank agents against a task by learned profile fit.
pub fn best_profile_matches(
    store: &ProfileStore,
    task_description: &str,
    task_type: Option<&str>,
    top_k: usize,
) -> Vec<ProfileMatch> {
    let text = match task_type {
        Some(t) => format!("{t} {task_description}"),
        None => task_description.to_string(),
    };
    let task_vector = store.vectorize(&text);
    let task_domains = extract_domains(&text);
    let has_domain_hints = task_domains != ["general"];

    let mut matches: Vec<ProfileMatch> = store
        .all()
        .map(|profile| {
            let similarity = task_vector.cosine(&profile.capability_vector);

            let domain_match = if has_domain_hints {
                let task_set: HashSet<&str> = task_domains.iter().map(String::as_str).collect();
                let profile_set: HashSet<&str> =
                    profile.domains.iter().map(String::as_str).collect();
                let overlap = task_set.intersection(&profile_set).count() as f64;
                overlap / task_set.len().max(profile_set.len()) as f64
            } else {
                0.5
            };

            let keyword_match = keyword_overlap(&task_vector, profile);
            let historical_bias = profile.success_rate;

            let confidence = similarity * 0.4
                + domain_match * 0.3
                + keyword_match * 0.2
                + historical_bias * 0.1;

            let explanation = explain_match(
                profile,
                similarity,
                domain_match,
                &task_domains,
            );

            ProfileMatch {
                agent_id: profile.agent_id.clone(),
                emoji: profile.emoji.clone(),
                similarity,
                domain_match,
                keyword_match,
                historical_bias,
                confidence,
                explanation,
            }
        })
        .collect();

    matches.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    matches.truncate(top_k);
    matches
}

fn keyword_overlap(task_vector: &SparseVector, profile: &AgentProfile) -> f64 {
    if task_vector.is_empty() {
        return 0.0;
    }
    let matching = task_vector
        .terms()
        .filter(|t| profile.capability_vector.contains(t))
        .count();
    matching as f64 / task_vector.len() as f64
}

fn explain_match(
    profile: &AgentProfile,
    similarity: f64,
    domain_match: f64,
    task_domains: &[String],
) -> String {
    let mut parts = vec![format!(
        "Agent: {} {} ({})",
        profile.emoji, profile.agent_id, profile.specialty
    )];

    let band = if similarity > 0.7 {
        "Strong"
    } else if similarity > 0.4 {
        "Moderate"
    } else {
        "Low"
    };
    parts.push(format!("{band} semantic similarity ({:.0}%)", similarity * 100.0));

    if domain_match > 0.5 {
        let matching: Vec<&str> = task_domains
            .iter()
            .map(String::as_str)
            .filter(|d| profile.domains.iter().any(|pd| pd == d))
            .collect();
        if !matching.is_empty() {
            parts.push(format!("Domain match: {}", matching.join(", ")));
        }
    }

    parts.push(format!(
        "Historical success rate: {:.0}%",
        profile.success_rate * 100.0
    ));
    parts.push(format!("Tasks completed: {}", profile.task_count));
    parts.join("; ")
}
