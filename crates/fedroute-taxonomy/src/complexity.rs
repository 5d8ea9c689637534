//! Coarse task-complexity estimation and bias matching.

use crate::taxonomy::TAXONOMY;
use fedroute_core::types::Complexity;
use std::collections::BTreeMap;

const HIGH_INDICATORS: &[&str] = &[
    "across", "multiple", "all files", "refactor", "migrate",
    "architecture", "system", "infrastructure", "deploy",
    "research", "analyze", "deep dive", "comprehensive",
];

const LOW_INDICATORS: &[&str] = &[
    "quick", "simple", "single", "small", "rename", "typo",
    "format", "lint", "draft", "sketch", "snippet",
];

/// Classify a task as low, medium or high complexity.
///
/// High: two or more high indicators, or more than 20 words.
/// Low: two or more low indicators, or fewer than 8 words.
pub fn classify(task: &str) -> Complexity {
    let task_lower = task.to_lowercase();
    let high_hits = HIGH_INDICATORS
        .iter()
        .filter(|i| task_lower.contains(*i))
        .count();
    let low_hits = LOW_INDICATORS
        .iter()
        .filter(|i| task_lower.contains(*i))
        .count();
    let word_count = task.split_whitespace().count();

    if high_hits >= 2 || word_count > 20 {
        Complexity::High
    } else if low_hits >= 2 || word_count < 8 {
        Complexity::Low
    } else {
        Complexity::Medium
    }
}

/// Score how well a task's complexity matches an agent's bias:
/// +0.2 on an exact match, -0.1 on a high/low mismatch, 0 otherwise.
pub fn match_score(task_complexity: Complexity, agent_bias: Complexity) -> f64 {
    use Complexity::*;
    match (task_complexity, agent_bias) {
        (a, b) if a == b => 0.2,
        (High, Low) | (Low, High) => -0.1,
        _ => 0.0,
    }
}

/// Complexity-match scores for every agent in the taxonomy.
pub fn complexity_scores(task: &str) -> BTreeMap<String, f64> {
    let task_complexity = classify(task);
    TAXONOMY
        .iter()
        .map(|e| {
            (
                e.agent.to_string(),
                match_score(task_complexity, e.complexity_bias),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_tasks_are_low() {
        assert_eq!(classify("fix typo"), Complexity::Low);
    }

    #[test]
    fn indicator_pairs_outrank_word_count() {
        // 9 words, but two high indicators
        assert_eq!(
            classify("refactor the payment flow across every internal service boundary"),
            Complexity::High
        );
    }

    #[test]
    fn long_tasks_are_high() {
        let task = "please take the existing billing reconciliation job and split it \
                    so that invoices statements and refunds each get handled separately";
        assert!(task.split_whitespace().count() > 20);
        assert_eq!(classify(task), Complexity::High);
    }

    #[test]
    fn middling_tasks_are_medium() {
        assert_eq!(
            classify("update the invoice totals shown on customer statements"),
            Complexity::Medium
        );
    }

    #[test]
    fn match_score_extremes() {
        assert_eq!(match_score(Complexity::High, Complexity::High), 0.2);
        assert_eq!(match_score(Complexity::High, Complexity::Low), -0.1);
        assert_eq!(match_score(Complexity::Low, Complexity::High), -0.1);
        assert_eq!(match_score(Complexity::Medium, Complexity::Low), 0.0);
    }

    #[test]
    fn scores_cover_all_agents() {
        let scores = complexity_scores("quick small rename");
        assert_eq!(scores.len(), TAXONOMY.len());
        // low-complexity task favours the low-bias agents
        assert_eq!(scores["copilot"], 0.2);
        assert_eq!(scores["ollama"], 0.2);
        assert_eq!(scores["kimi"], -0.1);
    }
}
