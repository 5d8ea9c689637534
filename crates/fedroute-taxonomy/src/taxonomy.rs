//! Per-agent keyword taxonomy and the keyword signal scorer.
//!
//! Keywords and phrases match as case-insensitive substrings of the task
//! text. Phrases count double (stronger evidence than a lone keyword) and
//! negative keywords subtract half a hit each; both factors are
//! configurable through [`TaxonomyConfig`].

use fedroute_core::types::Complexity;
use std::collections::BTreeMap;

/// Taxonomy entry for one agent. Immutable at runtime.
#[derive(Debug, Clone, Copy)]
pub struct TaxonomyEntry {
    pub agent: &'static str,
    pub keywords: &'static [&'static str],
    pub phrase_patterns: &'static [&'static str],
    pub negative_keywords: &'static [&'static str],
    pub weight: f64,
    pub complexity_bias: Complexity,
}

/// Tunable scoring factors. The defaults are the empirically chosen
/// reference values; no derivation exists for them.
#[derive(Debug, Clone, Copy)]
pub struct TaxonomyConfig {
    /// Multiplier applied to each phrase-pattern hit.
    pub phrase_bonus: f64,
    /// Penalty subtracted per negative-keyword hit.
    pub negative_penalty: f64,
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            phrase_bonus: 2.0,
            negative_penalty: 0.5,
        }
    }
}

/// The reference taxonomy, in canonical agent order.
pub const TAXONOMY: &[TaxonomyEntry] = &[
    TaxonomyEntry {
        agent: "kimi",
        keywords: &[
            "implement", "build", "deploy", "fix", "refactor", "test",
            "create", "install", "migrate", "debug", "execute", "run",
            "scaffold", "configure", "setup", "ci", "cd", "pipeline",
            "docker", "kubernetes", "infrastructure", "devops", "shell",
            "script", "automate", "endpoint", "api", "crud", "database",
            "parallel", "multiple files", "batch",
        ],
        phrase_patterns: &[
            "across multiple", "across all", "across three", "then implement",
            "then build", "integrate", "set up", "batch process", "then deploy",
        ],
        negative_keywords: &[
            "from scratch", "single module", "focused", "draft", "sketch",
            "brainstorm", "research", "analyze", "document", "compare",
            "evaluate trade", "deep dive", "summarize", "quick fix",
            "inline", "hint", "rename", "small change", "snippet",
        ],
        weight: 1.0,
        complexity_bias: Complexity::High,
    },
    TaxonomyEntry {
        agent: "claude",
        keywords: &[
            "research", "analyze", "document", "architecture", "design",
            "compare", "evaluate", "review", "deep dive", "explain",
            "summarize", "assess", "strategy", "plan", "rfc", "adr",
            "trade-off", "pros cons", "long-term", "security audit",
            "threat model", "literature", "specification", "whitepaper",
            "decision record", "technical debt",
        ],
        phrase_patterns: &[
            "evaluate trade", "pros and cons", "deep dive into", "compare vs",
            "assess the", "create a plan", "strategy for", "research into",
            "analyze the", "document the", "architecture decision",
            "comprehensive architecture", "assess technical", "debt and create",
        ],
        negative_keywords: &[
            "implement", "build", "deploy", "fix", "create", "migrate",
            "quick", "snippet", "inline", "draft", "sketch", "mock",
        ],
        weight: 1.0,
        complexity_bias: Complexity::High,
    },
    TaxonomyEntry {
        agent: "copilot",
        keywords: &[
            "review", "quick", "snippet", "complete", "suggest",
            "inline", "hint", "type", "rename", "extract", "refactor",
            "single file", "function", "class", "method", "variable",
            "format", "lint", "clean", "tidy", "small change",
        ],
        phrase_patterns: &[
            "quick fix", "small change", "rename the", "inline hint",
            "extract this", "complete this", "type definition", "format this",
            "clean up", "suggest improvement",
        ],
        negative_keywords: &[
            "across", "multiple", "all files", "entire", "architecture",
            "research", "analyze", "document", "deploy", "infrastructure",
            "design pattern", "strategy",
        ],
        weight: 1.0,
        complexity_bias: Complexity::Low,
    },
    TaxonomyEntry {
        agent: "codex",
        keywords: &[
            "build", "implement", "feature", "module", "service", "endpoint",
            "autonomous", "end to end", "from scratch", "single module", "focused",
            "api", "crud", "websocket", "oauth", "payment", "migration",
            "middleware", "caching", "redis", "upload", "validation",
        ],
        phrase_patterns: &[
            "from scratch", "end to end", "single module", "focused module",
            "build the", "implement the", "create the", "module for",
            "service for", "autonomous implementation",
        ],
        negative_keywords: &[
            "across", "multiple", "then implement", "then build", "integrate",
            "research", "analyze", "quick fix", "inline", "draft", "sketch",
        ],
        weight: 1.0,
        complexity_bias: Complexity::Medium,
    },
    TaxonomyEntry {
        agent: "ollama",
        keywords: &[
            "draft", "sketch", "prototype", "brainstorm", "iterate",
            "offline", "local", "fast", "quick draft", "rough",
            "experiment", "try", "mock", "stub", "placeholder",
            "template", "boilerplate", "generate ideas",
        ],
        phrase_patterns: &[
            "draft the", "sketch out", "brainstorm", "prototype of",
            "rough draft", "quick draft", "template for", "boilerplate",
            "mock the", "stub for", "placeholder for",
            "stub out", "generate ideas", "experiment with",
        ],
        negative_keywords: &[
            "implement", "build", "deploy", "fix", "migrate", "debug",
            "architecture", "research", "analyze", "end to end", "from scratch",
        ],
        weight: 1.0,
        complexity_bias: Complexity::Low,
    },
];

/// Look up a taxonomy entry by agent id.
pub fn entry(agent: &str) -> Option<&'static TaxonomyEntry> {
    TAXONOMY.iter().find(|e| e.agent == agent)
}

/// Raw (un-normalised) keyword score for one agent.
///
/// `raw = ((hits + bonus·phrase_hits) / max(|keywords|, 1)) · weight
///        − penalty·negative_hits`, floored at 0.
pub fn raw_keyword_score(task_lower: &str, entry: &TaxonomyEntry, config: &TaxonomyConfig) -> f64 {
    let hits = entry
        .keywords
        .iter()
        .filter(|kw| task_lower.contains(*kw))
        .count() as f64;
    let phrase_hits = entry
        .phrase_patterns
        .iter()
        .filter(|p| task_lower.contains(*p))
        .count() as f64;
    let negative_hits = entry
        .negative_keywords
        .iter()
        .filter(|n| task_lower.contains(*n))
        .count() as f64;

    let max_possible = (entry.keywords.len() as f64).max(1.0);
    let score = ((hits + config.phrase_bonus * phrase_hits) / max_possible) * entry.weight
        - config.negative_penalty * negative_hits;
    score.max(0.0)
}

/// Normalised keyword distribution over all agents.
///
/// Raw scores divided by their sum. When every raw score is 0 the
/// distribution is uniformly 0 and the signal contributes nothing.
pub fn keyword_scores(task: &str, config: &TaxonomyConfig) -> BTreeMap<String, f64> {
    let task_lower = task.to_lowercase();
    let raw: Vec<(&str, f64)> = TAXONOMY
        .iter()
        .map(|e| (e.agent, raw_keyword_score(&task_lower, e, config)))
        .collect();

    let total: f64 = raw.iter().map(|(_, s)| s).sum();
    let divisor = if total > 0.0 { total } else { 1.0 };

    raw.into_iter()
        .map(|(agent, score)| (agent.to_string(), score / divisor))
        .collect()
}
