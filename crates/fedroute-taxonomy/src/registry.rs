//! The static agent registry.
//!
//! The slice order here is the canonical federation order and doubles as
//! the tie-break order everywhere scores compare equal: kimi, claude,
//! copilot, codex, ollama. Profiles are seeded from these definitions on
//! first use.

/// Seed definition for one federation agent.
#[derive(Debug, Clone, Copy)]
pub struct AgentDefinition {
    pub id: &'static str,
    pub emoji: &'static str,
    pub specialty: &'static str,
    pub keywords: &'static [&'static str],
    pub domains: &'static [&'static str],
    pub base_success_rate: f64,
}

/// All known agents, in canonical order.
pub const AGENTS: &[AgentDefinition] = &[
    AgentDefinition {
        id: "kimi",
        emoji: "🔧",
        specialty: "Execution",
        keywords: &[
            "implement", "code", "build", "develop", "create", "write",
            "fix", "debug", "test", "deploy", "script", "configure",
            "setup", "install", "run", "execute", "automate",
        ],
        domains: &["implementation", "testing", "deployment"],
        base_success_rate: 0.94,
    },
    AgentDefinition {
        id: "claude",
        emoji: "🔮",
        specialty: "Research & Analysis",
        keywords: &[
            "research", "analyze", "architecture", "design", "document",
            "investigate", "explore", "study", "review", "assess",
            "evaluate", "recommend", "strategy", "planning", "structure",
        ],
        domains: &["research", "design", "documentation", "architecture"],
        base_success_rate: 0.92,
    },
    AgentDefinition {
        id: "copilot",
        emoji: "💭",
        specialty: "Thinking & Planning",
        keywords: &[
            "plan", "think", "structure", "organize", "review", "check",
            "validate", "verify", "improve", "refactor", "suggest",
            "advise", "coordinate", "facilitate",
        ],
        domains: &["planning", "review"],
        base_success_rate: 0.88,
    },
    AgentDefinition {
        id: "codex",
        emoji: "🤖",
        specialty: "Autonomous Implementation",
        keywords: &[
            "build", "implement", "feature", "module", "service",
            "endpoint", "autonomous", "api", "crud", "oauth",
            "migration", "middleware", "validation",
        ],
        domains: &["implementation", "feature"],
        base_success_rate: 0.90,
    },
    AgentDefinition {
        id: "ollama",
        emoji: "🏠",
        specialty: "Local Drafting",
        keywords: &[
            "draft", "prototype", "experiment", "try", "sketch",
            "outline", "mockup", "template", "sample", "example",
        ],
        domains: &["drafting", "prototyping"],
        base_success_rate: 0.75,
    },
];

/// Look up an agent definition by id.
pub fn definition(id: &str) -> Option<&'static AgentDefinition> {
    AGENTS.iter().find(|a| a.id == id)
}

/// Agent ids in canonical order.
pub fn agent_ids() -> impl Iterator<Item = &'static str> {
    AGENTS.iter().map(|a| a.id)
}

/// True if `id` names a registered agent.
pub fn is_known_agent(id: &str) -> bool {
    definition(id).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_is_stable() {
        let ids: Vec<&str> = agent_ids().collect();
        assert_eq!(ids, vec!["kimi", "claude", "copilot", "codex", "ollama"]);
    }

    #[test]
    fn lookup_by_id() {
        assert_eq!(definition("claude").unwrap().specialty, "Research & Analysis");
        assert!(definition("gpt").is_none());
        assert!(is_known_agent("ollama"));
    }

    #[test]
    fn seed_rates_are_probabilities() {
        for agent in AGENTS {
            assert!((0.0..=1.0).contains(&agent.base_success_rate), "{}", agent.id);
        }
    }
}
