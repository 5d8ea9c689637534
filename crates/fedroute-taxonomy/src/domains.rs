//! Domain-hint extraction from task text.
//!
//! Feeds the profile matcher's domain-overlap score. A task with no hint
//! falls into the neutral `general` domain.

const DOMAIN_KEYWORDS: &[(&str, &[&str])] = &[
    ("research", &["research", "analyze", "investigate", "study", "explore"]),
    ("implementation", &["implement", "code", "build", "develop", "create", "write"]),
    ("testing", &["test", "validate", "verify", "check", "assert"]),
    ("documentation", &["document", "readme", "guide", "tutorial", "explain"]),
    ("design", &["design", "architecture", "structure", "pattern"]),
    ("deployment", &["deploy", "release", "publish", "ship", "host"]),
    ("security", &["secure", "auth", "encrypt", "vulnerability", "protect"]),
    ("performance", &["optimize", "speed", "fast", "slow", "latency", "memory"]),
];

/// Extract domain categories mentioned in the text, in table order.
pub fn extract_domains(text: &str) -> Vec<String> {
    let text_lower = text.to_lowercase();
    let domains: Vec<String> = DOMAIN_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|kw| text_lower.contains(kw)))
        .map(|(domain, _)| domain.to_string())
        .collect();

    if domains.is_empty() {
        vec!["general".to_string()]
    } else {
        domains
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiple_domains_detected() {
        let domains = extract_domains("Implement and test the auth service");
        assert_eq!(domains, vec!["implementation", "testing", "security"]);
    }

    #[test]
    fn no_hint_is_general() {
        assert_eq!(extract_domains("xyzzy"), vec!["general"]);
    }
}
