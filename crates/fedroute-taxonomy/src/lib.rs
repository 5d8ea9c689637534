//! # fedroute-taxonomy
//!
//! The static knowledge the router carries about its federation:
//!
//! - The agent registry (canonical order, seed capabilities)
//! - Per-agent keyword taxonomies with phrase patterns and negative
//!   keywords, plus the keyword signal scorer
//! - Complexity classification and bias matching
//! - Domain-hint extraction
//!
//! Everything here is immutable after load; mutable per-agent state lives
//! in the engine's profile store.

pub mod complexity;
pub mod domains;
pub mod registry;
pub mod taxonomy;

pub use complexity::{classify, complexity_scores, match_score};
pub use domains::extract_domains;
pub use registry::{agent_ids, definition, is_known_agent, AgentDefinition, AGENTS};
pub use taxonomy::{
    entry, keyword_scores, raw_keyword_score, TaxonomyConfig, TaxonomyEntry, TAXONOMY,
};
