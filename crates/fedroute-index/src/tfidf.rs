//! TF-IDF vectorisation and the nearest-neighbour index.
//!
//! Term frequency is max-normalised per document. IDF is smoothed:
//! `idf(t) = ln((N + 1) / (df(t) + 1)) + 1`, which keeps every stored IDF
//! positive; terms unseen at build time default to 1.0 at query time so a
//! novel word still contributes its bare TF.

use crate::corpus::TrainingCorpus;
use fedroute_core::error::Result;
use fedroute_core::sparse::SparseVector;
use fedroute_core::storage;
use fedroute_core::text::{expand_terms, tokenize};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

fn default_true() -> bool {
    true
}

/// Converts text into a TF-IDF sparse vector against a fixed IDF table.
#[derive(Debug, Clone)]
pub struct Vectorizer {
    idf: BTreeMap<String, f64>,
    use_bigrams: bool,
    use_trigrams: bool,
}

impl Vectorizer {
    pub fn new(idf: BTreeMap<String, f64>, use_bigrams: bool, use_trigrams: bool) -> Self {
        Self {
            idf,
            use_bigrams,
            use_trigrams,
        }
    }

    /// A vectoriser with no IDF table: every term weighs its bare TF.
    /// Used where no corpus exists yet (e.g. seeding capability vectors).
    pub fn unseeded(use_bigrams: bool, use_trigrams: bool) -> Self {
        Self::new(BTreeMap::new(), use_bigrams, use_trigrams)
    }

    pub fn vectorize(&self, text: &str) -> SparseVector {
        let tokens = tokenize(text);
        let terms = expand_terms(&tokens, self.use_bigrams, self.use_trigrams);
        let tf = SparseVector::from_term_counts(terms);

        tf.iter()
            .map(|(term, tf_val)| {
                let idf = self.idf.get(term).copied().unwrap_or(1.0);
                (term.clone(), tf_val * idf)
            })
            .collect()
    }
}

/// A document in the index: source text, ground-truth agent, vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub task: String,
    pub agent: String,
    pub tfidf: SparseVector,
}

/// A query hit.
#[derive(Debug, Clone)]
pub struct QueryMatch {
    pub task: String,
    pub agent: String,
    pub similarity: f64,
}

/// The persisted TF-IDF corpus index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfIndex {
    idf: BTreeMap<String, f64>,
    documents: Vec<IndexedDocument>,
    doc_count: usize,
    #[serde(default = "default_true")]
    use_bigrams: bool,
    #[serde(default = "default_true")]
    use_trigrams: bool,
}

impl TfidfIndex {
    /// Build an index from a training corpus. Full rebuild, no
    /// incremental updates.
    pub fn build(corpus: &TrainingCorpus, use_bigrams: bool, use_trigrams: bool) -> Self {
        let term_lists: Vec<Vec<String>> = corpus
            .iter()
            .map(|s| {
                let tokens = tokenize(&s.task);
                expand_terms(&tokens, use_bigrams, use_trigrams)
            })
            .collect();

        // Document frequency over unique terms per document.
        let mut df: BTreeMap<&str, usize> = BTreeMap::new();
        for terms in &term_lists {
            let unique: HashSet<&str> = terms.iter().map(String::as_str).collect();
            for term in unique {
                *df.entry(term).or_insert(0) += 1;
            }
        }

        let n_docs = corpus.len();
        let idf: BTreeMap<String, f64> = df
            .into_iter()
            .map(|(term, freq)| {
                let value = ((n_docs as f64 + 1.0) / (freq as f64 + 1.0)).ln() + 1.0;
                (term.to_string(), value)
            })
            .collect();

        let documents: Vec<IndexedDocument> = corpus
            .iter()
            .zip(term_lists)
            .map(|(sample, terms)| {
                let tf = SparseVector::from_term_counts(terms);
                let tfidf: SparseVector = tf
                    .iter()
                    .map(|(term, tf_val)| {
                        let idf_val = idf.get(term).copied().unwrap_or(1.0);
                        (term.clone(), tf_val * idf_val)
                    })
                    .collect();
                IndexedDocument {
                    task: sample.task.clone(),
                    agent: sample.agent.clone(),
                    tfidf,
                }
            })
            .collect();

        Self {
            idf,
            documents,
            doc_count: n_docs,
            use_bigrams,
            use_trigrams,
        }
    }

    pub fn doc_count(&self) -> usize {
        self.doc_count
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[IndexedDocument] {
        &self.documents
    }

    /// IDF for a term, with the unseen-term default.
    pub fn idf(&self, term: &str) -> f64 {
        self.idf.get(term).copied().unwrap_or(1.0)
    }

    /// A vectoriser bound to this index's IDF table and n-gram settings.
    pub fn vectorizer(&self) -> Vectorizer {
        Vectorizer::new(self.idf.clone(), self.use_bigrams, self.use_trigrams)
    }

    /// Top-`k` most similar indexed documents by cosine similarity.
    pub fn query(&self, text: &str, top_k: usize) -> Vec<QueryMatch> {
        let query_vec = self.vectorizer().vectorize(text);
        let mut matches: Vec<QueryMatch> = self
            .documents
            .iter()
            .map(|doc| QueryMatch {
                task: doc.task.clone(),
                agent: doc.agent.clone(),
                similarity: query_vec.cosine(&doc.tfidf),
            })
            .collect();

        // Stable sort: equal similarities keep corpus order.
        matches.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(top_k);
        matches
    }

    /// Per-agent score distribution from the top-`k` neighbours.
    ///
    /// Similarities of neighbours sharing an agent label are summed, then
    /// divided by the grand total. If nothing matches (all similarities
    /// zero) every agent scores zero.
    pub fn agent_scores(&self, text: &str, top_k: usize) -> BTreeMap<String, f64> {
        let mut sums: BTreeMap<String, f64> = BTreeMap::new();
        for hit in self.query(text, top_k) {
            *sums.entry(hit.agent).or_insert(0.0) += hit.similarity;
        }

        let total: f64 = sums.values().sum();
        let divisor = if total > 0.0 { total } else { 1.0 };
        sums.into_iter().map(|(a, s)| (a, s / divisor)).collect()
    }

    /// Persist as a single JSON document (atomic write).
    pub fn save(&self, path: &Path) -> Result<()> {
        storage::write_json_atomic(path, self)
    }

    /// Load a persisted index. Missing or corrupt files read as `None`;
    /// callers fall back to the keyword tier and rebuild when a corpus is
    /// available.
    pub fn load(path: &Path) -> Option<Self> {
        storage::read_json(path)
    }
}
