//! Sparse term vectors and cosine similarity.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A sparse mapping from term to non-negative weight.
///
/// Zero entries are not stored. Backed by a `BTreeMap` so that serialised
/// vectors (and therefore persisted indices) are byte-stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SparseVector(BTreeMap<String, f64>);

impl SparseVector {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build a vector from raw term counts, max-normalised:
    /// `tf(t) = count(t) / max_count`.
    pub fn from_term_counts<I: IntoIterator<Item = String>>(terms: I) -> Self {
        let mut counts: BTreeMap<String, f64> = BTreeMap::new();
        for term in terms {
            *counts.entry(term).or_insert(0.0) += 1.0;
        }
        let max = counts.values().cloned().fold(0.0, f64::max);
        if max > 0.0 {
            for v in counts.values_mut() {
                *v /= max;
            }
        }
        Self(counts)
    }

    pub fn insert(&mut self, term: impl Into<String>, weight: f64) {
        self.0.insert(term.into(), weight);
    }

    pub fn get(&self, term: &str) -> Option<f64> {
        self.0.get(term).copied()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.0.contains_key(term)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, f64)> {
        self.0.iter().map(|(k, v)| (k, *v))
    }

    pub fn terms(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Scale an existing entry by `f(old)`, or insert `default` if absent.
    pub fn update_or_insert(&mut self, term: &str, f: impl FnOnce(f64) -> f64, default: f64) {
        match self.0.get_mut(term) {
            Some(v) => *v = f(*v),
            None => {
                self.0.insert(term.to_string(), default);
            }
        }
    }

    /// L2 magnitude.
    pub fn magnitude(&self) -> f64 {
        self.0.values().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Cosine similarity over the key intersection.
    ///
    /// Returns 0.0 when either vector has zero magnitude or the key sets
    /// are disjoint. With non-negative weights the result is in [0, 1].
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        // Walk the smaller map against the larger one.
        let (small, large) = if self.0.len() <= other.0.len() {
            (&self.0, &other.0)
        } else {
            (&other.0, &self.0)
        };

        let dot: f64 = small
            .iter()
            .filter_map(|(term, a)| large.get(term).map(|b| a * b))
            .sum();
        if dot == 0.0 {
            return 0.0;
        }

        let mag = self.magnitude() * other.magnitude();
        if mag == 0.0 {
            return 0.0;
        }
        dot / mag
    }

    /// Top `n` terms by weight, descending. Equal weights order by term.
    pub fn top_terms(&self, n: usize) -> Vec<(String, f64)> {
        let mut entries: Vec<(String, f64)> =
            self.0.iter().map(|(k, v)| (k.clone(), *v)).collect();
        entries.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        entries.truncate(n);
        entries
    }
}

impl FromIterator<(String, f64)> for SparseVector {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
