//! Dense-vector similarity and per-agent aggregation.

use crate::cache::EmbeddingCache;
use std::collections::BTreeMap;

/// Cosine similarity between two dense vectors.
///
/// Mismatched lengths, empty vectors and zero magnitudes all score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Aggregate a query embedding against every cached training vector.
///
/// For each agent: mean of its top-3 similarities, then the whole map is
/// divided by its maximum so the best agent scores 1.0. Returns `None`
/// when the cache is empty.
pub fn agent_similarities(query: &[f32], cache: &EmbeddingCache) -> Option<BTreeMap<String, f64>> {
    if cache.is_empty() {
        return None;
    }

    let mut per_agent: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for entry in cache.entries() {
        per_agent
            .entry(entry.agent.as_str())
            .or_default()
            .push(cosine_similarity(query, &entry.embedding));
    }

    let mut scores: BTreeMap<String, f64> = per_agent
        .into_iter()
        .map(|(agent, mut sims)| {
            sims.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
            let take = sims.len().min(3);
            let mean = sims[..take].iter().sum::<f64>() / take as f64;
            (agent.to_string(), mean)
        })
        .collect();

    let max = scores.values().cloned().fold(f64::MIN, f64::max);
    if max > 0.0 {
        for v in scores.values_mut() {
            *v /= max;
        }
    }
    Some(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CachedEmbedding;

    #[test]
    fn cosine_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-10);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-10);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-10);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn best_agent_normalises_to_one() {
        let mut cache = EmbeddingCache::new();
        cache.push(CachedEmbedding {
            task: "deploy it".into(),
            agent: "kimi".into(),
            embedding: vec![1.0, 0.0],
        });
        cache.push(CachedEmbedding {
            task: "research it".into(),
            agent: "claude".into(),
            embedding: vec![0.0, 1.0],
        });

        let scores = agent_similarities(&[0.9, 0.1], &cache).unwrap();
        assert!((scores["kimi"] - 1.0).abs() < 1e-10);
        assert!(scores["claude"] < scores["kimi"]);
    }

    #[test]
    fn top_three_mean_per_agent() {
        let mut cache = EmbeddingCache::new();
        // four kimi entries; only the best three should count
        for (i, v) in [[1.0, 0.0], [0.8, 0.2], [0.6, 0.4], [0.0, 1.0]]
            .iter()
            .enumerate()
        {
            cache.push(CachedEmbedding {
                task: format!("task {i}"),
                agent: "kimi".into(),
                embedding: v.to_vec(),
            });
        }

        let scores = agent_similarities(&[1.0, 0.0], &cache).unwrap();
        // single-agent cache: after max-normalisation the score is 1.0
        assert!((scores["kimi"] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn empty_cache_is_unavailable() {
        assert!(agent_similarities(&[1.0], &EmbeddingCache::new()).is_none());
    }
}
