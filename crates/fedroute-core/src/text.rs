//! Tokenisation — lowercase ASCII letter runs, stop-word removal, n-grams.
//!
//! The tokeniser is deterministic and pure. Text that contains only
//! stop-words or single-letter tokens produces an empty sequence, which
//! downstream scorers treat as "no signal", never as an error.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Common English words carrying no routing information.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "a", "an", "is", "are", "was", "were", "be", "been", "being",
        "have", "has", "had", "do", "does", "did", "will", "would", "could",
        "should", "may", "might", "can", "shall", "must", "need", "ought",
        "used", "am", "to", "of", "in", "for", "on", "with", "at", "by",
        "from", "as", "into", "through", "during", "before", "after",
        "above", "below", "between", "under", "over", "and", "but", "or",
        "nor", "not", "so", "yet", "both", "either", "neither", "each",
        "every", "all", "any", "few", "more", "most", "other", "some",
        "such", "no", "only", "own", "same", "than", "too", "very", "just",
        "because", "if", "when", "while", "where", "how", "then", "there",
        "here", "again", "once", "about", "up", "out", "it", "this", "that",
        "these", "those", "i", "me", "my", "we", "us", "you", "your", "he",
        "she", "they", "them", "him", "her", "his", "its", "our", "their",
        "who", "whom", "whose", "what", "which", "although", "though",
    ]
    .into_iter()
    .collect()
});

/// Returns true if `word` is in the stop-word set.
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word)
}

/// Tokenise text into lowercase alphabetic tokens.
///
/// Extracts maximal runs of ASCII letters, lowercases them, and drops
/// stop-words and tokens of length <= 1.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        if c.is_ascii_alphabetic() {
            current.push(c.to_ascii_lowercase());
        } else if !current.is_empty() {
            push_token(&mut tokens, std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        push_token(&mut tokens, current);
    }

    tokens
}

fn push_token(tokens: &mut Vec<String>, token: String) {
    if token.len() > 1 && !STOP_WORDS.contains(token.as_str()) {
        tokens.push(token);
    }
}

/// Extract n-grams from a token sequence, joined with `_`.
///
/// Produces `tokens.len() - n + 1` items when `n <= tokens.len()`,
/// otherwise an empty sequence.
pub fn ngrams(tokens: &[String], n: usize) -> Vec<String> {
    if n == 0 || tokens.len() < n {
        return Vec::new();
    }
    tokens.windows(n).map(|w| w.join("_")).collect()
}

/// Tokens plus optional bigram/trigram expansion, in order.
pub fn expand_terms(tokens: &[String], use_bigrams: bool, use_trigrams: bool) -> Vec<String> {
    let mut terms = tokens.to_vec();
    if use_bigrams {
        terms.extend(ngrams(tokens, 2));
    }
    if use_trigrams {
        terms.extend(ngrams(tokens, 3));
    }
    terms
}
