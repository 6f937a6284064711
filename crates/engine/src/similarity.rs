use std::collections::HashSet;

/// Weight of whole-word containment in the combined score.
pub const TOKEN_WEIGHT: f64 = 0.7;
/// Weight of character n-gram containment in the combined score.
pub const NGRAM_WEIGHT: f64 = 0.3;
pub const NGRAM_SIZE: usize = 3;

/// Both components of a directional lexical comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LexicalScore {
    pub containment: f64,
    pub ngram: f64,
}

impl LexicalScore {
    /// Compare a normalized query against a normalized candidate key.
    #[must_use]
    pub fn between(query: &str, key: &str) -> Self {
        Self {
            containment: token_containment(query, key),
            ngram: ngram_containment(query, key),
        }
    }

    #[must_use]
    pub fn combined(&self) -> f64 {
        TOKEN_WEIGHT * self.containment + NGRAM_WEIGHT * self.ngram
    }
}

/// Combined directional similarity in [0, 1]: how much of `key` is covered by `query`.
///
/// Both inputs are expected to be normalized already. Swapping them changes the score.
#[must_use]
pub fn similarity(query: &str, key: &str) -> f64 {
    LexicalScore::between(query, key).combined()
}

/// Fraction of the key's distinct words that appear in the query.
#[must_use]
pub fn token_containment(query: &str, key: &str) -> f64 {
    let key_tokens: HashSet<&str> = key.split_whitespace().collect();
    if key_tokens.is_empty() {
        return 0.0;
    }
    let query_tokens: HashSet<&str> = query.split_whitespace().collect();
    let shared = key_tokens.intersection(&query_tokens).count();
    shared as f64 / key_tokens.len() as f64
}

/// Fraction of the key's distinct character trigrams that appear in the query.
#[must_use]
pub fn ngram_containment(query: &str, key: &str) -> f64 {
    let key_grams = char_ngrams(key, NGRAM_SIZE);
    if key_grams.is_empty() {
        return 0.0;
    }
    let query_grams = char_ngrams(query, NGRAM_SIZE);
    let shared = key_grams.intersection(&query_grams).count();
    shared as f64 / key_grams.len() as f64
}

/// Distinct contiguous character windows of length `n` (by `char`, not byte).
#[must_use]
pub fn char_ngrams(text: &str, n: usize) -> HashSet<String> {
    if n == 0 {
        return HashSet::new();
    }
    let chars: Vec<char> = text.chars().collect();
    chars.windows(n).map(|w| w.iter().collect()).collect()
}
