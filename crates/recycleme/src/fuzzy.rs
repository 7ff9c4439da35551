//! Fuzzy matching of location names.
//!
//! Location names typed into the form are compared against the catalog's
//! location keys with a similarity score on a 0..=100 scale. The default
//! scorer is the normalized insert/delete edit-distance ratio; two
//! alternatives from `strsim` can be selected through configuration.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Similarity function used to score a query against a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scorer {
    /// `2 * LCS / (|a| + |b|)`, i.e. edit distance where a substitution
    /// costs a delete plus an insert.
    #[default]
    Ratio,
    /// Classic Levenshtein distance normalized by the longer string.
    Levenshtein,
    /// Jaro-Winkler similarity, which favours shared prefixes.
    JaroWinkler,
}

impl std::fmt::Display for Scorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ratio => write!(f, "ratio"),
            Self::Levenshtein => write!(f, "levenshtein"),
            Self::JaroWinkler => write!(f, "jaro_winkler"),
        }
    }
}

impl Scorer {
    /// Score two already-processed strings. Empty input scores 0.
    #[must_use]
    pub fn score(self, a: &str, b: &str) -> u8 {
        if a.is_empty() || b.is_empty() {
            return 0;
        }
        match self {
            Self::Ratio => ratio(a, b),
            Self::Levenshtein => to_percent(strsim::normalized_levenshtein(a, b)),
            Self::JaroWinkler => to_percent(strsim::jaro_winkler(a, b)),
        }
    }
}

/// A candidate that scored best against a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationMatch {
    /// The candidate exactly as it appears in the catalog.
    pub name: String,
    /// Similarity score, 0..=100.
    pub score: u8,
}

/// Picks the closest location name for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matcher {
    threshold: u8,
    scorer: Scorer,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD, Scorer::default())
    }
}

impl Matcher {
    /// Scores at or below this are not considered a match.
    pub const DEFAULT_THRESHOLD: u8 = 70;

    /// Create a matcher with the given threshold and scorer.
    #[must_use]
    pub const fn new(threshold: u8, scorer: Scorer) -> Self {
        Self { threshold, scorer }
    }

    /// The match threshold.
    #[must_use]
    pub const fn threshold(&self) -> u8 {
        self.threshold
    }

    /// The scoring function.
    #[must_use]
    pub const fn scorer(&self) -> Scorer {
        self.scorer
    }

    /// Whether a score clears the threshold. The comparison is strict.
    #[must_use]
    pub const fn is_match(&self, score: u8) -> bool {
        score > self.threshold
    }

    /// Find the best-scoring candidate regardless of threshold.
    ///
    /// Both sides are normalized with [`process`] first. On ties the earliest
    /// candidate wins. Returns `None` when the normalized query is empty or
    /// there are no candidates.
    pub fn best_match<'a, I>(&self, query: &str, candidates: I) -> Option<LocationMatch>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let query = process(query);
        if query.is_empty() {
            return None;
        }

        let mut best: Option<LocationMatch> = None;
        for candidate in candidates {
            let score = self.scorer.score(&query, &process(candidate));
            trace!(candidate, score, "scored location");
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(LocationMatch {
                    name: candidate.to_string(),
                    score,
                });
            }
        }
        best
    }

    /// Find the best candidate, keeping it only if it clears the threshold.
    pub fn resolve<'a, I>(&self, query: &str, candidates: I) -> Option<LocationMatch>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.best_match(query, candidates)
            .filter(|m| self.is_match(m.score))
    }
}

/// Normalize a string for comparison.
///
/// Every non-word character becomes a space, then the result is lowercased
/// and trimmed.
#[must_use]
pub fn process(s: &str) -> String {
    static NON_WORD: OnceLock<Regex> = OnceLock::new();
    let re = NON_WORD.get_or_init(|| Regex::new(r"\W").expect("static regex is valid"));
    re.replace_all(s, " ").to_lowercase().trim().to_string()
}

/// Normalized insert/delete similarity of two strings on a 0..=100 scale.
///
/// Computed as `round(100 * 2 * LCS / (|a| + |b|))` over characters, rounding
/// half to even. Empty input scores 0.
#[must_use]
pub fn ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let matched = 2 * lcs_len(&a, &b);
    let score = round_half_even(100 * matched, total);
    u8::try_from(score).unwrap_or(100)
}

/// Length of the longest common subsequence.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// `num / den` rounded half to even.
fn round_half_even(num: usize, den: usize) -> usize {
    let q = num / den;
    let r = num % den;
    match (2 * r).cmp(&den) {
        std::cmp::Ordering::Less => q,
        std::cmp::Ordering::Greater => q + 1,
        std::cmp::Ordering::Equal => q + (q % 2),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_percent(similarity: f64) -> u8 {
    (similarity.clamp(0.0, 1.0) * 100.0).round() as u8
}
