//! Duplicate matcher and verdict policy.
//!
//! # Invariants
//! - Blank query text or an empty candidate list never matches.
//! - A candidate becomes the running best only when its score is strictly
//!   greater than the current best AND at least the threshold.
//! - Candidates are borrowed; nothing here mutates caller data.

use super::distance::calculate_similarity;
use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Similarity at which a stored quote is reported as a possible duplicate.
pub const DEFAULT_SIMILAR_THRESHOLD: f64 = 0.85;
/// Similarity at which a stored quote is treated as the same quote.
pub const DEFAULT_IDENTICAL_THRESHOLD: f64 = 0.95;

/// Anything the matcher can score against new quote text.
pub trait CandidateText {
    /// Raw stored quote body, before normalization.
    fn candidate_text(&self) -> &str;
}

/// Lightweight existing-quote view used for duplicate checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub quote_text: String,
    pub author: String,
}

impl Candidate {
    pub fn new(
        id: impl Into<String>,
        quote_text: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            quote_text: quote_text.into(),
            author: author.into(),
        }
    }
}

impl CandidateText for Candidate {
    fn candidate_text(&self) -> &str {
        &self.quote_text
    }
}

/// Best qualifying candidate and its similarity score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult<'a, C> {
    pub candidate: &'a C,
    pub similarity: f64,
}

/// Finds the existing quote most similar to `new_quote`.
///
/// Both sides are lower-cased and trimmed (leading/trailing only) before
/// scoring. Returns `None` when the query is blank, `existing` is empty, or
/// no candidate reaches `threshold`.
pub fn find_similar_quote<'a, C: CandidateText>(
    new_quote: &str,
    existing: &'a [C],
    threshold: f64,
) -> Option<MatchResult<'a, C>> {
    if new_quote.trim().is_empty() || existing.is_empty() {
        return None;
    }

    let normalized_query = normalize_for_match(new_quote);
    let mut best: Option<&'a C> = None;
    let mut best_similarity = 0.0;

    for candidate in existing {
        let similarity = calculate_similarity(
            &normalized_query,
            &normalize_for_match(candidate.candidate_text()),
        );
        if similarity > best_similarity && similarity >= threshold {
            best_similarity = similarity;
            best = Some(candidate);
        }
    }

    best.map(|candidate| MatchResult {
        candidate,
        similarity: best_similarity,
    })
}

fn normalize_for_match(value: &str) -> String {
    value.to_lowercase().trim().to_string()
}

/// Outcome of checking new quote text against stored quotes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DuplicateVerdict<'a, C> {
    /// Nothing reached the similar threshold.
    Unique,
    /// Possible duplicate; warn and show the existing quote.
    Similar(MatchResult<'a, C>),
    /// Same quote already stored; block submission and skip enrichment.
    Identical(MatchResult<'a, C>),
}

impl<'a, C> DuplicateVerdict<'a, C> {
    /// Returns the matched candidate for non-unique verdicts.
    pub fn matched(&self) -> Option<&MatchResult<'a, C>> {
        match self {
            Self::Unique => None,
            Self::Similar(found) | Self::Identical(found) => Some(found),
        }
    }

    pub fn is_identical(&self) -> bool {
        matches!(self, Self::Identical(_))
    }

    /// Stable lowercase label used in logs and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unique => "unique",
            Self::Similar(_) => "similar",
            Self::Identical(_) => "identical",
        }
    }
}

/// Two-level threshold policy layered on top of [`find_similar_quote`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuplicatePolicy {
    similar: f64,
    identical: f64,
}

impl Default for DuplicatePolicy {
    fn default() -> Self {
        Self {
            similar: DEFAULT_SIMILAR_THRESHOLD,
            identical: DEFAULT_IDENTICAL_THRESHOLD,
        }
    }
}

impl DuplicatePolicy {
    /// Builds a policy from caller thresholds.
    ///
    /// # Errors
    /// - Either threshold is not finite or outside `[0, 1]`.
    /// - `similar` is greater than `identical`.
    pub fn new(similar: f64, identical: f64) -> Result<Self, ConfigError> {
        for (key, value) in [("similar_threshold", similar), ("identical_threshold", identical)] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    key,
                    value: value.to_string(),
                    reason: "threshold must be within [0, 1]",
                });
            }
        }
        if similar > identical {
            return Err(ConfigError::InvalidValue {
                key: "similar_threshold",
                value: similar.to_string(),
                reason: "similar threshold must not exceed identical threshold",
            });
        }
        Ok(Self { similar, identical })
    }

    pub fn similar_threshold(&self) -> f64 {
        self.similar
    }

    pub fn identical_threshold(&self) -> f64 {
        self.identical
    }

    /// Classifies `new_quote` against `existing`.
    pub fn classify<'a, C: CandidateText>(
        &self,
        new_quote: &str,
        existing: &'a [C],
    ) -> DuplicateVerdict<'a, C> {
        match find_similar_quote(new_quote, existing, self.similar) {
            None => DuplicateVerdict::Unique,
            Some(found) if found.similarity >= self.identical => DuplicateVerdict::Identical(found),
            Some(found) => DuplicateVerdict::Similar(found),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{find_similar_quote, Candidate, DuplicatePolicy, DuplicateVerdict};

    fn fox_candidates() -> Vec<Candidate> {
        vec![
            Candidate::new("1", "The quick brown fox", "A"),
            Candidate::new("2", "The quick brown fox.", "B"),
        ]
    }

    #[test]
    fn empty_query_short_circuits() {
        let existing = vec![Candidate::new("1", "x", "A")];
        assert!(find_similar_quote("", &existing, 0.5).is_none());
        assert!(find_similar_quote("   \t", &existing, 0.0).is_none());
    }

    #[test]
    fn no_candidates_means_no_match() {
        let existing: Vec<Candidate> = Vec::new();
        assert!(find_similar_quote("Hello World", &existing, 0.5).is_none());
    }

    #[test]
    fn exact_match_after_normalization_wins() {
        let existing = fox_candidates();
        let found = find_similar_quote("the quick brown fox", &existing, 0.9)
            .expect("fox should match");
        assert_eq!(found.candidate.id, "1");
        assert_eq!(found.similarity, 1.0);
    }

    #[test]
    fn all_below_threshold_returns_none() {
        let existing = fox_candidates();
        assert!(find_similar_quote("completely unrelated text", &existing, 0.9).is_none());
    }

    #[test]
    fn earliest_candidate_wins_ties() {
        let existing = vec![
            Candidate::new("first", "abcd", "A"),
            Candidate::new("second", "abce", "B"),
            Candidate::new("third", "abcd", "C"),
        ];
        let found = find_similar_quote("abcx", &existing, 0.5).expect("should match");
        assert_eq!(found.candidate.id, "first");
        assert_eq!(found.similarity, 0.75);
    }

    #[test]
    fn later_strictly_better_candidate_replaces_best() {
        let existing = vec![
            Candidate::new("near", "hello wor", "A"),
            Candidate::new("exact", "Hello World", "B"),
        ];
        let found = find_similar_quote("  hello world ", &existing, 0.5).expect("should match");
        assert_eq!(found.candidate.id, "exact");
    }

    #[test]
    fn internal_whitespace_is_significant() {
        let existing = vec![Candidate::new("1", "a  b", "A")];
        let found = find_similar_quote("a b", &existing, 0.0).expect("should match");
        assert!(found.similarity < 1.0);
    }

    #[test]
    fn zero_threshold_still_requires_positive_score() {
        let existing = vec![Candidate::new("1", "xyz", "A")];
        assert!(find_similar_quote("abc", &existing, 0.0).is_none());
    }

    #[test]
    fn repeated_runs_are_identical() {
        let existing = fox_candidates();
        let first = find_similar_quote("The quick brown fo", &existing, 0.8);
        let second = find_similar_quote("The quick brown fo", &existing, 0.8);
        assert_eq!(first, second);
    }

    #[test]
    fn policy_classifies_similar_and_identical() {
        let policy = DuplicatePolicy::default();
        let existing = vec![Candidate::new(
            "1",
            "Stay hungry, stay foolish, and never stop learning.",
            "A",
        )];

        let verdict = policy.classify("stay hungry, stay foolish, and never stop learning", &existing);
        assert!(verdict.is_identical());

        let verdict = policy.classify("Stay hungry, stay foolish, and never stop earning!!", &existing);
        match verdict {
            DuplicateVerdict::Similar(found) => {
                assert!(found.similarity >= 0.85 && found.similarity < 0.95);
            }
            other => panic!("expected similar verdict, got {}", other.label()),
        }

        let verdict = policy.classify("Something else entirely", &existing);
        assert_eq!(verdict, DuplicateVerdict::Unique);
    }

    #[test]
    fn policy_rejects_invalid_thresholds() {
        assert!(DuplicatePolicy::new(0.9, 0.8).is_err());
        assert!(DuplicatePolicy::new(-0.1, 0.8).is_err());
        assert!(DuplicatePolicy::new(0.5, f64::NAN).is_err());
        assert!(DuplicatePolicy::new(0.85, 0.95).is_ok());
    }
}
