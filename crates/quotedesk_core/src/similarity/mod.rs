//! Quote similarity and duplicate detection.
//!
//! # Responsibility
//! - Compute Levenshtein edit distance and a normalized similarity score.
//! - Find the best existing quote matching newly entered text.
//! - Classify matches into similar/identical verdicts for callers.
//!
//! # Invariants
//! - Every function here is pure and total: no I/O, no input mutation.
//! - `calculate_similarity` is symmetric and always within `[0, 1]`.
//! - Matcher tie-break favors the earliest candidate in input order.

pub mod distance;
pub mod matcher;

pub use distance::{calculate_similarity, levenshtein_distance};
pub use matcher::{
    find_similar_quote, Candidate, CandidateText, DuplicatePolicy, DuplicateVerdict, MatchResult,
    DEFAULT_IDENTICAL_THRESHOLD, DEFAULT_SIMILAR_THRESHOLD,
};
