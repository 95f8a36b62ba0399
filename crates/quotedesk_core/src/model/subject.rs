//! Subject tag normalization.
//!
//! # Invariants
//! - Normalized subjects are trimmed, lowercase, non-empty and unique.
//! - Legacy cleanup only rewrites a single comma/newline-joined entry.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static LEGACY_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,\n]").expect("valid separator regex"));
static NUMERIC_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+$").expect("valid numeric regex"));

/// Normalizes one subject; `None` for blank input.
pub fn normalize_subject(subject: &str) -> Option<String> {
    let trimmed = subject.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes, deduplicates and sorts subject values.
pub fn normalize_subjects(subjects: &[String]) -> Vec<String> {
    subjects
        .iter()
        .filter_map(|subject| normalize_subject(subject))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Splits a legacy single-entry subject list such as `["grit, focus, 12"]`.
///
/// Returns `None` when the list is not a single joined entry or when the
/// split yields fewer than two usable tokens. Numeric-only tokens are dropped.
pub fn split_legacy_subjects(subjects: &[String]) -> Option<Vec<String>> {
    let [only] = subjects else {
        return None;
    };
    if !LEGACY_SEPARATOR_RE.is_match(only) {
        return None;
    }

    let mut seen = BTreeSet::new();
    let tokens: Vec<String> = LEGACY_SEPARATOR_RE
        .split(only)
        .filter_map(normalize_subject)
        .filter(|token| !NUMERIC_TOKEN_RE.is_match(token))
        .filter(|token| seen.insert(token.clone()))
        .collect();

    if tokens.len() > 1 {
        Some(tokens)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_subjects, split_legacy_subjects};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn normalize_dedupes_case_insensitively() {
        let normalized = normalize_subjects(&strings(&["Grit", " grit ", "", "Focus"]));
        assert_eq!(normalized, strings(&["focus", "grit"]));
    }

    #[test]
    fn legacy_split_drops_numbers_and_keeps_order() {
        let split = split_legacy_subjects(&strings(&["Leadership, 42,\nTeamwork , leadership"]));
        assert_eq!(split, Some(strings(&["leadership", "teamwork"])));
    }

    #[test]
    fn legacy_split_ignores_regular_lists() {
        assert_eq!(split_legacy_subjects(&strings(&["a", "b"])), None);
        assert_eq!(split_legacy_subjects(&strings(&["plain"])), None);
        assert_eq!(split_legacy_subjects(&strings(&["grit, 7"])), None);
        assert_eq!(split_legacy_subjects(&[]), None);
    }
}
