//! Levenshtein distance and normalized similarity.

/// Returns the minimum number of single-character insertions, deletions or
/// substitutions needed to turn `a` into `b`.
///
/// Characters compare by exact code point. Uses the full
/// `(len(b) + 1) x (len(a) + 1)` table; inputs are short quote bodies.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    let mut matrix = vec![vec![0usize; m + 1]; n + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=m {
        matrix[0][j] = j;
    }

    for i in 1..=n {
        for j in 1..=m {
            matrix[i][j] = if b_chars[i - 1] == a_chars[j - 1] {
                matrix[i - 1][j - 1]
            } else {
                1 + matrix[i - 1][j - 1] // substitution
                    .min(matrix[i][j - 1]) // insertion
                    .min(matrix[i - 1][j]) // deletion
            };
        }
    }

    matrix[n][m]
}

/// Converts edit distance into a similarity score in `[0, 1]`.
///
/// The score is `(len(longer) - distance) / len(longer)`, with lengths in
/// chars. Two empty strings are a perfect match (`1.0`).
pub fn calculate_similarity(str1: &str, str2: &str) -> f64 {
    let len1 = str1.chars().count();
    let len2 = str2.chars().count();
    let (longer, shorter, longer_len) = if len2 > len1 {
        (str2, str1, len2)
    } else {
        (str1, str2, len1)
    };

    if longer_len == 0 {
        return 1.0;
    }

    let distance = levenshtein_distance(longer, shorter);
    (longer_len - distance) as f64 / longer_len as f64
}

#[cfg(test)]
mod tests {
    use super::{calculate_similarity, levenshtein_distance};

    #[test]
    fn distance_matches_classic_examples() {
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("flaw", "lawn"), 2);
        assert_eq!(levenshtein_distance("same", "same"), 0);
    }

    #[test]
    fn distance_against_empty_is_length() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("", "abcd"), 4);
    }

    #[test]
    fn distance_counts_chars_not_bytes() {
        assert_eq!(levenshtein_distance("café", "cafe"), 1);
        assert_eq!(levenshtein_distance("日本語", "日本"), 1);
    }

    #[test]
    fn similarity_of_identical_strings_is_one() {
        for value in ["", "a", "The quick brown fox", "  spaced  "] {
            assert_eq!(calculate_similarity(value, value), 1.0);
        }
    }

    #[test]
    fn similarity_against_empty_is_zero() {
        assert_eq!(calculate_similarity("abc", ""), 0.0);
        assert_eq!(calculate_similarity("", "abc"), 0.0);
    }

    #[test]
    fn similarity_kitten_sitting() {
        let score = calculate_similarity("kitten", "sitting");
        assert!((score - 4.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn similarity_is_symmetric() {
        let pairs = [
            ("kitten", "sitting"),
            ("abc", "abd"),
            ("night", "nacht"),
            ("", "x"),
            ("hello world", "world hello"),
        ];
        for (a, b) in pairs {
            assert_eq!(calculate_similarity(a, b), calculate_similarity(b, a));
        }
    }

    #[test]
    fn similarity_stays_in_unit_interval() {
        let score = calculate_similarity("abc", "xyz");
        assert_eq!(score, 0.0);
        let score = calculate_similarity("abcdef", "abc");
        assert!((0.0..=1.0).contains(&score));
    }
}
