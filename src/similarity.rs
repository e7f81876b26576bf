//! Edit-distance word similarity.
//!
//! The single source of truth for fuzzy word comparison in cuetrack. Pure and
//! deterministic: classic dynamic-programming Levenshtein with unit costs,
//! no Unicode normalization beyond lowercasing.

/// Computes the Levenshtein distance between two strings.
///
/// Insertions, deletions and substitutions all cost 1. Operates on `char`s,
/// so multi-byte characters count as single edits.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Two-row DP: prev holds distances for the previous character of b.
    let mut prev: Vec<usize> = (0..=a.len()).collect();
    let mut curr: Vec<usize> = vec![0; a.len() + 1];

    for (i, bc) in b.iter().enumerate() {
        curr[0] = i + 1;
        for (j, ac) in a.iter().enumerate() {
            let substitution = if ac == bc { prev[j] } else { prev[j] + 1 };
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[a.len()]
}

/// Computes a similarity score in `[0, 1]` between two words.
///
/// Defined as `1 - distance(lower(a), lower(b)) / max(len(a), len(b))`.
/// Two empty words are identical (similarity 1).
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let distance = levenshtein(&a.to_lowercase(), &b.to_lowercase());
    1.0 - distance as f64 / max_len as f64
}

/// Returns true when `similarity(a, b)` reaches `threshold`.
pub fn are_similar(a: &str, b: &str, threshold: f64) -> bool {
    similarity(a, b) >= threshold
}
