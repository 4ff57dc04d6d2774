//! String Similarity Metric
//!
//! Normalized Levenshtein similarity used by the nothing-personal password
//! check. The score is `100 * (1 - distance / max_len)`, rounded half-up to
//! an integer percent:
//! - symmetric: `similarity(a, b) == similarity(b, a)`
//! - deterministic: pure function of its inputs
//! - 100 means identical, 0 means nothing in common
//!
//! Comparison is on Unicode code points; callers normalize case themselves.

/// Levenshtein edit distance (two-row dynamic programming)
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Similarity between two strings as an integer percent (0-100)
pub fn similarity_percent(a: &str, b: &str) -> u8 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let max_len = len_a.max(len_b);

    // Two empty strings are identical
    if max_len == 0 {
        return 100;
    }

    let distance = levenshtein(a, b);
    let score = 100.0 * (1.0 - distance as f64 / max_len as f64);
    score.round() as u8
}
