//! Approximate name similarity.
//!
//! Sørensen–Dice coefficient over character bigrams, computed on
//! lowercased input with whitespace removed. The duplicate threshold used
//! by reconciliation (0.85) is calibrated against this metric.

use std::collections::HashMap;

/// Score the similarity of two strings in `[0.0, 1.0]`.
///
/// Symmetric, case-insensitive, and insensitive to whitespace layout.
/// Identical strings (after normalisation) score exactly `1.0`, including
/// two empty strings. Strings too short to form a bigram score `0.0`
/// unless identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);

    if a == b {
        return 1.0;
    }
    if a.chars().count() < 2 || b.chars().count() < 2 {
        return 0.0;
    }

    let mut a_bigrams: HashMap<(char, char), usize> = HashMap::new();
    for pair in bigrams(&a) {
        *a_bigrams.entry(pair).or_insert(0) += 1;
    }

    let mut intersection = 0usize;
    let mut b_count = 0usize;
    for pair in bigrams(&b) {
        b_count += 1;
        if let Some(count) = a_bigrams.get_mut(&pair) {
            if *count > 0 {
                *count -= 1;
                intersection += 1;
            }
        }
    }

    let a_count = a.chars().count() - 1;
    (2.0 * intersection as f64) / (a_count + b_count) as f64
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn bigrams(s: &str) -> impl Iterator<Item = (char, char)> + '_ {
    s.chars().zip(s.chars().skip(1))
}
