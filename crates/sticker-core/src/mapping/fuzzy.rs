//! String similarity on a 0 - 100 scale.
//!
//! Inputs are expected in reference-key form ([`fold_key`](crate::order::rules::fold_key)),
//! so scores never depend on case or accents.

use rapidfuzz::fuzz;

/// Normalized indel similarity, 0 - 100.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    fuzz::ratio(a.chars(), b.chars()) * 100.0
}

/// Similarity after sorting whitespace-separated tokens, so word order is ignored.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

fn sorted_tokens(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Best similarity of the shorter string against any equally long window of
/// the longer one.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };

    let short: Vec<char> = short.chars().collect();
    let long: Vec<char> = long.chars().collect();
    if short.is_empty() {
        return 0.0;
    }

    long.windows(short.len())
        .map(|window| fuzz::ratio(window.iter().copied(), short.iter().copied()) * 100.0)
        .fold(0.0, f64::max)
}

/// Highest-scoring candidate at or above `threshold`. Ties keep the earliest.
pub fn best_match<'a, I>(
    query: &str,
    candidates: I,
    scorer: fn(&str, &str) -> f64,
    threshold: f64,
) -> Option<(&'a str, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&'a str, f64)> = None;

    for candidate in candidates {
        let score = scorer(query, candidate);
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((candidate, score));
        }
    }

    best.filter(|(_, score)| *score >= threshold)
}
