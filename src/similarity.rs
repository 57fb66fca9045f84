//! Fuzzy similarity scoring for noisy titles.
//!
//! Scraped titles rarely match catalog titles exactly: extra punctuation,
//! typos, reordered words. A single algorithm handles only some of those, so
//! the composite score blends four measures, each good at a different failure
//! mode:
//!
//! - edit distance catches typos,
//! - Jaro catches transposed characters,
//! - common-substring catches embedded titles ("The Office (US)"),
//! - word overlap catches reordered or partially-matching word sets.
//!
//! All measures run on normalized strings, normalized exactly once.

use std::collections::HashSet;

use strsim::{jaro, normalized_levenshtein};

const WEIGHT_EDIT: f64 = 0.3;
const WEIGHT_JARO: f64 = 0.3;
const WEIGHT_SUBSTRING: f64 = 0.2;
const WEIGHT_WORD_OVERLAP: f64 = 0.2;

/// Score a containment hit without running the quadratic substring scan.
const CONTAINMENT_SCORE: f64 = 0.9;

/// Normalize a title for comparison: lower-case, strip everything that is
/// neither a word character nor whitespace, collapse whitespace runs, trim.
pub fn normalize_title(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let mut cleaned = String::with_capacity(lowered.len());
    for ch in lowered.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch.is_whitespace() {
            cleaned.push(ch);
        }
    }
    collapse_whitespace(&cleaned)
}

/// Collapse runs of whitespace into single spaces and trim the ends.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Composite similarity between two titles, in `[0, 1]`.
///
/// `1.0` iff the normalized forms are identical; otherwise a weighted sum of
/// the four sub-scores. Symmetric up to normalization.
pub fn similarity(a: &str, b: &str) -> f64 {
    let norm_a = normalize_title(a);
    let norm_b = normalize_title(b);

    if norm_a == norm_b {
        return 1.0;
    }

    let edit = normalized_levenshtein(&norm_a, &norm_b);
    let jaro_score = jaro_similarity(&norm_a, &norm_b);
    let substring = substring_score(&norm_a, &norm_b);
    let word_overlap = word_overlap_score(&norm_a, &norm_b);

    WEIGHT_EDIT * edit
        + WEIGHT_JARO * jaro_score
        + WEIGHT_SUBSTRING * substring
        + WEIGHT_WORD_OVERLAP * word_overlap
}

/// Standard Jaro similarity; zero when either side is empty.
fn jaro_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    jaro(a, b)
}

/// Containment short-circuits to a high fixed score; otherwise the longest
/// common contiguous substring relative to the longer string.
fn substring_score(a: &str, b: &str) -> f64 {
    if a.contains(b) || b.contains(a) {
        return CONTAINMENT_SCORE;
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let longest = longest_common_substring(&a_chars, &b_chars);
    longest as f64 / a_chars.len().max(b_chars.len()) as f64
}

/// Longest common contiguous substring length, single-row DP.
fn longest_common_substring(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut row = vec![0usize; b.len() + 1];
    let mut longest = 0;
    for &ca in a {
        let mut prev_diag = 0;
        for (j, &cb) in b.iter().enumerate() {
            let current = if ca == cb { prev_diag + 1 } else { 0 };
            prev_diag = row[j + 1];
            row[j + 1] = current;
            longest = longest.max(current);
        }
    }
    longest
}

/// Jaccard similarity over whitespace-split token sets, ignoring one-char
/// tokens; zero when either set is empty.
fn word_overlap_score(a: &str, b: &str) -> f64 {
    let words_a: HashSet<&str> = a
        .split_whitespace()
        .filter(|w| w.chars().count() > 1)
        .collect();
    let words_b: HashSet<&str> = b
        .split_whitespace()
        .filter(|w| w.chars().count() > 1)
        .collect();

    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let intersection = words_a.intersection(&words_b).count();
    let union = words_a.union(&words_b).count();
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_and_collapses() {
        assert_eq!(normalize_title("  The  OFFICE!! "), "the office");
        assert_eq!(normalize_title("Spider-Man: No Way Home"), "spiderman no way home");
        assert_eq!(normalize_title("WALL·E"), "walle");
        assert_eq!(normalize_title("___"), "___");
        assert_eq!(normalize_title("??!"), "");
    }

    #[test]
    fn identical_titles_score_one() {
        assert_eq!(similarity("Inception", "Inception"), 1.0);
        // Identity must survive normalization noise.
        assert_eq!(similarity("Inception!", "  inception "), 1.0);
    }

    #[test]
    fn similarity_is_symmetric() {
        let pairs = [
            ("The Office", "The Offfice"),
            ("Breaking Bad", "Breaking"),
            ("Dark", "Dark Matter"),
            ("", "Inception"),
        ];
        for (a, b) in pairs {
            assert_eq!(similarity(a, b), similarity(b, a), "asymmetric for {a:?} / {b:?}");
        }
    }

    #[test]
    fn scores_stay_in_unit_interval() {
        let pairs = [
            ("The Office", "The Offfice"),
            ("Zzzqx Nonexistent", "The Crown"),
            ("a", "b"),
            ("", ""),
        ];
        for (a, b) in pairs {
            let score = similarity(a, b);
            assert!((0.0..=1.0).contains(&score), "out of range for {a:?} / {b:?}: {score}");
        }
    }

    #[test]
    fn typo_scores_above_threshold() {
        assert!(similarity("The Offfice", "The Office") >= 0.7);
        assert!(similarity("Brekaing Bad", "Breaking Bad") >= 0.7);
    }

    #[test]
    fn unrelated_titles_score_low() {
        assert!(similarity("Zzzqx Nonexistent", "The Crown") < 0.7);
        assert!(similarity("Zzzqx Nonexistent", "Planet Earth") < 0.7);
    }

    #[test]
    fn containment_short_circuits() {
        assert_eq!(substring_score("the office", "the office us"), CONTAINMENT_SCORE);
        assert_eq!(substring_score("dark", "dark matter"), CONTAINMENT_SCORE);
    }

    #[test]
    fn longest_common_substring_basics() {
        let a: Vec<char> = "the offfice".chars().collect();
        let b: Vec<char> = "the office".chars().collect();
        assert_eq!(longest_common_substring(&a, &b), 7); // "the off"

        let c: Vec<char> = "abc".chars().collect();
        let d: Vec<char> = "xyz".chars().collect();
        assert_eq!(longest_common_substring(&c, &d), 0);
        assert_eq!(longest_common_substring(&c, &[]), 0);
    }

    #[test]
    fn word_overlap_ignores_single_chars() {
        // "a" is filtered on both sides; only multi-char tokens count.
        assert_eq!(word_overlap_score("a quiet place", "a loud place"), 1.0 / 3.0);
        assert_eq!(word_overlap_score("a", "a"), 0.0);
        assert_eq!(word_overlap_score("", "place"), 0.0);
    }

    #[test]
    fn jaro_empty_is_zero() {
        assert_eq!(jaro_similarity("", "abc"), 0.0);
        assert_eq!(jaro_similarity("abc", ""), 0.0);
    }
}
