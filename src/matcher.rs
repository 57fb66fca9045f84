//! Candidate selection over raw remote results.
//!
//! The remote service returns a noisy candidate list; this module filters it
//! by the expected category when one is known, scores every usable candidate
//! against the searched title, and keeps the best one only when it clears the
//! minimum-confidence threshold.

use tracing::debug;

use crate::similarity::similarity;
use crate::types::CandidateTitle;

/// Winning candidate with its similarity score.
#[derive(Debug, Clone, PartialEq)]
pub struct BestMatch {
    pub candidate: CandidateTitle,
    pub score: f64,
}

/// Pick the best candidate for `search_title`, or nothing when no candidate
/// reaches `min_score`.
///
/// A category hint narrows the pool case-insensitively, but a hint that
/// matches no candidate falls back to the full set instead of forcing a miss.
/// Ties keep the first-seen maximum.
pub fn find_best_match(
    search_title: &str,
    candidates: &[CandidateTitle],
    expected_category: Option<&str>,
    min_score: f64,
) -> Option<BestMatch> {
    if candidates.is_empty() {
        return None;
    }

    let filtered = filter_by_category(candidates, expected_category);

    let mut best: Option<(&CandidateTitle, f64)> = None;
    for candidate in filtered {
        let Some(title) = candidate
            .primary_title
            .as_deref()
            .filter(|t| !t.is_empty())
        else {
            continue;
        };

        let score = similarity(search_title, title);
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((candidate, score));
        }
    }

    match best {
        Some((candidate, score)) if score >= min_score => Some(BestMatch {
            candidate: candidate.clone(),
            score,
        }),
        Some((_, score)) => {
            debug!(search_title, best_score = score, "no_confident_match");
            None
        }
        None => None,
    }
}

fn filter_by_category<'a>(
    candidates: &'a [CandidateTitle],
    expected_category: Option<&str>,
) -> Vec<&'a CandidateTitle> {
    if let Some(category) = expected_category {
        let filtered: Vec<&CandidateTitle> = candidates
            .iter()
            .filter(|c| {
                c.title_type
                    .as_deref()
                    .is_some_and(|t| t.eq_ignore_ascii_case(category))
            })
            .collect();
        if !filtered.is_empty() {
            return filtered;
        }
    }
    candidates.iter().collect()
}
