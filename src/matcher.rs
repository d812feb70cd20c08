// 🔍 Fuzzy Matcher - Token-order-insensitive best-match primitive
// Scores are integers 0-100; word-order permutations of the same tokens
// score exactly 100. Tie-break is first-seen in candidate iteration order,
// so callers must pass an explicitly ordered candidate sequence.

use serde::{Deserialize, Serialize};
use strsim::normalized_levenshtein;

// ============================================================================
// SIMILARITY
// ============================================================================

/// Token-sort similarity between two strings, 0-100.
///
/// Both sides are lowercased, split on whitespace, token-sorted and
/// rejoined before a normalized edit-distance comparison, so
/// "Goreng Indomie Jumbo" vs "Indomie Jumbo Goreng" scores 100.
/// Whitespace-insensitivity extends to the degenerate case: a
/// whitespace-only string has no tokens and compares equal to the
/// empty string, so "" vs "   " scores 100. Empty vs any string with
/// at least one token scores 0.
pub fn similarity(a: &str, b: &str) -> u8 {
    let na = token_sort(a);
    let nb = token_sort(b);
    (normalized_levenshtein(&na, &nb) * 100.0).round() as u8
}

/// Lowercase, whitespace-split, sort, rejoin with single spaces.
fn token_sort(s: &str) -> String {
    let mut tokens: Vec<String> = s
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .collect();
    tokens.sort();
    tokens.join(" ")
}

// ============================================================================
// BEST MATCH
// ============================================================================

/// Best candidate for one query: position within the candidate sequence,
/// the candidate string, and its similarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub index: usize,
    pub name: String,
    pub score: u8,
}

/// Single pass over `candidates`, returning the highest-scoring one.
///
/// Ties resolve to the first candidate encountered (strictly-greater
/// replacement), reproducibly across runs. Empty candidate collection
/// returns None - "no match", not an error. O(candidates) per call;
/// callers iterate distinct names, never raw rows.
pub fn best_match<S: AsRef<str>>(query: &str, candidates: &[S]) -> Option<MatchCandidate> {
    let mut best: Option<MatchCandidate> = None;

    for (index, candidate) in candidates.iter().enumerate() {
        let score = similarity(query, candidate.as_ref());
        let better = match &best {
            Some(b) => score > b.score,
            None => true,
        };
        if better {
            best = Some(MatchCandidate {
                index,
                name: candidate.as_ref().to_string(),
                score,
            });
        }
    }

    best
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings_score_100() {
        assert_eq!(similarity("Indomie Goreng", "Indomie Goreng"), 100);
    }

    #[test]
    fn test_token_permutation_scores_100() {
        assert_eq!(similarity("Goreng Indomie Jumbo", "Indomie Jumbo Goreng"), 100);
        assert_eq!(similarity("AQUA 600ml", "600ml aqua"), 100);
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        assert_eq!(similarity("indomie  goreng", "INDOMIE GORENG"), 100);
    }

    #[test]
    fn test_different_strings_score_below_100() {
        let score = similarity("Indomie Goreng", "Mie Sedaap Goreng");
        assert!(score < 100);
        assert!(score > 0);
    }

    #[test]
    fn test_empty_query_against_empty_candidate() {
        assert_eq!(similarity("", ""), 100);
        assert_eq!(similarity("", "Indomie"), 0);
    }

    #[test]
    fn test_whitespace_only_collapses_to_empty() {
        // No tokens on either side → equal under the token algorithm.
        assert_eq!(similarity("", "   "), 100);
        assert_eq!(similarity(" \t ", ""), 100);
        assert_eq!(similarity("   ", "Indomie"), 0);
    }

    #[test]
    fn test_best_match_returns_maximum() {
        let candidates = ["Mie Sedaap", "Indomie Goreng Jumbo", "Aqua 600ml"];
        let m = best_match("Indomie Jumbo Goreng", &candidates).unwrap();
        assert_eq!(m.name, "Indomie Goreng Jumbo");
        assert_eq!(m.score, 100);
        assert_eq!(m.index, 1);
    }

    #[test]
    fn test_best_match_empty_candidates_is_none() {
        let candidates: [&str; 0] = [];
        assert!(best_match("Indomie", &candidates).is_none());
    }

    #[test]
    fn test_tie_break_first_in_iteration_order() {
        // Both candidates are permutations of the query → both score 100.
        let candidates = ["Goreng Indomie", "Indomie Goreng"];
        let m = best_match("Indomie Goreng", &candidates).unwrap();
        assert_eq!(m.index, 0);
        assert_eq!(m.name, "Goreng Indomie");

        // Reversed order flips the winner - deterministic either way.
        let reversed = ["Indomie Goreng", "Goreng Indomie"];
        let m = best_match("Indomie Goreng", &reversed).unwrap();
        assert_eq!(m.index, 0);
        assert_eq!(m.name, "Indomie Goreng");
    }

    #[test]
    fn test_tie_break_reproducible() {
        let candidates = ["Goreng Indomie", "Indomie Goreng", "indomie goreng"];
        let first = best_match("Indomie Goreng", &candidates).unwrap();
        for _ in 0..10 {
            assert_eq!(best_match("Indomie Goreng", &candidates).unwrap(), first);
        }
    }
}
