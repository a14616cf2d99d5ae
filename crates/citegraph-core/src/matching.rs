use crate::index::TitleIndex;

/// Minimum similarity for a candidate citation to resolve to a known title.
pub const MATCH_THRESHOLD: f64 = 0.90;

/// Sequence-similarity ratio of two normalized titles, in `[0, 1]`.
///
/// `2 * LCS(a, b) / (|a| + |b|)` over chars, where LCS is the longest common
/// subsequence. Two empty strings are identical (`1.0`).
pub fn similarity(a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }
    let lcs = rapidfuzz::distance::lcs_seq::similarity(a.chars(), b.chars());
    (2 * lcs) as f64 / total as f64
}

/// Whether a similarity score is high enough to count as a match.
pub fn meets_threshold(score: f64) -> bool {
    score >= MATCH_THRESHOLD
}

/// Upper bound of [`similarity`] given only the two lengths.
fn max_possible_similarity(len_a: usize, len_b: usize) -> f64 {
    let total = len_a + len_b;
    if total == 0 {
        return 1.0;
    }
    (2 * len_a.min(len_b)) as f64 / total as f64
}

/// Find the best-scoring title in `known_titles` for `candidate`.
///
/// Returns the title and its score only when the score clears
/// [`MATCH_THRESHOLD`]. Ties keep the earliest title in iteration order;
/// with the sorted list from [`TitleIndex::known_titles`] that is the
/// lexicographically first one.
pub fn best_match<'a>(candidate: &str, known_titles: &'a [String]) -> Option<(&'a str, f64)> {
    let cand_len = candidate.chars().count();
    let mut best: Option<(&'a str, f64)> = None;

    for known in known_titles {
        let known_len = known.chars().count();
        let bound = max_possible_similarity(cand_len, known_len);
        if !meets_threshold(bound) {
            continue;
        }
        if let Some((_, best_score)) = best {
            if bound <= best_score {
                continue;
            }
        }

        let score = similarity(candidate, known);
        let better = match best {
            Some((_, best_score)) => score > best_score,
            None => true,
        };
        if better && meets_threshold(score) {
            best = Some((known.as_str(), score));
        }
    }

    best
}

/// Outcome of matching one candidate citation against the title index.
#[derive(Debug, Clone, PartialEq)]
pub struct CitationMatch {
    pub candidate: String,
    pub matched_title: Option<String>,
    pub matched_id: Option<String>,
    pub score: Option<f64>,
}

/// Match a candidate title against the index: fuzzy search over every known
/// title, then map the winning title back to its identifier.
pub fn match_citation(candidate: &str, index: &TitleIndex) -> CitationMatch {
    match best_match(candidate, index.known_titles()) {
        Some((title, score)) => CitationMatch {
            candidate: candidate.to_string(),
            matched_title: Some(title.to_string()),
            matched_id: index.id_of(title).map(str::to_string),
            score: Some(score),
        },
        None => CitationMatch {
            candidate: candidate.to_string(),
            matched_title: None,
            matched_id: None,
            score: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(list: &[&str]) -> Vec<String> {
        let mut v: Vec<String> = list.iter().map(|s| s.to_string()).collect();
        v.sort();
        v
    }

    #[test]
    fn test_similarity_identical() {
        assert_eq!(similarity("deep learning", "deep learning"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
    }

    #[test]
    fn test_similarity_disjoint() {
        assert_eq!(similarity("aaaa", "bbbb"), 0.0);
        assert_eq!(similarity("abc", ""), 0.0);
    }

    #[test]
    fn test_similarity_lcs_ratio() {
        // LCS("abcd", "abed") = 3 → 6 / 8
        assert_eq!(similarity("abcd", "abed"), 0.75);
    }

    #[test]
    fn test_similarity_symmetric() {
        let a = "graph neural networks a review";
        let b = "graph neural network review";
        assert_eq!(similarity(a, b), similarity(b, a));
    }

    #[test]
    fn test_threshold_exactly_090_matches() {
        // Ten chars each, one substitution: LCS 9 → 18 / 20 = 0.90
        let known = titles(&["abcdefghij"]);
        let score = similarity("abcdefghiX", "abcdefghij");
        assert_eq!(score, 0.9);
        assert_eq!(
            best_match("abcdefghiX", &known),
            Some(("abcdefghij", 0.9))
        );
    }

    #[test]
    fn test_threshold_just_below_does_not_match() {
        assert!(meets_threshold(0.90));
        assert!(!meets_threshold(0.8999));

        // Nine chars each, one substitution: LCS 8 → 16 / 18 ≈ 0.889
        let known = titles(&["abcdefghi"]);
        assert!(similarity("abcdefghX", "abcdefghi") < MATCH_THRESHOLD);
        assert_eq!(best_match("abcdefghX", &known), None);
    }

    #[test]
    fn test_best_match_picks_highest() {
        let known = titles(&[
            "deep learning for graphs",
            "deep learning for grapes",
            "shallow learning for graphs",
        ]);
        let (title, score) = best_match("deep learning for graph", &known).unwrap();
        assert_eq!(title, "deep learning for graphs");
        assert!(score > 0.95);
    }

    #[test]
    fn test_best_match_tie_prefers_lexicographically_first() {
        // Both differ from the candidate by one trailing char.
        let known = titles(&["graph attention networkb", "graph attention networka"]);
        let (title, _) = best_match("graph attention networkc", &known).unwrap();
        assert_eq!(title, "graph attention networka");
    }

    #[test]
    fn test_best_match_none_when_nothing_close() {
        let known = titles(&["a survey of reinforcement learning"]);
        assert_eq!(best_match("deep learning for graphs", &known), None);
    }

    #[test]
    fn test_length_bound_never_prunes_a_match() {
        let a = "abcdefghijklmnopqrst";
        let b = "abcdefghijklmnopqrstu";
        assert!(max_possible_similarity(20, 21) >= similarity(a, b));
    }

    #[test]
    fn test_match_citation_maps_to_identifier() {
        let index = TitleIndex::from_entries([
            ("2010.00002", "Deep Learning for Graphs."),
            ("1901.00005", "Unrelated Work on Compilers"),
        ]);
        let m = match_citation("deep learning for graphs", &index);
        assert_eq!(m.matched_title.as_deref(), Some("deep learning for graphs"));
        assert_eq!(m.matched_id.as_deref(), Some("2010.00002"));

        let miss = match_citation("quantum error correction codes", &index);
        assert_eq!(miss.matched_title, None);
        assert_eq!(miss.matched_id, None);
        assert_eq!(miss.candidate, "quantum error correction codes");
    }
}
