use std::cmp::Ordering;

use crate::models::MatchResult;

/// Scores closer than this are treated as a near-tie
pub const NEAR_TIE_EPSILON: f64 = 0.05;

/// Maximum number of matches returned
pub const MAX_MATCHES: usize = 10;

/// Orders matches best-first and keeps the top [`MAX_MATCHES`]
///
/// Results are sorted by score (descending), then shared items (descending),
/// then candidate id, which gives a total order independent of input order.
/// A second pass then moves a result ahead of its neighbour when their scores
/// are within [`NEAR_TIE_EPSILON`] and it has more shared items. Only near-tied
/// neighbours are ever swapped, so results further apart keep their score order.
pub fn rank(mut matches: Vec<MatchResult>) -> Vec<MatchResult> {
    matches.sort_by(compare_strict);

    // Each swap removes one shared-items inversion, so this terminates.
    let mut swapped = true;
    while swapped {
        swapped = false;
        for i in 1..matches.len() {
            let (prev, next) = (&matches[i - 1], &matches[i]);
            if is_near_tie(prev, next) && next.total_shared_items > prev.total_shared_items {
                matches.swap(i - 1, i);
                swapped = true;
            }
        }
    }

    matches.truncate(MAX_MATCHES);
    matches
}

fn compare_strict(a: &MatchResult, b: &MatchResult) -> Ordering {
    b.match_score
        .total_cmp(&a.match_score)
        .then_with(|| b.total_shared_items.cmp(&a.total_shared_items))
        .then_with(|| a.candidate_user_id.cmp(&b.candidate_user_id))
}

fn is_near_tie(a: &MatchResult, b: &MatchResult) -> bool {
    (a.match_score - b.match_score).abs() < NEAR_TIE_EPSILON
}
