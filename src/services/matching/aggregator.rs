use std::collections::BTreeMap;

use super::{similarity::jaccard, taste_vector::TasteVector};
use crate::models::{Category, MatchResult, HIGH_SIGNAL_BONUS};

/// Maximum shared tokens reported per category
pub const SHARED_SAMPLE_CAP: usize = 5;

/// Scores one candidate against the querying user
///
/// Only categories where both users have tokens take part. Every such category
/// adds its weight to the denominator, including ones with zero overlap.
/// Returns `None` when no category overlaps at all.
pub fn score_candidate(
    user: &TasteVector,
    candidate: &TasteVector,
    candidate_user_id: &str,
) -> Option<MatchResult> {
    let mut total_score = 0.0;
    let mut total_weight = 0.0;
    let mut shared_fields = Vec::new();
    let mut shared_entities = BTreeMap::new();

    for category in Category::ALL {
        let (Some(mine), Some(theirs)) = (user.tokens(category), candidate.tokens(category)) else {
            continue;
        };
        if mine.is_empty() || theirs.is_empty() {
            continue;
        }

        let weight = category.weight();
        let similarity = jaccard(mine, theirs);

        if similarity > 0.0 {
            shared_fields.push(category);
            let sample: Vec<String> = mine
                .intersection(theirs)
                .take(SHARED_SAMPLE_CAP)
                .cloned()
                .collect();
            shared_entities.insert(category, sample);
        }

        total_score += similarity * weight;
        total_weight += weight;
    }

    if total_weight == 0.0 || shared_fields.is_empty() {
        return None;
    }

    let base_score = total_score / total_weight;
    let bonus = shared_fields
        .iter()
        .filter(|category| category.is_high_signal())
        .count() as f64
        * HIGH_SIGNAL_BONUS;
    let match_score = (base_score + bonus).min(1.0);
    let total_shared_items = shared_entities.values().map(Vec::len).sum();

    Some(MatchResult {
        candidate_user_id: candidate_user_id.to_string(),
        match_score,
        base_score,
        shared_fields,
        shared_entities,
        total_shared_items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserTaste;

    fn vector(interests: &[(&str, &[&str])]) -> TasteVector {
        TasteVector::from_taste(&UserTaste {
            interests: interests
                .iter()
                .map(|(c, items)| (c.to_string(), items.iter().map(|s| s.to_string()).collect()))
                .collect(),
            enrichment: Default::default(),
        })
    }

    #[test]
    fn test_partial_overlap_with_bonus() {
        let x = vector(&[("artist", &["Drake"]), ("movie", &["Inception"])]);
        let y = vector(&[("artist", &["drake"]), ("movie", &["Interstellar"])]);

        let result = score_candidate(&x, &y, "user_y").unwrap();

        let expected_base = 1.5 / (1.5 + 1.4);
        assert!((result.base_score - expected_base).abs() < 1e-12);
        assert!((result.base_score - 0.517).abs() < 0.001);
        assert!((result.match_score - (expected_base + 0.1)).abs() < 1e-12);
        assert!((result.match_score - 0.617).abs() < 0.001);
        assert_eq!(result.shared_fields, vec![Category::Artist]);
        assert_eq!(
            result.shared_entities.get(&Category::Artist),
            Some(&vec!["drake".to_string()])
        );
        assert_eq!(result.shared_entities.len(), 1);
        assert_eq!(result.total_shared_items, 1);
    }

    #[test]
    fn test_no_overlap_yields_none() {
        let x = vector(&[("artist", &["Drake"])]);
        let y = vector(&[("artist", &["Adele"])]);
        assert!(score_candidate(&x, &y, "user_y").is_none());
    }

    #[test]
    fn test_disjoint_categories_yield_none() {
        let x = vector(&[("artist", &["Drake"])]);
        let y = vector(&[("book", &["Dune"])]);
        assert!(score_candidate(&x, &y, "user_y").is_none());
    }

    #[test]
    fn test_categories_missing_on_one_side_do_not_dilute() {
        let x = vector(&[("tag", &["jazz"]), ("movie", &["Inception"])]);
        let y = vector(&[("tag", &["jazz"])]);

        let result = score_candidate(&x, &y, "user_y").unwrap();
        // movie absent for y, so only tag counts
        assert_eq!(result.base_score, 1.0);
        assert_eq!(result.match_score, 1.0);
        assert_eq!(result.shared_fields, vec![Category::Tag]);
    }

    #[test]
    fn test_both_empty_categories_never_shared() {
        let x = vector(&[("podcast", &["Serial"]), ("book", &[])]);
        let y = vector(&[("podcast", &["Serial"]), ("book", &[])]);

        let result = score_candidate(&x, &y, "user_y").unwrap();
        assert_eq!(result.shared_fields, vec![Category::Podcast]);
        assert!(!result.shared_entities.contains_key(&Category::Book));
        // podcast is not high-signal: no bonus, base stays 1.0
        assert_eq!(result.base_score, 1.0);
    }

    #[test]
    fn test_score_clamped_to_one() {
        let x = vector(&[
            ("artist", &["Drake"]),
            ("movie", &["Inception"]),
            ("book", &["Dune"]),
            ("brand", &["Nike"]),
        ]);
        let result = score_candidate(&x, &x.clone(), "user_y").unwrap();

        assert_eq!(result.base_score, 1.0);
        assert_eq!(result.match_score, 1.0);
        assert_eq!(result.shared_fields.len(), 4);
    }

    #[test]
    fn test_bonus_per_high_signal_category() {
        let x = vector(&[
            ("artist", &["Drake", "SZA", "Adele", "Lorde"]),
            ("book", &["Dune", "Emma", "Ulysses", "Beloved"]),
        ]);
        let y = vector(&[("artist", &["Drake"]), ("book", &["Dune"])]);

        let result = score_candidate(&x, &y, "user_y").unwrap();
        assert!((result.base_score - 0.25).abs() < 1e-12);
        assert!((result.match_score - 0.45).abs() < 1e-12);
    }

    #[test]
    fn test_shared_sample_capped() {
        let many = ["a", "b", "c", "d", "e", "f", "g"];
        let x = vector(&[("tag", &many), ("place", &["Paris"])]);
        let y = vector(&[("tag", &many), ("place", &["Paris"])]);

        let result = score_candidate(&x, &y, "user_y").unwrap();
        assert_eq!(result.shared_entities[&Category::Tag].len(), SHARED_SAMPLE_CAP);
        assert_eq!(
            result.shared_entities[&Category::Tag],
            vec!["a", "b", "c", "d", "e"]
        );
        // capped sample count, not the true overlap of 8
        assert_eq!(result.total_shared_items, 6);
    }

    #[test]
    fn test_score_always_in_unit_interval() {
        let pool = [
            vector(&[("artist", &["Drake"]), ("tag", &["rap", "soul"])]),
            vector(&[("artist", &["Drake", "Adele"]), ("movie", &["Up"])]),
            vector(&[("tag", &["soul"]), ("movie", &["Up", "Heat"]), ("brand", &["Nike"])]),
            vector(&[("brand", &["Nike"]), ("book", &["Dune"])]),
        ];

        for a in &pool {
            for b in &pool {
                if let Some(result) = score_candidate(a, b, "candidate") {
                    assert!((0.0..=1.0).contains(&result.match_score));
                    assert!((0.0..=1.0).contains(&result.base_score));
                    assert!(result.match_score >= result.base_score);
                }
            }
        }
    }
}
