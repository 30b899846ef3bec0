use std::collections::BTreeSet;

/// Jaccard index of two token sets: |A ∩ B| / |A ∪ B|
///
/// Two empty sets count as full agreement (1.0). The aggregator never reaches
/// that branch because it only compares categories both users have.
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_identical_sets() {
        let a = set(&["drake", "sza", "frank ocean"]);
        assert_eq!(jaccard(&a, &a), 1.0);
    }

    #[test]
    fn test_disjoint_sets() {
        assert_eq!(jaccard(&set(&["inception"]), &set(&["interstellar"])), 0.0);
    }

    #[test]
    fn test_partial_overlap() {
        let a = set(&["a", "b", "c"]);
        let b = set(&["b", "c", "d", "e"]);
        // 2 shared out of 5 distinct
        assert!((jaccard(&a, &b) - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_symmetry() {
        let cases = [
            (set(&["a"]), set(&["a", "b"])),
            (set(&["x", "y", "z"]), set(&["y"])),
            (set(&[]), set(&["q"])),
            (set(&["m", "n"]), set(&["o", "p"])),
        ];
        for (a, b) in &cases {
            assert_eq!(jaccard(a, b), jaccard(b, a));
        }
    }

    #[test]
    fn test_both_empty_is_vacuous_agreement() {
        assert_eq!(jaccard(&set(&[]), &set(&[])), 1.0);
    }

    #[test]
    fn test_one_empty_is_zero() {
        assert_eq!(jaccard(&set(&[]), &set(&["drake"])), 0.0);
        assert_eq!(jaccard(&set(&["drake"]), &set(&[])), 0.0);
    }

    #[test]
    fn test_not_rounded() {
        let a = set(&["a", "b"]);
        let b = set(&["a", "c"]);
        assert_eq!(jaccard(&a, &b), 1.0 / 3.0);
    }
}
