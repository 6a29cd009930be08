use std::cmp::Ordering;

use crate::models::{Candidate, Provenance, Strategy};

/// Quality ordering: rating, then likes, then views, all descending
///
/// Candidates without stats count as zero on every key.
pub fn by_quality(a: &Candidate, b: &Candidate) -> Ordering {
    b.avg_rating()
        .total_cmp(&a.avg_rating())
        .then_with(|| b.like_count().cmp(&a.like_count()))
        .then_with(|| b.view_count().cmp(&a.view_count()))
}

/// Match rate descending
pub fn by_match(a: &Candidate, b: &Candidate) -> Ordering {
    b.match_percentage().total_cmp(&a.match_percentage())
}

/// Single ordering over both sources: match rate, then quality, then Local
/// before External
pub fn by_mixed(a: &Candidate, b: &Candidate) -> Ordering {
    by_match(a, b)
        .then_with(|| by_quality(a, b))
        .then_with(|| provenance_rank(a).cmp(&provenance_rank(b)))
}

fn provenance_rank(candidate: &Candidate) -> u8 {
    match candidate.provenance() {
        Provenance::Local => 0,
        Provenance::External => 1,
    }
}

/// Orders filtered, deduplicated candidates under `strategy`
///
/// All sorts are stable, so exact ties keep their input order.
pub fn rank(candidates: Vec<Candidate>, strategy: Strategy) -> Vec<Candidate> {
    match strategy {
        Strategy::Mixed => {
            let mut all = candidates;
            all.sort_by(by_mixed);
            all
        }
        Strategy::LocalFirst | Strategy::ExternalFirst => {
            let (mut local, mut external): (Vec<_>, Vec<_>) =
                candidates.into_iter().partition(Candidate::is_local);
            local.sort_by(by_quality);
            external.sort_by(by_match);

            if strategy == Strategy::LocalFirst {
                local.extend(external);
                local
            } else {
                external.extend(local);
                external
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExternalRecipe, LocalRecipe};
    use crate::services::matcher::IngredientSet;

    fn user() -> IngredientSet {
        IngredientSet::from_names(["egg", "milk"])
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn local(id: i64, ingredients: &[&str], rating: f64, likes: i64, views: i64) -> Candidate {
        let recipe = LocalRecipe::new(id, format!("Local {}", id), names(ingredients))
            .with_stats(rating, likes, views);
        Candidate::from_local(recipe, &user()).unwrap()
    }

    fn external(id: &str, ingredients: &[&str]) -> Candidate {
        let recipe = ExternalRecipe::new(
            id,
            format!("External {}", id),
            format!("https://r.example/{}", id),
            names(ingredients),
        );
        Candidate::from_external(recipe, &user()).unwrap()
    }

    fn titles(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(Candidate::title).collect()
    }

    #[test]
    fn test_local_first_blocks() {
        let input = vec![
            external("a", &["egg", "flour"]),
            local(1, &["egg"], 3.0, 0, 0),
            external("b", &["egg"]),
            local(2, &["egg", "sugar"], 4.5, 0, 0),
        ];

        let ranked = rank(input, Strategy::LocalFirst);
        assert_eq!(
            titles(&ranked),
            vec!["Local 2", "Local 1", "External b", "External a"]
        );
    }

    #[test]
    fn test_external_first_blocks() {
        let input = vec![
            local(1, &["egg"], 3.0, 0, 0),
            external("a", &["egg", "flour"]),
            local(2, &["egg"], 3.0, 7, 0),
            external("b", &["egg"]),
        ];

        let ranked = rank(input, Strategy::ExternalFirst);
        assert_eq!(
            titles(&ranked),
            vec!["External b", "External a", "Local 2", "Local 1"]
        );
    }

    #[test]
    fn test_mixed_primary_key_is_match_rate() {
        let input = vec![
            local(1, &["egg", "milk", "sugar"], 4.5, 0, 0),
            local(2, &["egg"], 3.0, 0, 0),
        ];

        let ranked = rank(input, Strategy::Mixed);
        assert_eq!(titles(&ranked), vec!["Local 2", "Local 1"]);
    }

    #[test]
    fn test_mixed_tie_breaks() {
        let input = vec![
            external("x", &["egg"]),
            local(1, &["egg"], 0.0, 0, 0),
            local(2, &["egg"], 4.0, 1, 1),
            local(3, &["egg"], 4.0, 1, 9),
            local(4, &["egg"], 4.0, 5, 0),
        ];

        let ranked = rank(input, Strategy::Mixed);
        // Zero-stat local ties with the external candidate and wins on provenance
        assert_eq!(
            titles(&ranked),
            vec!["Local 4", "Local 3", "Local 2", "Local 1", "External x"]
        );
    }

    #[test]
    fn test_mixed_adjacent_pairs_are_ordered() {
        let input = vec![
            external("a", &["egg", "tofu", "leek"]),
            local(1, &["milk", "oats"], 4.2, 3, 3),
            external("b", &["egg", "milk"]),
            local(2, &["egg", "milk", "butter", "flour"], 4.9, 40, 900),
            local(3, &["egg"], 1.0, 0, 0),
        ];

        let ranked = rank(input, Strategy::Mixed);
        for pair in ranked.windows(2) {
            assert_ne!(by_mixed(&pair[0], &pair[1]), Ordering::Greater);
            assert!(pair[0].match_percentage() >= pair[1].match_percentage());
        }
    }

    #[test]
    fn test_rank_empty() {
        assert!(rank(Vec::new(), Strategy::LocalFirst).is_empty());
        assert!(rank(Vec::new(), Strategy::Mixed).is_empty());
    }
}
