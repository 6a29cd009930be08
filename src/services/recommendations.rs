use std::sync::Arc;
use std::time::Instant;

use crate::{
    error::AppResult,
    models::{Candidate, RecommendationOptions, RecommendationRequest},
    services::{
        aggregator::Aggregator,
        dedup,
        ranking,
        sources::InventoryLookup,
    },
};

/// Drops every candidate whose match rate is below `min_match_rate`
pub fn filter_by_match_rate(candidates: Vec<Candidate>, min_match_rate: f64) -> Vec<Candidate> {
    candidates
        .into_iter()
        .filter(|c| c.match_percentage() >= min_match_rate)
        .collect()
}

/// Filter, deduplicate and rank an already-joined candidate list
///
/// `candidates` must list Local candidates before External ones so dedup
/// resolves chained collisions in favour of the earliest Local entry.
pub fn finalize(candidates: Vec<Candidate>, request: &RecommendationRequest) -> Vec<Candidate> {
    let joined = candidates.len();
    let filtered = filter_by_match_rate(candidates, request.min_match_rate);
    let after_filter = filtered.len();
    let unique = dedup::deduplicate(filtered);
    let after_dedup = unique.len();
    let ranked = ranking::rank(unique, request.strategy);

    tracing::info!(
        joined = joined,
        after_filter = after_filter,
        after_dedup = after_dedup,
        min_match_rate = request.min_match_rate,
        strategy = %request.strategy,
        "Candidates finalized"
    );

    ranked
}

/// Recommends recipes for an explicit ingredient list
pub async fn recommend(
    aggregator: &Aggregator,
    request: &RecommendationRequest,
) -> AppResult<Vec<Candidate>> {
    request.validate()?;

    let start = Instant::now();
    tracing::info!(
        ingredients = request.user_ingredients.len(),
        strategy = %request.strategy,
        enable_external = request.enable_external,
        "Starting recommendation"
    );

    let aggregate = aggregator.aggregate(request).await;
    let recommendations = finalize(aggregate.into_candidates(), request);

    tracing::info!(
        results = recommendations.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Recommendation completed"
    );

    Ok(recommendations)
}

/// Recommends recipes for whatever the user currently has in stock
///
/// An empty inventory is not an error: the user simply gets no recommendations.
pub async fn recommend_for_user(
    aggregator: &Aggregator,
    inventory: Arc<dyn InventoryLookup>,
    user_id: i64,
    options: RecommendationOptions,
) -> AppResult<Vec<Candidate>> {
    let ingredients = inventory.ingredients_for_user(user_id).await?;

    if ingredients.iter().all(|name| name.trim().is_empty()) {
        tracing::info!(user_id = user_id, "User has no inventory items");
        return Ok(Vec::new());
    }

    let request = RecommendationRequest::from_parts(ingredients, options)?;
    recommend(aggregator, &request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{ExternalRecipe, LocalRecipe, Provenance, Strategy};
    use crate::services::matcher::IngredientSet;
    use crate::services::sources::{
        ExternalSource, LocalSource, MockInventoryLookup, MockRecipeLookup, MockRecipeStore,
    };
    use std::time::Duration;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn scenario_store() -> MockRecipeStore {
        let mut store = MockRecipeStore::new();
        store.expect_find_by_ingredients().returning(|_, _| {
            Ok(vec![
                LocalRecipe::new(1, "Egg Pudding", names(&["egg", "milk", "sugar"]))
                    .with_stats(4.5, 0, 0),
                LocalRecipe::new(2, "Fried Egg", names(&["egg"])).with_stats(3.0, 0, 0),
            ])
        });
        store
    }

    fn scenario_lookup() -> MockRecipeLookup {
        let mut lookup = MockRecipeLookup::new();
        lookup.expect_search().returning(|_, _| {
            Ok(vec![ExternalRecipe::new(
                "c",
                "Egg Pudding Classic",
                "https://r.example/c",
                names(&["egg", "milk"]),
            )])
        });
        lookup.expect_name().return_const("mock");
        lookup
    }

    fn aggregator(store: MockRecipeStore, lookup: MockRecipeLookup) -> Aggregator {
        Aggregator::new(
            LocalSource::new(Arc::new(store)),
            ExternalSource::new(Arc::new(lookup), true),
            Duration::from_millis(500),
            Duration::from_millis(500),
        )
    }

    #[tokio::test]
    async fn test_egg_milk_scenario() {
        let aggregator = aggregator(scenario_store(), scenario_lookup());

        let mut request = RecommendationRequest::new(["egg", "milk"]);
        request.min_match_rate = 0.5;

        let aggregate = aggregator.aggregate(&request).await;
        let scores: Vec<f64> = aggregate
            .local
            .candidates()
            .iter()
            .chain(aggregate.external.candidates())
            .map(|c| (c.match_percentage() * 1000.0).round() / 1000.0)
            .collect();
        assert_eq!(scores, vec![0.667, 1.0, 1.0]);

        let result = recommend(&aggregator, &request).await.unwrap();
        let titles: Vec<_> = result.iter().map(Candidate::title).collect();
        assert_eq!(titles, vec!["Fried Egg", "Egg Pudding"]);
        assert!(result.iter().all(|c| c.provenance() == Provenance::Local));
    }

    #[tokio::test]
    async fn test_results_respect_min_match_rate() {
        let aggregator = aggregator(scenario_store(), scenario_lookup());

        let mut request = RecommendationRequest::new(["egg", "milk"]);
        request.min_match_rate = 0.9;

        let result = recommend(&aggregator, &request).await.unwrap();
        assert!(!result.is_empty());
        for candidate in &result {
            assert!(candidate.match_percentage() >= 0.9);
            assert!(candidate.match_percentage() <= 1.0);
        }
    }

    #[tokio::test]
    async fn test_identical_requests_give_identical_output() {
        let aggregator = aggregator(scenario_store(), scenario_lookup());
        let request = RecommendationRequest::new(["milk", "egg"]);

        let first = recommend(&aggregator, &request).await.unwrap();
        let second = recommend(&aggregator, &request).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_external_disabled_yields_no_external_candidates() {
        let mut store = MockRecipeStore::new();
        store
            .expect_find_by_ingredients()
            .returning(|_, _| Ok(vec![LocalRecipe::new(1, "Latte", names(&["milk"]))]));

        let mut lookup = MockRecipeLookup::new();
        lookup.expect_search().times(0);

        let aggregator = aggregator(store, lookup);
        let mut request = RecommendationRequest::new(["milk"]);
        request.enable_external = false;

        let result = recommend(&aggregator, &request).await.unwrap();
        assert_eq!(result.len(), 1);
        assert!(result.iter().all(|c| c.provenance() == Provenance::Local));
    }

    #[tokio::test]
    async fn test_invalid_request_rejected_before_aggregation() {
        let mut store = MockRecipeStore::new();
        store.expect_find_by_ingredients().times(0);
        let mut lookup = MockRecipeLookup::new();
        lookup.expect_search().times(0);

        let aggregator = aggregator(store, lookup);
        let mut request = RecommendationRequest::new(["egg"]);
        request.min_match_rate = 2.0;

        let err = recommend(&aggregator, &request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_filter_excludes_empty_ingredient_candidates() {
        let user = IngredientSet::from_names(["egg"]);
        let empty = Candidate::from_local(LocalRecipe::new(1, "Water", vec![]), &user).unwrap();
        let full = Candidate::from_local(LocalRecipe::new(2, "Egg", names(&["egg"])), &user).unwrap();

        let kept = filter_by_match_rate(vec![empty.clone(), full.clone()], 0.01);
        assert_eq!(kept, vec![full.clone()]);

        let kept = filter_by_match_rate(vec![empty, full], 0.0);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_filter_runs_before_dedup() {
        let user = IngredientSet::from_names(["kimchi", "pork"]);
        let weak_local = Candidate::from_local(
            LocalRecipe::new(1, "Kimchi Stew", names(&["kimchi", "tofu", "leek", "anchovy"])),
            &user,
        )
        .unwrap();
        let strong_external = Candidate::from_external(
            ExternalRecipe::new("e", "Kimchi Stew Deluxe", "https://r.example/e", names(&["kimchi", "pork"])),
            &user,
        )
        .unwrap();

        let mut request = RecommendationRequest::new(["kimchi", "pork"]);
        request.min_match_rate = 0.5;
        request.strategy = Strategy::Mixed;

        let result = finalize(vec![weak_local, strong_external], &request);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].provenance(), Provenance::External);
    }

    #[tokio::test]
    async fn test_empty_inventory_returns_empty_list() {
        let mut inventory = MockInventoryLookup::new();
        inventory
            .expect_ingredients_for_user()
            .withf(|user_id: &i64| *user_id == 42)
            .returning(|_| Ok(vec![]));

        let mut store = MockRecipeStore::new();
        store.expect_find_by_ingredients().times(0);
        let aggregator = aggregator(store, MockRecipeLookup::new());

        let result = recommend_for_user(
            &aggregator,
            Arc::new(inventory),
            42,
            RecommendationOptions::default(),
        )
        .await
        .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_inventory_drives_recommendation() {
        let mut inventory = MockInventoryLookup::new();
        inventory
            .expect_ingredients_for_user()
            .returning(|_| Ok(vec!["Egg".to_string(), "Milk".to_string()]));

        let aggregator = aggregator(scenario_store(), scenario_lookup());
        let options = RecommendationOptions {
            strategy: Some("LOCAL_FIRST".to_string()),
            ..Default::default()
        };

        let result = recommend_for_user(&aggregator, Arc::new(inventory), 7, options)
            .await
            .unwrap();
        let titles: Vec<_> = result.iter().map(Candidate::title).collect();
        assert_eq!(titles, vec!["Egg Pudding", "Fried Egg"]);
    }
}
