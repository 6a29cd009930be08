use std::sync::Arc;

use super::RecipeStore;
use crate::{
    error::AppResult,
    models::Candidate,
    services::{matcher::IngredientSet, ranking},
};

/// Candidates from the structured store
///
/// Scores every returned recipe, then keeps the best-rated `max_results` so a
/// store that over-returns never leaves an arbitrary subset.
#[derive(Clone)]
pub struct LocalSource {
    store: Arc<dyn RecipeStore>,
}

impl LocalSource {
    pub fn new(store: Arc<dyn RecipeStore>) -> Self {
        Self { store }
    }

    pub async fn fetch(
        &self,
        user_ingredients: &IngredientSet,
        max_results: usize,
    ) -> AppResult<Vec<Candidate>> {
        let names: Vec<String> = user_ingredients.iter().map(str::to_string).collect();
        let recipes = self.store.find_by_ingredients(&names, max_results).await?;
        let returned = recipes.len();

        let mut candidates: Vec<Candidate> = recipes
            .into_iter()
            .filter_map(|recipe| match Candidate::from_local(recipe, user_ingredients) {
                Ok(candidate) => Some(candidate),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping malformed local recipe");
                    None
                }
            })
            .collect();

        candidates.sort_by(ranking::by_quality);
        candidates.truncate(max_results);

        tracing::debug!(
            returned = returned,
            kept = candidates.len(),
            "Local candidates scored"
        );

        Ok(candidates)
    }
}
