use std::sync::Arc;

use super::RecipeLookup;
use crate::{
    error::AppResult,
    models::Candidate,
    services::matcher::IngredientSet,
};

/// Candidates from the external lookup
///
/// `enabled` is the service-wide switch. When it is off the aggregator never
/// schedules this source and reports the branch as disabled.
#[derive(Clone)]
pub struct ExternalSource {
    lookup: Arc<dyn RecipeLookup>,
    enabled: bool,
}

impl ExternalSource {
    pub fn new(lookup: Arc<dyn RecipeLookup>, enabled: bool) -> Self {
        Self { lookup, enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub async fn fetch(
        &self,
        user_ingredients: &IngredientSet,
        max_results: usize,
    ) -> AppResult<Vec<Candidate>> {
        if !self.enabled {
            tracing::info!(branch = "external", "External source disabled by config");
            return Ok(Vec::new());
        }

        let terms = user_ingredients.search_terms();
        let recipes = self.lookup.search(&terms, max_results).await?;
        let returned = recipes.len();

        let candidates: Vec<Candidate> = recipes
            .into_iter()
            .filter_map(|recipe| match Candidate::from_external(recipe, user_ingredients) {
                Ok(candidate) => Some(candidate),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping malformed external recipe");
                    None
                }
            })
            .take(max_results)
            .collect();

        tracing::debug!(
            lookup = self.lookup.name(),
            returned = returned,
            kept = candidates.len(),
            "External candidates scored"
        );

        Ok(candidates)
    }
}
