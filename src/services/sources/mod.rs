//! Candidate sources and the collaborators behind them
//!
//! The recommendation core only talks to the outside world through the three
//! traits below. Concrete implementations live next to them: Postgres for the
//! structured store and inventory, an HTTP client for the external lookup.

use crate::{
    error::AppResult,
    models::{ExternalRecipe, LocalRecipe},
};

pub mod external;
pub mod local;
pub mod postgres;
pub mod web;

pub use external::ExternalSource;
pub use local::LocalSource;

/// Structured recipe store
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecipeStore: Send + Sync {
    /// Recipes sharing at least one ingredient with `ingredients`
    ///
    /// `ingredients` are already normalized. `limit` is a hint; callers cap
    /// the result themselves.
    async fn find_by_ingredients(
        &self,
        ingredients: &[String],
        limit: usize,
    ) -> AppResult<Vec<LocalRecipe>>;
}

/// Best-effort external recipe search
///
/// Implementations skip individual items they cannot extract and only return
/// an error when the search as a whole fails. No latency guarantee.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecipeLookup: Send + Sync {
    async fn search(&self, terms: &str, limit: usize) -> AppResult<Vec<ExternalRecipe>>;

    /// Lookup name for logging
    fn name(&self) -> &'static str;
}

/// Ingredients a user currently holds
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait InventoryLookup: Send + Sync {
    async fn ingredients_for_user(&self, user_id: i64) -> AppResult<Vec<String>>;
}
