use chrono::NaiveDateTime;
use sqlx::PgPool;

use super::{InventoryLookup, RecipeStore};
use crate::{error::AppResult, models::LocalRecipe};

/// Recipes sharing at least one ingredient with the input, best-rated first
const FIND_BY_INGREDIENTS: &str = r#"
    SELECT
        r.recipe_id,
        r.title,
        r.main_image_url,
        r.average_rating::float8 AS average_rating,
        COALESCE(r.like_count, 0)::int8 AS like_count,
        COALESCE(r.view_count, 0)::int8 AS view_count,
        r.cooking_time,
        r.difficulty::text AS difficulty,
        r.servings,
        r.category,
        r.is_ai_generated,
        r.created_at,
        ARRAY(
            SELECT ri.ingredient_name
            FROM recipe_ingredients ri
            WHERE ri.recipe_id = r.recipe_id
        ) AS ingredients
    FROM recipes r
    WHERE EXISTS (
        SELECT 1
        FROM recipe_ingredients ri
        WHERE ri.recipe_id = r.recipe_id
          AND LOWER(TRIM(ri.ingredient_name)) = ANY($1)
    )
    ORDER BY r.average_rating DESC NULLS LAST, like_count DESC, view_count DESC
    LIMIT $2
"#;

const INGREDIENTS_FOR_USER: &str = r#"
    SELECT ingredient_name
    FROM refrigerator_items
    WHERE user_id = $1
    ORDER BY expiration_date ASC NULLS LAST
"#;

#[derive(Debug, sqlx::FromRow)]
struct RecipeRow {
    recipe_id: i64,
    title: Option<String>,
    main_image_url: Option<String>,
    average_rating: Option<f64>,
    like_count: i64,
    view_count: i64,
    cooking_time: Option<i32>,
    difficulty: Option<String>,
    servings: Option<i32>,
    category: Option<String>,
    is_ai_generated: Option<bool>,
    created_at: Option<NaiveDateTime>,
    ingredients: Vec<String>,
}

impl From<RecipeRow> for LocalRecipe {
    fn from(row: RecipeRow) -> Self {
        LocalRecipe {
            id: row.recipe_id,
            // Blank titles are rejected later as malformed candidates
            title: row.title.unwrap_or_default(),
            image_url: row.main_image_url,
            ingredients: row.ingredients,
            average_rating: row.average_rating,
            like_count: row.like_count,
            view_count: row.view_count,
            cooking_time_minutes: row.cooking_time,
            difficulty: row.difficulty,
            servings: row.servings,
            category: row.category,
            ai_generated: row.is_ai_generated,
            created_at: row.created_at,
        }
    }
}

/// Structured store backed by the `recipes` and `recipe_ingredients` tables
#[derive(Clone)]
pub struct PgRecipeStore {
    pool: PgPool,
}

impl PgRecipeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RecipeStore for PgRecipeStore {
    async fn find_by_ingredients(
        &self,
        ingredients: &[String],
        limit: usize,
    ) -> AppResult<Vec<LocalRecipe>> {
        if ingredients.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<RecipeRow> = sqlx::query_as(FIND_BY_INGREDIENTS)
            .bind(ingredients)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(rows = rows.len(), "Local store query completed");

        Ok(rows.into_iter().map(LocalRecipe::from).collect())
    }
}

/// Inventory backed by the `refrigerator_items` table
#[derive(Clone)]
pub struct PgInventory {
    pool: PgPool,
}

impl PgInventory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl InventoryLookup for PgInventory {
    async fn ingredients_for_user(&self, user_id: i64) -> AppResult<Vec<String>> {
        let names: Vec<String> = sqlx::query_scalar(INGREDIENTS_FOR_USER)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_conversion_keeps_stats_and_details() {
        let row = RecipeRow {
            recipe_id: 12,
            title: Some("Gyeran-jjim".to_string()),
            main_image_url: Some("https://img.example/12.jpg".to_string()),
            average_rating: Some(4.25),
            like_count: 30,
            view_count: 1200,
            cooking_time: Some(15),
            difficulty: Some("EASY".to_string()),
            servings: Some(2),
            category: Some("side".to_string()),
            is_ai_generated: Some(false),
            created_at: None,
            ingredients: vec!["egg".to_string(), "scallion".to_string()],
        };

        let recipe = LocalRecipe::from(row);
        assert_eq!(recipe.id, 12);
        assert_eq!(recipe.title, "Gyeran-jjim");
        assert_eq!(recipe.average_rating, Some(4.25));
        assert_eq!(recipe.like_count, 30);
        assert_eq!(recipe.cooking_time_minutes, Some(15));
        assert_eq!(recipe.ingredients.len(), 2);
    }

    #[test]
    fn test_missing_title_becomes_blank() {
        let row = RecipeRow {
            recipe_id: 1,
            title: None,
            main_image_url: None,
            average_rating: None,
            like_count: 0,
            view_count: 0,
            cooking_time: None,
            difficulty: None,
            servings: None,
            category: None,
            is_ai_generated: None,
            created_at: None,
            ingredients: vec![],
        };

        assert_eq!(LocalRecipe::from(row).title, "");
    }
}
