use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A recipe row returned by the structured store
#[derive(Debug, Clone, PartialEq)]
pub struct LocalRecipe {
    pub id: i64,
    pub title: String,
    pub image_url: Option<String>,
    pub ingredients: Vec<String>,
    pub average_rating: Option<f64>,
    pub like_count: i64,
    pub view_count: i64,
    pub cooking_time_minutes: Option<i32>,
    pub difficulty: Option<String>,
    pub servings: Option<i32>,
    pub category: Option<String>,
    pub ai_generated: Option<bool>,
    pub created_at: Option<NaiveDateTime>,
}

impl LocalRecipe {
    /// Minimal record with only the fields the matcher and ranker care about
    pub fn new(id: i64, title: impl Into<String>, ingredients: Vec<String>) -> Self {
        Self {
            id,
            title: title.into(),
            image_url: None,
            ingredients,
            average_rating: None,
            like_count: 0,
            view_count: 0,
            cooking_time_minutes: None,
            difficulty: None,
            servings: None,
            category: None,
            ai_generated: None,
            created_at: None,
        }
    }

    pub fn with_stats(mut self, average_rating: f64, like_count: i64, view_count: i64) -> Self {
        self.average_rating = Some(average_rating);
        self.like_count = like_count;
        self.view_count = view_count;
        self
    }
}

/// A recipe returned by the external lookup
///
/// Every field is optional because the upstream source gives no guarantees;
/// missing title or url makes the record unusable as a candidate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExternalRecipe {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
}

impl ExternalRecipe {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        ingredients: Vec<String>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            title: Some(title.into()),
            url: Some(url.into()),
            image_url: None,
            ingredients,
        }
    }
}
