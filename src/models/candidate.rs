use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::{ExternalRecipe, LocalRecipe};
use crate::services::matcher::{self, IngredientSet, MatchScore};

/// Which source produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Local,
    External,
}

impl Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::Local => write!(f, "local"),
            Provenance::External => write!(f, "external"),
        }
    }
}

/// Identifier of a candidate, in the id space of its source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum CandidateId {
    /// Primary key in the structured store
    Local(i64),
    /// Upstream id, or the recipe url when the upstream omitted one
    External(String),
}

impl Display for CandidateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CandidateId::Local(id) => write!(f, "{}", id),
            CandidateId::External(id) => write!(f, "{}", id),
        }
    }
}

/// A source item that cannot become a candidate
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MalformedCandidate {
    #[error("{provenance} recipe {id} has no title")]
    MissingTitle { provenance: Provenance, id: String },

    #[error("external recipe {id} has no url")]
    MissingUrl { id: String },
}

/// Fields only the structured store knows about
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalDetails {
    pub avg_rating: Option<f64>,
    pub like_count: i64,
    pub view_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooking_time_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servings: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_generated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

/// A recommendable recipe from either source, scored against the user's ingredients
///
/// Candidates are built once per request and never mutated. The match score is
/// always derived from `ingredients` at construction, so
/// `match_percentage == match_count / ingredients.len()` holds for every value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    id: CandidateId,
    title: String,
    image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_url: Option<String>,
    provenance: Provenance,
    ingredients: Vec<String>,
    match_count: usize,
    match_percentage: f64,
    #[serde(flatten)]
    local: Option<LocalDetails>,
}

impl Candidate {
    pub fn from_local(
        recipe: LocalRecipe,
        user_ingredients: &IngredientSet,
    ) -> Result<Self, MalformedCandidate> {
        let title = recipe.title.trim();
        if title.is_empty() {
            return Err(MalformedCandidate::MissingTitle {
                provenance: Provenance::Local,
                id: recipe.id.to_string(),
            });
        }

        let ingredients = IngredientSet::from_names(&recipe.ingredients);
        let MatchScore { count, percentage } = matcher::match_rate(&ingredients, user_ingredients);

        Ok(Self {
            id: CandidateId::Local(recipe.id),
            title: title.to_string(),
            image_url: recipe.image_url,
            external_url: None,
            provenance: Provenance::Local,
            ingredients: ingredients.into_vec(),
            match_count: count,
            match_percentage: percentage,
            local: Some(LocalDetails {
                avg_rating: recipe.average_rating,
                like_count: recipe.like_count,
                view_count: recipe.view_count,
                cooking_time_minutes: recipe.cooking_time_minutes,
                difficulty: recipe.difficulty,
                servings: recipe.servings,
                category: recipe.category,
                ai_generated: recipe.ai_generated,
                created_at: recipe.created_at,
            }),
        })
    }

    pub fn from_external(
        recipe: ExternalRecipe,
        user_ingredients: &IngredientSet,
    ) -> Result<Self, MalformedCandidate> {
        let url = recipe
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| MalformedCandidate::MissingUrl {
                id: recipe.id.clone().unwrap_or_default(),
            })?;

        let title = match recipe.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => {
                return Err(MalformedCandidate::MissingTitle {
                    provenance: Provenance::External,
                    id: recipe.id.unwrap_or_else(|| url.clone()),
                })
            }
        };

        let id = recipe
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| url.clone());

        let ingredients = IngredientSet::from_names(&recipe.ingredients);
        let MatchScore { count, percentage } = matcher::match_rate(&ingredients, user_ingredients);

        Ok(Self {
            id: CandidateId::External(id),
            title,
            image_url: recipe.image_url,
            external_url: Some(url),
            provenance: Provenance::External,
            ingredients: ingredients.into_vec(),
            match_count: count,
            match_percentage: percentage,
            local: None,
        })
    }

    pub fn id(&self) -> &CandidateId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn external_url(&self) -> Option<&str> {
        self.external_url.as_deref()
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn is_local(&self) -> bool {
        self.provenance == Provenance::Local
    }

    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }

    pub fn match_count(&self) -> usize {
        self.match_count
    }

    pub fn match_percentage(&self) -> f64 {
        self.match_percentage
    }

    pub fn local_details(&self) -> Option<&LocalDetails> {
        self.local.as_ref()
    }

    /// Average rating, or 0 when the candidate carries none
    pub fn avg_rating(&self) -> f64 {
        self.local.as_ref().and_then(|l| l.avg_rating).unwrap_or(0.0)
    }

    /// Like count, or 0 when the candidate carries none
    pub fn like_count(&self) -> i64 {
        self.local.as_ref().map_or(0, |l| l.like_count)
    }

    /// View count, or 0 when the candidate carries none
    pub fn view_count(&self) -> i64 {
        self.local.as_ref().map_or(0, |l| l.view_count)
    }
}
