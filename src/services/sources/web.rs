//! External recipe lookup over HTTP
//!
//! Flow:
//! 1. Listing: `GET {api_url}/recipes/search?q=..&limit=..` returns summaries
//!    (id, title, url, image, video flag)
//! 2. Details: `GET {api_url}/recipes/{id}` per summary, fetched concurrently,
//!    returns the ingredient list
//!
//! Only a failed listing fails the lookup. A summary that does not parse, is a
//! video recipe, or whose details cannot be fetched is skipped.

use reqwest::{Client as HttpClient, IntoUrl, Url};
use serde::Deserialize;
use std::time::Duration;

use super::RecipeLookup;
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::ExternalRecipe,
};

/// Listing is over-requested so skipped items do not starve the result
const LISTING_OVERFETCH: usize = 2;

/// Trailing quantity words that carry no ingredient identity
const VAGUE_QUANTITIES: &[&str] = &["약간", "적당량", "조금", "to taste", "a little"];

#[derive(Debug, Clone, Deserialize)]
struct RecipeSummary {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    video: bool,
}

impl RecipeSummary {
    /// Upstream id, falling back to the last path segment of the url
    fn detail_id(&self) -> Option<String> {
        self.id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .or_else(|| self.url.as_deref().and_then(recipe_id_from_url))
    }
}

#[derive(Debug, Deserialize)]
struct RecipeDetail {
    #[serde(default)]
    ingredients: Vec<String>,
}

/// Last non-empty path segment of a recipe url, ignoring any query string
fn recipe_id_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .filter(|segment| !segment.contains(':'))
        .map(str::to_string)
}

/// Strips quantity annotations from a scraped ingredient name
///
/// `"양파(1개)"` becomes `"양파"`, `"소금 약간"` becomes `"소금"`.
pub fn clean_ingredient_name(raw: &str) -> Option<String> {
    let mut cleaned = raw.trim();

    if let Some(idx) = cleaned.find('(') {
        cleaned = cleaned[..idx].trim();
    }

    for word in VAGUE_QUANTITIES {
        if let Some(stripped) = cleaned.strip_suffix(word) {
            cleaned = stripped.trim_end();
            break;
        }
    }

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

#[derive(Clone)]
pub struct HttpRecipeLookup {
    http_client: HttpClient,
    api_url: String,
    api_key: Option<String>,
    cache: Cache,
    cache_ttl: u64,
    search_timeout: Duration,
    detail_timeout: Duration,
}

impl HttpRecipeLookup {
    pub fn new(
        cache: Cache,
        api_url: String,
        api_key: Option<String>,
        cache_ttl: u64,
        search_timeout: Duration,
        detail_timeout: Duration,
    ) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            cache,
            cache_ttl,
            search_timeout,
            detail_timeout,
        }
    }

    fn get(&self, url: impl IntoUrl, timeout: Duration) -> reqwest::RequestBuilder {
        let request = self.http_client.get(url).timeout(timeout);
        match &self.api_key {
            Some(key) => request.header("x-api-key", key),
            None => request,
        }
    }

    /// Detail endpoint for one recipe, with `id` escaped as a single path segment
    fn detail_url(&self, id: &str) -> AppResult<Url> {
        if matches!(id.trim(), "" | "." | "..") {
            return Err(AppError::ExternalApi(format!("Invalid recipe id '{}'", id)));
        }

        let mut url = Url::parse(&self.api_url)
            .map_err(|e| AppError::ExternalApi(format!("Invalid recipe API url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::ExternalApi("Recipe API url cannot be a base".to_string()))?
            .pop_if_empty()
            .push("recipes")
            .push(id);

        Ok(url)
    }

    async fn fetch_listing(&self, terms: &str, limit: usize) -> AppResult<Vec<RecipeSummary>> {
        let url = format!("{}/recipes/search", self.api_url);
        let requested = limit.saturating_mul(LISTING_OVERFETCH).to_string();

        let response = self
            .get(&url, self.search_timeout)
            .query(&[("q", terms), ("limit", requested.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Recipe search returned status {}: {}",
                status, body
            )));
        }

        let listing: serde_json::Value = response.json().await?;
        let results = listing["results"].as_array().ok_or_else(|| {
            AppError::ExternalApi("Invalid recipe search response format".to_string())
        })?;

        let summaries: Vec<RecipeSummary> = results
            .iter()
            .filter_map(|item| match serde_json::from_value::<RecipeSummary>(item.clone()) {
                Ok(summary) => Some(summary),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping unparseable search result");
                    None
                }
            })
            .collect();

        Ok(summaries)
    }

    async fn fetch_ingredients(&self, id: &str) -> AppResult<Vec<String>> {
        cached!(
            self.cache,
            CacheKey::RecipeIngredients(id.to_string()),
            self.cache_ttl,
            async move {
                let url = self.detail_url(id)?;
                let response = self.get(url, self.detail_timeout).send().await?;

                if !response.status().is_success() {
                    return Err(AppError::ExternalApi(format!(
                        "Recipe {} details returned status {}",
                        id,
                        response.status()
                    )));
                }

                let detail: RecipeDetail = response.json().await?;
                let ingredients: Vec<String> = detail
                    .ingredients
                    .iter()
                    .filter_map(|raw| clean_ingredient_name(raw))
                    .collect();

                Ok::<_, AppError>(ingredients)
            }
        )
    }

    async fn fetch_recipes(&self, terms: &str, limit: usize) -> AppResult<Vec<ExternalRecipe>> {
        let summaries = self.fetch_listing(terms, limit).await?;
        let listed = summaries.len();

        let mut tasks = Vec::new();
        for summary in summaries {
            if summary.video {
                tracing::debug!(title = ?summary.title, "Skipping video recipe");
                continue;
            }
            let Some(id) = summary.detail_id() else {
                tracing::debug!(title = ?summary.title, "Skipping search result without id");
                continue;
            };

            let lookup = self.clone();
            let task = tokio::spawn(async move {
                let ingredients = lookup.fetch_ingredients(&id).await;
                (id, summary, ingredients)
            });
            tasks.push(task);
        }

        let mut recipes = Vec::new();
        let mut skipped = 0usize;

        for task in tasks {
            match task.await {
                Ok((id, summary, Ok(ingredients))) if !ingredients.is_empty() => {
                    recipes.push(ExternalRecipe {
                        id: Some(id),
                        title: summary.title,
                        url: summary.url,
                        image_url: summary.image_url,
                        ingredients,
                    });
                }
                Ok((id, _, Ok(_))) => {
                    tracing::debug!(recipe_id = %id, "Skipping recipe without ingredients");
                    skipped += 1;
                }
                Ok((id, _, Err(e))) => {
                    tracing::warn!(recipe_id = %id, error = %e, "Recipe detail fetch failed");
                    skipped += 1;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Recipe detail task join error");
                    skipped += 1;
                }
            }
        }

        recipes.truncate(limit);

        tracing::info!(
            terms = %terms,
            listed = listed,
            skipped = skipped,
            results = recipes.len(),
            "External recipe search completed"
        );

        Ok(recipes)
    }
}

#[async_trait::async_trait]
impl RecipeLookup for HttpRecipeLookup {
    async fn search(&self, terms: &str, limit: usize) -> AppResult<Vec<ExternalRecipe>> {
        if terms.trim().is_empty() {
            return Ok(Vec::new());
        }

        cached!(
            self.cache,
            CacheKey::RecipeSearch {
                terms: terms.to_string(),
                limit,
            },
            self.cache_ttl,
            self.fetch_recipes(terms, limit)
        )
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
