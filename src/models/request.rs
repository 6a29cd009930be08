use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::{
    error::{AppError, AppResult},
    services::matcher::IngredientSet,
};

pub const DEFAULT_MAX_LOCAL_RESULTS: usize = 10;
pub const DEFAULT_MAX_EXTERNAL_RESULTS: usize = 5;
/// Upper bound for either result cap; the external lookup fans out one detail
/// request per listed item
pub const MAX_RESULTS_LIMIT: usize = 50;

/// Ranking policy applied to the merged list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Local block (by quality) followed by External block (by match rate)
    LocalFirst,
    /// External block followed by Local block
    ExternalFirst,
    /// One ordering over everything, match rate first
    #[default]
    Mixed,
}

impl FromStr for Strategy {
    type Err = AppError;

    /// Accepts `local_first`, `LOCAL_FIRST` and `LocalFirst` spellings.
    /// `crawled_first` is kept as an alias of `external_first`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "localfirst" => Ok(Strategy::LocalFirst),
            "externalfirst" | "crawledfirst" => Ok(Strategy::ExternalFirst),
            "mixed" => Ok(Strategy::Mixed),
            _ => Err(AppError::Validation(format!("Unknown strategy '{}'", s))),
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::LocalFirst => write!(f, "local_first"),
            Strategy::ExternalFirst => write!(f, "external_first"),
            Strategy::Mixed => write!(f, "mixed"),
        }
    }
}

/// Tuning knobs shared by both recommendation endpoints
///
/// Everything is optional on the wire; `strategy` stays a string so an
/// unknown value surfaces as a validation error rather than a body rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationOptions {
    pub max_local_results: Option<usize>,
    pub max_external_results: Option<usize>,
    pub enable_external: Option<bool>,
    pub strategy: Option<String>,
    pub min_match_rate: Option<f64>,
}

/// Body of `POST /api/v1/recommendations`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationPayload {
    #[serde(alias = "userIngredients")]
    pub ingredients: Vec<String>,
    #[serde(flatten)]
    pub options: RecommendationOptions,
}

/// A validated recommendation request
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRequest {
    pub user_ingredients: IngredientSet,
    pub max_local_results: usize,
    pub max_external_results: usize,
    pub enable_external: bool,
    pub strategy: Strategy,
    pub min_match_rate: f64,
}

impl RecommendationRequest {
    /// Request with default options for the given ingredients
    pub fn new<I, S>(ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            user_ingredients: IngredientSet::from_names(ingredients),
            max_local_results: DEFAULT_MAX_LOCAL_RESULTS,
            max_external_results: DEFAULT_MAX_EXTERNAL_RESULTS,
            enable_external: true,
            strategy: Strategy::default(),
            min_match_rate: 0.0,
        }
    }

    /// Validates wire options against a set of ingredient names
    pub fn from_parts<I, S>(ingredients: I, options: RecommendationOptions) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let strategy = match options.strategy.as_deref() {
            Some(raw) => raw.parse()?,
            None => Strategy::default(),
        };

        let request = Self {
            user_ingredients: IngredientSet::from_names(ingredients),
            max_local_results: options.max_local_results.unwrap_or(DEFAULT_MAX_LOCAL_RESULTS),
            max_external_results: options
                .max_external_results
                .unwrap_or(DEFAULT_MAX_EXTERNAL_RESULTS),
            enable_external: options.enable_external.unwrap_or(true),
            strategy,
            min_match_rate: options.min_match_rate.unwrap_or(0.0),
        };

        request.validate()?;
        Ok(request)
    }

    /// Rejects requests that must never reach aggregation
    pub fn validate(&self) -> AppResult<()> {
        if self.user_ingredients.is_empty() {
            return Err(AppError::Validation(
                "At least one ingredient is required".to_string(),
            ));
        }

        if !self.min_match_rate.is_finite() || !(0.0..=1.0).contains(&self.min_match_rate) {
            return Err(AppError::Validation(format!(
                "minMatchRate must be within [0, 1], got {}",
                self.min_match_rate
            )));
        }

        if !(1..=MAX_RESULTS_LIMIT).contains(&self.max_local_results) {
            return Err(AppError::Validation(format!(
                "maxLocalResults must be within [1, {}], got {}",
                MAX_RESULTS_LIMIT, self.max_local_results
            )));
        }

        if !(1..=MAX_RESULTS_LIMIT).contains(&self.max_external_results) {
            return Err(AppError::Validation(format!(
                "maxExternalResults must be within [1, {}], got {}",
                MAX_RESULTS_LIMIT, self.max_external_results
            )));
        }

        Ok(())
    }
}

impl TryFrom<RecommendationPayload> for RecommendationRequest {
    type Error = AppError;

    fn try_from(payload: RecommendationPayload) -> AppResult<Self> {
        Self::from_parts(payload.ingredients, payload.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn options() -> RecommendationOptions {
        RecommendationOptions::default()
    }

    #[test]
    fn test_defaults() {
        let request = assert_ok!(RecommendationRequest::from_parts(["egg"], options()));
        assert_eq!(request.max_local_results, 10);
        assert_eq!(request.max_external_results, 5);
        assert!(request.enable_external);
        assert_eq!(request.strategy, Strategy::Mixed);
        assert_eq!(request.min_match_rate, 0.0);
        assert_eq!(request, RecommendationRequest::new(["egg"]));
    }

    #[test]
    fn test_strategy_spellings() {
        assert_eq!("LOCAL_FIRST".parse::<Strategy>().unwrap(), Strategy::LocalFirst);
        assert_eq!("local_first".parse::<Strategy>().unwrap(), Strategy::LocalFirst);
        assert_eq!("ExternalFirst".parse::<Strategy>().unwrap(), Strategy::ExternalFirst);
        assert_eq!("CRAWLED_FIRST".parse::<Strategy>().unwrap(), Strategy::ExternalFirst);
        assert_eq!(" mixed ".parse::<Strategy>().unwrap(), Strategy::Mixed);
    }

    #[test]
    fn test_unknown_strategy_is_validation_error() {
        let opts = RecommendationOptions {
            strategy: Some("random".to_string()),
            ..options()
        };
        let err = assert_err!(RecommendationRequest::from_parts(["egg"], opts));
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_blank_ingredients_rejected() {
        let err = assert_err!(RecommendationRequest::from_parts(["  ", ""], options()));
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_min_match_rate_bounds() {
        for rate in [-0.1, 1.5, f64::NAN] {
            let opts = RecommendationOptions {
                min_match_rate: Some(rate),
                ..options()
            };
            assert_err!(RecommendationRequest::from_parts(["egg"], opts));
        }

        let opts = RecommendationOptions {
            min_match_rate: Some(1.0),
            ..options()
        };
        assert_ok!(RecommendationRequest::from_parts(["egg"], opts));
    }

    #[test]
    fn test_zero_caps_rejected() {
        let opts = RecommendationOptions {
            max_local_results: Some(0),
            ..options()
        };
        assert_err!(RecommendationRequest::from_parts(["egg"], opts));

        let opts = RecommendationOptions {
            max_external_results: Some(0),
            ..options()
        };
        assert_err!(RecommendationRequest::from_parts(["egg"], opts));
    }

    #[test]
    fn test_caps_bounded_above() {
        let opts = RecommendationOptions {
            max_external_results: Some(MAX_RESULTS_LIMIT + 1),
            ..options()
        };
        let err = assert_err!(RecommendationRequest::from_parts(["egg"], opts));
        assert!(matches!(err, AppError::Validation(_)));

        let opts = RecommendationOptions {
            max_local_results: Some(usize::MAX),
            ..options()
        };
        assert_err!(RecommendationRequest::from_parts(["egg"], opts));

        let opts = RecommendationOptions {
            max_local_results: Some(MAX_RESULTS_LIMIT),
            max_external_results: Some(MAX_RESULTS_LIMIT),
            ..options()
        };
        assert_ok!(RecommendationRequest::from_parts(["egg"], opts));
    }

    #[test]
    fn test_payload_deserialization() {
        let json = r#"{
            "ingredients": ["Egg", "egg", "Milk"],
            "maxLocalResults": 3,
            "enableExternal": false,
            "strategy": "LOCAL_FIRST",
            "minMatchRate": 0.5
        }"#;

        let payload: RecommendationPayload = serde_json::from_str(json).unwrap();
        let request = RecommendationRequest::try_from(payload).unwrap();
        assert_eq!(request.user_ingredients.len(), 2);
        assert_eq!(request.max_local_results, 3);
        assert_eq!(request.max_external_results, 5);
        assert!(!request.enable_external);
        assert_eq!(request.strategy, Strategy::LocalFirst);
        assert_eq!(request.min_match_rate, 0.5);
    }
}
