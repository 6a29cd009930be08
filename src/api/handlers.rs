use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};

use super::AppState;
use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{Candidate, RecommendationOptions, RecommendationPayload, RecommendationRequest},
    services::recommendations,
};

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Recommends recipes for the ingredients in the request body
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<RecommendationPayload>, JsonRejection>,
) -> AppResult<Json<Vec<Candidate>>> {
    let Json(payload) = payload?;
    let request = RecommendationRequest::try_from(payload)?;

    tracing::info!(
        request_id = %request_id,
        ingredients = request.user_ingredients.len(),
        "Processing recommendation request"
    );

    let candidates = recommendations::recommend(&state.aggregator, &request).await?;

    tracing::info!(
        request_id = %request_id,
        results = candidates.len(),
        "Recommendation request completed"
    );

    Ok(Json(candidates))
}

/// Recommends recipes for the ingredients a user currently holds
pub async fn recommend_for_user(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    user_id: Result<Path<i64>, PathRejection>,
    options: Result<Query<RecommendationOptions>, QueryRejection>,
) -> AppResult<Json<Vec<Candidate>>> {
    let Path(user_id) = user_id?;
    let Query(options) = options?;

    tracing::info!(
        request_id = %request_id,
        user_id = user_id,
        "Processing inventory recommendation request"
    );

    let candidates = recommendations::recommend_for_user(
        &state.aggregator,
        state.inventory.clone(),
        user_id,
        options,
    )
    .await?;

    tracing::info!(
        request_id = %request_id,
        results = candidates.len(),
        "Inventory recommendation request completed"
    );

    Ok(Json(candidates))
}
