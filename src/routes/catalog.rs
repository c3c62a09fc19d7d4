//! Public plan catalog

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::response::DataResponse;
use crate::app::AppState;
use crate::domain::catalog::{CatalogFilter, CatalogParams, CatalogPlan, CatalogResponse};
use crate::error::ApiError;

/// GET /plans
///
/// Query: `search`, `min_price`, `max_price`, `category` (or `ALL`), `sort`.
pub async fn browse_plans(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CatalogParams>,
) -> Result<Json<CatalogResponse>, ApiError> {
    let filter = CatalogFilter::from_params(&params).map_err(ApiError::bad_request)?;

    let plans = state
        .catalog
        .browse(&filter, params.sort)
        .await
        .map_err(ApiError::access_failure("Plan not found", "Failed to load plans"))?;

    Ok(Json(CatalogResponse::new(plans)))
}

/// GET /plans/featured
pub async fn featured_plans(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataResponse<Vec<CatalogPlan>>>, ApiError> {
    let plans = state
        .catalog
        .featured()
        .await
        .map_err(ApiError::access_failure(
            "Plan not found",
            "Failed to load featured plans",
        ))?;

    Ok(Json(DataResponse::new(
        plans.into_iter().map(CatalogPlan::from).collect(),
    )))
}
