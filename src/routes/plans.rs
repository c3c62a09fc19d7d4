//! Dashboard plan management
//!
//! Every route here runs as the session's identity; requests without a
//! session are refused by the plan service.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::response::{Created, DataResponse, NoContent};
use crate::app::AppState;
use crate::auth::Session;
use crate::domain::{NewPlan, Plan, PlanPatch, PlanStats};
use crate::error::ApiError;

const PLAN_NOT_FOUND: &str = "Plan not found";

/// GET /dashboard/plans
pub async fn list_plans(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<DataResponse<Vec<Plan>>>, ApiError> {
    let plans = state
        .plans
        .list(session.identity().as_ref())
        .await
        .map_err(ApiError::access_failure(PLAN_NOT_FOUND, "Failed to load plans"))?;

    Ok(Json(DataResponse::new(plans)))
}

/// GET /dashboard/plans/:plan_id
pub async fn get_plan(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(plan_id): Path<Uuid>,
) -> Result<Json<DataResponse<Plan>>, ApiError> {
    let plan = state
        .plans
        .get(session.identity().as_ref(), plan_id)
        .await
        .map_err(ApiError::access_failure(PLAN_NOT_FOUND, "Failed to load plan"))?;

    Ok(Json(DataResponse::new(plan)))
}

/// POST /dashboard/plans
pub async fn create_plan(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(req): Json<NewPlan>,
) -> Result<Created<DataResponse<Plan>>, ApiError> {
    req.validate().map_err(ApiError::Validation)?;

    let plan = state
        .plans
        .create(session.identity().as_ref(), req)
        .await
        .map_err(ApiError::access_failure(PLAN_NOT_FOUND, "Failed to create plan"))?;

    Ok(Created(DataResponse::new(plan)))
}

/// PUT /dashboard/plans/:plan_id
pub async fn update_plan(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(plan_id): Path<Uuid>,
    Json(req): Json<PlanPatch>,
) -> Result<Json<DataResponse<Plan>>, ApiError> {
    req.validate().map_err(ApiError::Validation)?;

    let plan = state
        .plans
        .update(session.identity().as_ref(), plan_id, req)
        .await
        .map_err(ApiError::access_failure(PLAN_NOT_FOUND, "Failed to update plan"))?;

    Ok(Json(DataResponse::new(plan)))
}

/// DELETE /dashboard/plans/:plan_id
pub async fn delete_plan(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(plan_id): Path<Uuid>,
) -> Result<NoContent, ApiError> {
    state
        .plans
        .delete(session.identity().as_ref(), plan_id)
        .await
        .map_err(ApiError::access_failure(PLAN_NOT_FOUND, "Failed to delete plan"))?;

    Ok(NoContent)
}

/// GET /dashboard/stats
pub async fn plan_stats(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<DataResponse<PlanStats>>, ApiError> {
    let stats = state
        .plans
        .stats(session.identity().as_ref())
        .await
        .map_err(ApiError::access_failure(PLAN_NOT_FOUND, "Failed to load plans"))?;

    Ok(Json(DataResponse::new(stats)))
}
