//! Profile routes
//!
//! The caller's own profile, created on first read.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::response::DataResponse;
use crate::app::AppState;
use crate::auth::Session;
use crate::domain::{Profile, UpdateProfileRequest};
use crate::error::ApiError;

/// GET /profile
pub async fn get_my_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<DataResponse<Profile>>, ApiError> {
    let profile = state
        .profiles
        .get_current(session.identity().as_ref())
        .await
        .map_err(ApiError::access_failure(
            "Profile not found",
            "Failed to load profile",
        ))?;

    Ok(Json(DataResponse::new(profile)))
}

/// PUT /profile
///
/// Patch the caller's profile; fields left out are unchanged.
pub async fn update_my_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<DataResponse<Profile>>, ApiError> {
    req.validate().map_err(ApiError::Validation)?;

    let profile = state
        .profiles
        .update(session.identity().as_ref(), req)
        .await
        .map_err(ApiError::access_failure(
            "Profile not found",
            "Failed to update profile",
        ))?;

    Ok(Json(DataResponse::new(profile)))
}
