//! Contact form intake

use axum::{extract::State, http::HeaderMap, Json};
use std::sync::Arc;

use crate::api::response::MessageResponse;
use crate::app::AppState;
use crate::domain::leads::ContactForm;
use crate::error::ApiError;
use crate::middleware::RequestIdExt;
use crate::services::LeadError;

/// POST /contact
///
/// Validates the form and forwards it to the CRM once.
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(form): Json<ContactForm>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .leads
        .submit(form, headers.forwarded_request_id())
        .await
        .map_err(|e| match e {
            LeadError::Validation(fields) => ApiError::Validation(fields),
            LeadError::Delivery(source) => {
                ApiError::upstream("Failed to submit form. Please try again.", source)
            }
        })?;

    Ok(Json(MessageResponse::new(
        "Thank you for contacting us! We'll get back to you soon.",
    )))
}
