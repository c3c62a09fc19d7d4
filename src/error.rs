//! Unified API error handling
//!
//! Provides consistent error responses across all endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::domain::FieldErrors;
use crate::services::AccessError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed")]
    Validation(FieldErrors),

    /// A known operation failed; `message` is safe to show the caller
    #[error("{message}")]
    Failed {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    /// A remote service (auth, CRM) failed or was unreachable
    #[error("{message}")]
    Upstream {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

impl ErrorResponse {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            fields: None,
        }
    }
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn failed(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Failed {
            message: message.into(),
            source: source.into(),
        }
    }

    pub fn upstream(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Upstream {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Map a data access failure onto a response, with per-operation wording.
    pub fn access_failure(
        not_found: &'static str,
        failed: &'static str,
    ) -> impl Fn(AccessError) -> ApiError {
        move |e| match e {
            AccessError::Unauthorized => Self::unauthorized("Authentication required"),
            AccessError::NotFound => Self::not_found(not_found),
            AccessError::Transport(source) => Self::failed(failed, source),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Self::Failed { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Upstream { .. } => "UPSTREAM_ERROR",
            Self::Failed { .. } | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Unauthorized(msg) => msg.clone(),
            Self::NotFound(msg) => msg.clone(),
            Self::BadRequest(msg) => msg.clone(),
            Self::Validation(_) => "Please correct the highlighted fields".to_string(),
            Self::Failed { message, .. } | Self::Upstream { message, .. } => message.clone(),
            // Don't leak internal error details
            Self::Internal(_) => "An internal error occurred".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = ?e, "Internal server error");
            }
            Self::Failed { message, source } | Self::Upstream { message, source } => {
                tracing::error!(error = ?source, message = %message, "Request failed");
            }
            _ => {
                tracing::warn!(error = %self, "API error");
            }
        }

        let status = self.status_code();
        let mut body = ErrorResponse::new(self.error_code(), self.public_message());
        if let Self::Validation(fields) = self {
            body.fields = Some(fields);
        }

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::StoreError;
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_lists_fields() {
        let mut fields = FieldErrors::new();
        fields.add("email", "Email is required");

        let response = ApiError::Validation(fields).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body_json(response).await,
            json!({
                "code": "VALIDATION_ERROR",
                "message": "Please correct the highlighted fields",
                "fields": { "email": "Email is required" }
            })
        );
    }

    #[tokio::test]
    async fn transport_failure_hides_detail() {
        let map = ApiError::access_failure("Plan not found", "Failed to load plans");
        let err = map(AccessError::Transport(StoreError::Unavailable(
            "connection refused".to_string(),
        )));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Failed to load plans");
        assert!(body.get("fields").is_none());
    }

    #[test]
    fn access_failures_map_to_statuses() {
        let map = ApiError::access_failure("Plan not found", "Failed to save plan");
        assert_eq!(
            map(AccessError::Unauthorized).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(map(AccessError::NotFound).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::upstream("Failed to submit form. Please try again.", anyhow::anyhow!("x"))
                .status_code(),
            StatusCode::BAD_GATEWAY
        );
    }
}
