use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::AuthContext;
use crate::app::AppState;
use crate::error::ErrorResponse;
use crate::services::Identity;

/// Extractor that requires authentication
/// Use this in route handlers to require a valid JWT
///
/// Example:
/// ```ignore
/// async fn protected_route(auth: RequireAuth) -> impl IntoResponse {
///     format!("Hello, user {}", auth.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthContext);

impl std::ops::Deref for RequireAuth {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Optional caller session.
///
/// A request without an `Authorization` header yields `Session(None)` and the
/// data services decide; a header that is present but invalid is rejected.
#[derive(Debug, Clone)]
pub struct Session(pub Option<AuthContext>);

impl Session {
    pub fn identity(&self) -> Option<Identity> {
        self.0.as_ref().map(Identity::from)
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidFormat,
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match &self {
            AuthError::MissingToken => "Missing authorization token",
            AuthError::InvalidFormat => "Invalid authorization format",
            AuthError::InvalidToken(reason) => {
                tracing::debug!(reason = %reason, "Rejected bearer token");
                "Invalid or expired token"
            }
        };

        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new("UNAUTHORIZED", message)),
        )
            .into_response()
    }
}

/// Returns `Ok(None)` when no `Authorization` header is present.
fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let token = value
        .to_str()
        .map_err(|_| AuthError::InvalidFormat)?
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidFormat)?;

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    Ok(Some(token))
}

async fn authenticate(state: &AppState, token: &str) -> Result<AuthContext, AuthError> {
    let claims = state.jwks_cache.verify_token(token).await.map_err(|e| {
        tracing::warn!(error = %e, "JWT verification failed");
        AuthError::InvalidToken(e.to_string())
    })?;

    AuthContext::from_claims_with_token(&claims, token).map_err(|e| {
        tracing::warn!(error = %e, "Failed to build auth context");
        AuthError::InvalidToken(e.to_string())
    })
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireAuth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?.ok_or(AuthError::MissingToken)?;
        Ok(RequireAuth(authenticate(state, token).await?))
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Session {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(&parts.headers)? {
            Some(token) => Ok(Session(Some(authenticate(state, token).await?))),
            None => Ok(Session(None)),
        }
    }
}
