//! Authentication routes
//!
//! These routes proxy authentication requests to the hosted auth service
//! using the public anon key.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use reqwest::RequestBuilder;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::response::{Created, DataResponse, MessageResponse, NoContent};
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::auth::{
    AuthResponse, RecoverRequest, RefreshTokenRequest, SessionResponse, SignInRequest,
    SignUpRequest, SignupPendingResponse, SupabaseAuthResponse, SupabaseErrorResponse,
    SupabaseSignupResponse, SupabaseUser, User,
};
use crate::domain::NewProfile;
use crate::error::ApiError;
use crate::services::Identity;

const RECOVER_MESSAGE: &str =
    "If an account exists for this email, you will receive a password reset link shortly.";

fn auth_request(state: &AppState, method: reqwest::Method, path: &str) -> RequestBuilder {
    state
        .http_client
        .request(
            method,
            format!("{}/auth/v1/{}", state.settings.supabase_url, path),
        )
        .header("apikey", &state.settings.supabase_anon_key)
}

async fn send(req: RequestBuilder) -> Result<reqwest::Response, ApiError> {
    req.send()
        .await
        .map_err(|e| ApiError::upstream("Failed to connect to auth service", e))
}

/// Message from an auth service error body, or `fallback` when it has none
async fn error_message(response: reqwest::Response, fallback: &str) -> String {
    let status = response.status();
    let error = response
        .json::<SupabaseErrorResponse>()
        .await
        .unwrap_or_else(|_| SupabaseErrorResponse::fallback(fallback));
    tracing::debug!(status = %status, error = ?error, "Auth service rejected request");
    error.get_message()
}

fn parse_user_id(id: &str) -> Result<Uuid, ApiError> {
    id.parse()
        .map_err(|_| ApiError::Internal(anyhow::anyhow!("Invalid user ID from auth service")))
}

/// Create the caller's profile row if it is missing.
async fn ensure_profile(
    state: &AppState,
    identity: Identity,
    profile: NewProfile,
) -> Result<(), ApiError> {
    state
        .profiles
        .create(Some(&identity), profile)
        .await
        .map(|_| ())
        .map_err(ApiError::access_failure(
            "Profile not found",
            "Failed to create profile",
        ))
}

fn identity_of(user: &SupabaseUser) -> Result<Identity, ApiError> {
    Ok(Identity {
        user_id: parse_user_id(&user.id)?,
        email: user.email.clone(),
        full_name: user.full_name(),
    })
}

fn token_grant(auth: SupabaseAuthResponse) -> AuthResponse {
    AuthResponse {
        access_token: auth.access_token,
        refresh_token: auth.refresh_token,
        expires_in: auth.expires_in,
        user: auth.user.into(),
    }
}

/// POST /auth/signup
///
/// Register a new user. The profile is created once a session exists.
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignUpRequest>,
) -> Result<Response, ApiError> {
    req.validate().map_err(ApiError::bad_request)?;

    let full_name = req.name.trim().to_string();
    let email = req.email.trim().to_string();

    let response = send(
        auth_request(&state, reqwest::Method::POST, "signup").json(&serde_json::json!({
            "email": email,
            "password": req.password,
            "data": { "full_name": full_name }
        })),
    )
    .await?;

    if !response.status().is_success() {
        return Err(ApiError::bad_request(
            error_message(response, "Registration failed").await,
        ));
    }

    // Tokens are only returned when email confirmation is disabled
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::upstream("Failed to read auth response", e))?;

    if let Ok(auth) = serde_json::from_str::<SupabaseAuthResponse>(&body) {
        let profile = NewProfile {
            full_name: Some(full_name),
            email: Some(email),
        };
        ensure_profile(&state, identity_of(&auth.user)?, profile).await?;
        tracing::info!(user_id = %auth.user.id, "User registered");
        return Ok(Created(DataResponse::new(token_grant(auth))).into_response());
    }

    // No session until the email is confirmed; the profile is created at first sign-in
    if let Ok(pending) = serde_json::from_str::<SupabaseSignupResponse>(&body) {
        tracing::info!(user_id = %pending.id, "User registered, confirmation pending");
        let pending: SignupPendingResponse = pending.into();
        return Ok(Created(DataResponse::new(pending)).into_response());
    }

    Err(ApiError::upstream(
        "Unexpected response from auth service",
        anyhow::anyhow!("unrecognised signup response body"),
    ))
}

/// POST /auth/signin
///
/// Sign in with email and password.
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<DataResponse<AuthResponse>>, ApiError> {
    let response = send(
        auth_request(&state, reqwest::Method::POST, "token?grant_type=password").json(
            &serde_json::json!({
                "email": req.email.trim(),
                "password": req.password
            }),
        ),
    )
    .await?;

    if !response.status().is_success() {
        return Err(ApiError::unauthorized(
            error_message(response, "Invalid credentials").await,
        ));
    }

    let auth: SupabaseAuthResponse = response
        .json()
        .await
        .map_err(|e| ApiError::upstream("Failed to parse auth response", e))?;

    // Users created directly in the auth service have no profile yet
    let identity = identity_of(&auth.user)?;
    let profile = NewProfile {
        full_name: identity.full_name.clone(),
        email: identity.email.clone(),
    };
    ensure_profile(&state, identity, profile).await?;

    tracing::info!(user_id = %auth.user.id, "User signed in");
    Ok(Json(DataResponse::new(token_grant(auth))))
}

/// POST /auth/signout
///
/// Revoke the caller's session. Always succeeds from the client's view.
pub async fn sign_out(State(state): State<Arc<AppState>>, auth: RequireAuth) -> NoContent {
    let result = auth_request(&state, reqwest::Method::POST, "logout")
        .bearer_auth(auth.token())
        .send()
        .await;

    match result {
        Ok(response) if response.status().is_success() => {
            tracing::info!(user_id = %auth.user_id, "User signed out");
        }
        Ok(response) => {
            tracing::warn!(status = %response.status(), "Auth service logout failed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Auth service logout request failed");
        }
    }

    NoContent
}

/// GET /auth/session
///
/// Current user as known to the auth service, plus token expiry.
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
) -> Result<Json<DataResponse<SessionResponse>>, ApiError> {
    let response = send(
        auth_request(&state, reqwest::Method::GET, "user").bearer_auth(auth.token()),
    )
    .await?;

    if !response.status().is_success() {
        return Err(ApiError::unauthorized("Invalid session"));
    }

    let user: SupabaseUser = response
        .json()
        .await
        .map_err(|e| ApiError::upstream("Failed to parse user response", e))?;

    let user: User = user.into();
    Ok(Json(DataResponse::new(SessionResponse {
        user,
        access_token: auth.token().to_string(),
        expires_at: auth.claims().exp,
    })))
}

/// POST /auth/refresh
///
/// Exchange a refresh token for a new access token.
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<Json<DataResponse<AuthResponse>>, ApiError> {
    let response = send(
        auth_request(&state, reqwest::Method::POST, "token?grant_type=refresh_token").json(
            &serde_json::json!({
                "refresh_token": req.refresh_token
            }),
        ),
    )
    .await?;

    if !response.status().is_success() {
        return Err(ApiError::unauthorized(
            error_message(response, "Invalid refresh token").await,
        ));
    }

    let auth: SupabaseAuthResponse = response
        .json()
        .await
        .map_err(|e| ApiError::upstream("Failed to parse auth response", e))?;

    Ok(Json(DataResponse::new(token_grant(auth))))
}

/// POST /auth/recover
///
/// Send a password reset email. The answer does not reveal whether the
/// account exists.
pub async fn recover(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RecoverRequest>,
) -> Result<MessageResponse, ApiError> {
    let email = req.email.trim();
    if email.is_empty() {
        return Err(ApiError::bad_request("Email is required"));
    }

    let result = auth_request(&state, reqwest::Method::POST, "recover")
        .json(&serde_json::json!({ "email": email }))
        .send()
        .await;

    match result {
        Ok(response) if response.status().is_success() => {
            tracing::info!("Password reset email requested");
        }
        Ok(response) => {
            let message = error_message(response, "Password reset failed").await;
            tracing::warn!(error = %message, "Password reset request rejected");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Password reset request failed");
        }
    }

    Ok(MessageResponse::new(RECOVER_MESSAGE))
}
