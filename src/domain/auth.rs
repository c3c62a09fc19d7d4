//! Authentication domain types
//!
//! Request and response shapes for the auth proxy in front of Supabase Auth.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{is_blank, looks_like_email};

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LEN: usize = 6;

/// Registration form
#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpRequest {
    /// Checks made before the auth service is contacted
    pub fn validate(&self) -> Result<(), String> {
        if is_blank(&self.name) {
            return Err("Full name is required".to_string());
        }
        if !looks_like_email(&self.email) {
            return Err("Please enter a valid email".to_string());
        }
        if self.password != self.confirm_password {
            return Err("Passwords do not match".to_string());
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LEN
            ));
        }
        Ok(())
    }
}

/// Sign in request
#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Token refresh request
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Forgot-password request
#[derive(Debug, Clone, Deserialize)]
pub struct RecoverRequest {
    pub email: String,
}

/// User info from Supabase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Auth response with tokens (for signin or auto-confirmed signup)
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user: User,
}

/// Signup response when email confirmation is required
#[derive(Debug, Clone, Serialize)]
pub struct SignupPendingResponse {
    pub user_id: String,
    pub email: String,
    pub confirmation_required: bool,
    pub message: String,
}

/// Session response
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub user: User,
    pub access_token: String,
    pub expires_at: i64,
}

// Supabase Auth API response types

/// Response when signup returns tokens (email confirmation disabled or auto-confirmed)
#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseAuthResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub refresh_token: String,
    pub user: SupabaseUser,
}

/// Signup response when email confirmation is required: just the user object
#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseSignupResponse {
    pub id: String,
    pub email: Option<String>,
    pub confirmation_sent_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseUser {
    pub id: String,
    pub email: Option<String>,
    pub created_at: Option<String>,
    pub user_metadata: Option<serde_json::Value>,
}

impl SupabaseUser {
    pub fn full_name(&self) -> Option<String> {
        self.user_metadata
            .as_ref()
            .and_then(|m| m.get("full_name"))
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// Supabase error body; newer responses use `msg`, older ones `error`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupabaseErrorResponse {
    pub msg: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
    pub message: Option<String>,
}

impl SupabaseErrorResponse {
    pub fn fallback(error: &str) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Default::default()
        }
    }

    pub fn get_message(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.msg.clone())
            .or_else(|| self.error_description.clone())
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "Unknown authentication error".to_string())
    }
}

impl From<SupabaseUser> for User {
    fn from(su: SupabaseUser) -> Self {
        Self {
            full_name: su.full_name(),
            id: su.id,
            email: su.email,
            created_at: su.created_at.and_then(|s| s.parse().ok()),
        }
    }
}

impl From<SupabaseSignupResponse> for SignupPendingResponse {
    fn from(sr: SupabaseSignupResponse) -> Self {
        Self {
            user_id: sr.id,
            email: sr.email.unwrap_or_default(),
            confirmation_required: sr.confirmation_sent_at.is_some(),
            message: "Registration successful! Please check your email to verify your account."
                .to_string(),
        }
    }
}
