//! Profile domain types
//!
//! Account metadata stored in the profiles table, one row per auth identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{looks_like_email, FieldErrors};

/// User profile entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// Same id as the auth identity
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields used when a profile row is first created
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct NewProfile {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Request DTO for updating a profile
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.email.as_deref().is_some_and(|e| !looks_like_email(e)) {
            errors.add("email", "Please enter a valid email");
        }
        errors.into_result()
    }
}

impl From<UpdateProfileRequest> for NewProfile {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            full_name: req.full_name,
            email: req.email,
        }
    }
}
