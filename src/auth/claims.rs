use serde::{Deserialize, Serialize};

/// Claims carried by access tokens issued by the hosted auth service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    pub aud: String,

    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    #[serde(default)]
    pub nbf: Option<i64>,

    #[serde(default)]
    pub email: Option<String>,

    /// `authenticated` for signed-in staff
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub session_id: Option<String>,

    /// Free-form metadata supplied at sign-up
    #[serde(default)]
    pub user_metadata: Option<serde_json::Value>,
}

impl Claims {
    /// Display name recorded at sign-up, if any
    pub fn full_name(&self) -> Option<String> {
        self.user_metadata
            .as_ref()?
            .get("full_name")?
            .as_str()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
pub(crate) fn claims_for(sub: &str, user_metadata: Option<serde_json::Value>) -> Claims {
    Claims {
        sub: sub.to_string(),
        aud: "authenticated".to_string(),
        iss: "http://127.0.0.1:1/auth/v1".to_string(),
        iat: 0,
        exp: i64::MAX,
        nbf: None,
        email: Some("staff@example.in".to_string()),
        role: Some("authenticated".to_string()),
        session_id: None,
        user_metadata,
    }
}
