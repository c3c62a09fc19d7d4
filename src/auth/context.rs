use super::Claims;
use uuid::Uuid;

/// Verified caller, built from the access token's claims
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// User ID (from JWT sub claim)
    pub user_id: Uuid,

    pub email: Option<String>,

    pub role: Option<String>,

    pub issuer: String,

    pub audience: String,

    /// Raw JWT token
    token: String,

    claims: Claims,
}

impl AuthContext {
    pub fn from_claims_with_token(claims: &Claims, token: &str) -> Result<Self, &'static str> {
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| "Invalid user ID in token")?;

        Ok(Self {
            user_id,
            email: claims.email.clone(),
            role: claims.role.clone(),
            issuer: claims.iss.clone(),
            audience: claims.aud.clone(),
            token: token.to_string(),
            claims: claims.clone(),
        })
    }

    /// Get the raw JWT token, forwarded on calls to the auth service
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::claims_for;
    use crate::services::Identity;
    use serde_json::json;

    #[test]
    fn builds_identity_from_claims() {
        let id = Uuid::new_v4();
        let claims = claims_for(&id.to_string(), Some(json!({ "full_name": "Asha Verma" })));

        let ctx = AuthContext::from_claims_with_token(&claims, "token").unwrap();
        let identity = Identity::from(&ctx);

        assert_eq!(ctx.token(), "token");
        assert_eq!(identity.user_id, id);
        assert_eq!(identity.email.as_deref(), Some("staff@example.in"));
        assert_eq!(identity.full_name.as_deref(), Some("Asha Verma"));
    }

    #[test]
    fn rejects_non_uuid_subject() {
        let claims = claims_for("service-role", None);
        assert!(AuthContext::from_claims_with_token(&claims, "token").is_err());
    }
}
