//! Current-user profile access with create-on-first-read.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::access::{require_identity, store_failure, AccessResult, Identity};
use crate::domain::{NewProfile, Profile, UpdateProfileRequest};
use crate::repositories::ProfileRepository;

#[derive(Clone)]
pub struct ProfileService {
    repo: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    pub fn new(repo: Arc<dyn ProfileRepository>) -> Self {
        Self { repo }
    }

    /// The caller's profile, created from identity metadata if it does not exist yet.
    #[instrument(skip_all)]
    pub async fn get_current(&self, session: Option<&Identity>) -> AccessResult<Profile> {
        let identity = require_identity(session, "get_profile")?;
        debug!(user_id = %identity.user_id, "Fetching profile");

        let existing = self
            .repo
            .find(identity.user_id)
            .await
            .map_err(store_failure("get_profile"))?;

        match existing {
            Some(profile) => Ok(profile),
            None => {
                info!(user_id = %identity.user_id, "No profile found, creating one");
                self.create(
                    session,
                    NewProfile {
                        full_name: identity.full_name.clone(),
                        email: identity.email.clone(),
                    },
                )
                .await
            }
        }
    }

    /// Patch the caller's profile; creates it from the supplied fields when missing.
    #[instrument(skip_all)]
    pub async fn update(
        &self,
        session: Option<&Identity>,
        changes: UpdateProfileRequest,
    ) -> AccessResult<Profile> {
        let identity = require_identity(session, "update_profile")?;
        info!(user_id = %identity.user_id, "Updating profile");

        let updated = self
            .repo
            .update(identity.user_id, changes.clone(), Utc::now())
            .await
            .map_err(store_failure("update_profile"))?;

        match updated {
            Some(profile) => {
                info!(user_id = %identity.user_id, "Profile updated");
                Ok(profile)
            }
            None => {
                info!(user_id = %identity.user_id, "No profile found, creating one");
                self.create(session, changes.into()).await
            }
        }
    }

    /// Insert the caller's profile row. An existing row is returned unchanged.
    #[instrument(skip_all)]
    pub async fn create(
        &self,
        session: Option<&Identity>,
        profile: NewProfile,
    ) -> AccessResult<Profile> {
        let identity = require_identity(session, "create_profile")?;

        let full_name = profile
            .full_name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| identity.full_name.clone())
            .unwrap_or_default();
        let email = profile
            .email
            .filter(|e| !e.trim().is_empty())
            .or_else(|| identity.email.clone());

        let created = self
            .repo
            .insert_if_absent(identity.user_id, full_name, email, Utc::now())
            .await
            .map_err(store_failure("create_profile"))?;

        info!(user_id = %identity.user_id, "Profile created");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::InMemoryProfiles;
    use crate::repositories::profiles::MockProfileRepository;
    use crate::services::access::identity;
    use uuid::Uuid;

    #[tokio::test]
    async fn first_reads_create_exactly_one_profile() {
        let repo = Arc::new(InMemoryProfiles::default());
        let service = ProfileService::new(repo.clone());
        let user = identity(Uuid::new_v4());

        let first = service.get_current(Some(&user)).await.unwrap();
        let second = service.get_current(Some(&user)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(repo.len(), 1);
        assert_eq!(first.id, user.user_id);
        assert_eq!(first.full_name, user.full_name);
        assert_eq!(first.email, user.email);
    }

    #[tokio::test]
    async fn second_read_does_not_insert() {
        let user = identity(Uuid::new_v4());
        let now = Utc::now();
        let stored = Profile {
            id: user.user_id,
            full_name: Some("Staff Member".to_string()),
            email: user.email.clone(),
            created_at: now,
            updated_at: now,
        };

        let mut repo = MockProfileRepository::new();
        let mut lookups = 0;
        let row = stored.clone();
        repo.expect_find().times(2).returning(move |_| {
            lookups += 1;
            Ok(if lookups == 1 { None } else { Some(row.clone()) })
        });
        let row = stored.clone();
        repo.expect_insert_if_absent()
            .times(1)
            .returning(move |_, _, _, _| Ok(row.clone()));
        let service = ProfileService::new(Arc::new(repo));

        assert_eq!(service.get_current(Some(&user)).await.unwrap(), stored);
        assert_eq!(service.get_current(Some(&user)).await.unwrap(), stored);
    }

    #[tokio::test]
    async fn missing_session_fails_closed() {
        let mut repo = MockProfileRepository::new();
        repo.expect_find().never();
        repo.expect_insert_if_absent().never();
        let service = ProfileService::new(Arc::new(repo));

        assert!(service.get_current(None).await.unwrap_err().is_unauthorized());
        assert!(service
            .create(None, NewProfile::default())
            .await
            .unwrap_err()
            .is_unauthorized());
    }

    #[tokio::test]
    async fn update_without_row_creates_from_supplied_fields() {
        let repo = Arc::new(InMemoryProfiles::default());
        let service = ProfileService::new(repo.clone());
        let user = identity(Uuid::new_v4());

        let profile = service
            .update(
                Some(&user),
                UpdateProfileRequest {
                    full_name: Some("Asha Verma".to_string()),
                    email: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(repo.len(), 1);
        assert_eq!(profile.full_name.as_deref(), Some("Asha Verma"));
        assert_eq!(profile.email, user.email);
    }

    #[tokio::test]
    async fn update_patches_existing_row() {
        let repo = Arc::new(InMemoryProfiles::default());
        let service = ProfileService::new(repo.clone());
        let user = identity(Uuid::new_v4());

        let original = service.get_current(Some(&user)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let updated = service
            .update(
                Some(&user),
                UpdateProfileRequest {
                    email: Some("new@example.in".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(repo.len(), 1);
        assert_eq!(updated.email.as_deref(), Some("new@example.in"));
        assert_eq!(updated.full_name, original.full_name);
        assert!(updated.updated_at > original.updated_at);
    }

    #[tokio::test]
    async fn create_defaults_blank_fields_from_identity() {
        let repo = Arc::new(InMemoryProfiles::default());
        let service = ProfileService::new(repo);
        let user = Identity {
            full_name: None,
            ..identity(Uuid::new_v4())
        };

        let profile = service
            .create(
                Some(&user),
                NewProfile {
                    full_name: None,
                    email: Some("  ".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(profile.full_name.as_deref(), Some(""));
        assert_eq!(profile.email, user.email);
    }
}
