//! Identity resolution and the ownership check shared by the data services.

use std::future::Future;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::repositories::{StoreError, StoreResult};

/// The authenticated actor a data operation runs as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: Option<String>,
    /// `full_name` from the auth user metadata
    pub full_name: Option<String>,
}

impl From<&AuthContext> for Identity {
    fn from(ctx: &AuthContext) -> Self {
        Self {
            user_id: ctx.user_id,
            email: ctx.email.clone(),
            full_name: ctx.claims().full_name(),
        }
    }
}

/// Why a data operation produced no value.
///
/// A record owned by someone else is reported as `NotFound`, the same as a
/// missing one.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("no authenticated session")]
    Unauthorized,

    #[error("record not found")]
    NotFound,

    #[error("data store failure: {0}")]
    Transport(#[from] StoreError),
}

impl AccessError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

pub type AccessResult<T> = Result<T, AccessError>;

/// Resolve the session's identity; fails closed when there is none.
pub fn require_identity<'a>(
    session: Option<&'a Identity>,
    operation: &'static str,
) -> AccessResult<&'a Identity> {
    session.ok_or_else(|| {
        tracing::debug!(operation, "No authenticated user found");
        AccessError::Unauthorized
    })
}

/// Log a store failure and fold it into the access result.
pub fn store_failure(operation: &'static str) -> impl FnOnce(StoreError) -> AccessError {
    move |e| {
        tracing::error!(operation, error = %e, "Data store error");
        AccessError::Transport(e)
    }
}

/// A record the current identity was verified to own
#[derive(Debug)]
pub struct Owned<T> {
    pub owner_id: Uuid,
    pub record: T,
}

/// Ownership check applied before every mutation of an owned record.
///
/// `lookup` receives the record id and the caller's id and must only return
/// rows matching both.
pub async fn authorize<T, F, Fut>(
    session: Option<&Identity>,
    id: Uuid,
    operation: &'static str,
    lookup: F,
) -> AccessResult<Owned<T>>
where
    F: FnOnce(Uuid, Uuid) -> Fut,
    Fut: Future<Output = StoreResult<Option<T>>>,
{
    let identity = require_identity(session, operation)?;

    match lookup(id, identity.user_id)
        .await
        .map_err(store_failure(operation))?
    {
        Some(record) => Ok(Owned {
            owner_id: identity.user_id,
            record,
        }),
        None => {
            tracing::warn!(
                operation,
                user_id = %identity.user_id,
                record_id = %id,
                "Record not found or not owned by caller"
            );
            Err(AccessError::NotFound)
        }
    }
}

#[cfg(test)]
pub(crate) fn identity(user_id: Uuid) -> Identity {
    Identity {
        user_id,
        email: Some(format!("{}@example.in", &user_id.to_string()[..8])),
        full_name: Some("Staff Member".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn authorize_without_session_never_looks_up() {
        let called = std::cell::Cell::new(false);
        let result = authorize(None, Uuid::new_v4(), "test", |_, _| {
            called.set(true);
            async { Ok::<Option<()>, StoreError>(None) }
        })
        .await;

        assert!(result.unwrap_err().is_unauthorized());
        assert!(!called.get());
    }

    #[tokio::test]
    async fn authorize_passes_caller_as_owner() {
        let caller = identity(Uuid::new_v4());
        let record_id = Uuid::new_v4();

        let owned = authorize(Some(&caller), record_id, "test", |id, owner| async move {
            Ok::<_, StoreError>(Some((id, owner)))
        })
        .await
        .unwrap();

        assert_eq!(owned.owner_id, caller.user_id);
        assert_eq!(owned.record, (record_id, caller.user_id));
    }

    #[tokio::test]
    async fn authorize_reports_missing_as_not_found() {
        let caller = identity(Uuid::new_v4());
        let result = authorize(Some(&caller), Uuid::new_v4(), "test", |_, _| async {
            Ok::<Option<()>, StoreError>(None)
        })
        .await;

        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn authorize_surfaces_store_failures() {
        let caller = identity(Uuid::new_v4());
        let result = authorize(Some(&caller), Uuid::new_v4(), "test", |_, _| async {
            Err::<Option<()>, _>(StoreError::Unavailable("connection reset".to_string()))
        })
        .await;

        assert!(matches!(result, Err(AccessError::Transport(_))));
    }
}
