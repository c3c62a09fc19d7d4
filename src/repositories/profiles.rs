use axum::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

use super::StoreResult;
use crate::domain::{Profile, UpdateProfileRequest};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find(&self, id: Uuid) -> StoreResult<Option<Profile>>;

    /// Insert the row unless one already exists for `id`, then return the stored row.
    /// Concurrent callers all get the same row back.
    async fn insert_if_absent(
        &self,
        id: Uuid,
        full_name: String,
        email: Option<String>,
        now: DateTime<Utc>,
    ) -> StoreResult<Profile>;

    /// Returns `None` when there is no row to update
    async fn update(
        &self,
        id: Uuid,
        changes: UpdateProfileRequest,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Profile>>;
}

/// `profiles` table in PostgreSQL
#[derive(Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row for profile
#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    full_name: Option<String>,
    email: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn find(&self, id: Uuid) -> StoreResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, full_name, email, created_at, updated_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }

    async fn insert_if_absent(
        &self,
        id: Uuid,
        full_name: String,
        email: Option<String>,
        now: DateTime<Utc>,
    ) -> StoreResult<Profile> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, full_name, email, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(&full_name)
        .bind(&email)
        .bind(now)
        .execute(&self.pool)
        .await?;

        // Separate statement so a row committed by a concurrent insert is visible
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, full_name, email, created_at, updated_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: UpdateProfileRequest,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            UPDATE profiles SET
                full_name = COALESCE($2, full_name),
                email = COALESCE($3, email),
                updated_at = $4
            WHERE id = $1
            RETURNING id, full_name, email, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&changes.full_name)
        .bind(&changes.email)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }
}
