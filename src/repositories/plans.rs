use axum::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

use super::{StoreError, StoreResult};
use crate::domain::catalog::SortOrder;
use crate::domain::{NewPlan, Plan, PlanPatch};

/// Public listing options; these reads are not scoped to an owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogQuery {
    pub featured_only: bool,
    pub active_only: bool,
    pub order: SortOrder,
    pub limit: Option<i64>,
}

impl CatalogQuery {
    /// Home page selection: cheapest three active featured plans
    pub fn featured() -> Self {
        Self {
            featured_only: true,
            active_only: true,
            order: SortOrder::PriceAsc,
            limit: Some(3),
        }
    }

    /// Every plan, ordered by price
    pub fn all(order: SortOrder) -> Self {
        Self {
            featured_only: false,
            active_only: false,
            order,
            limit: None,
        }
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Plans owned by `owner_id`, newest first
    async fn list_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Plan>>;

    async fn find_owned(&self, id: Uuid, owner_id: Uuid) -> StoreResult<Option<Plan>>;

    async fn insert(&self, owner_id: Uuid, plan: NewPlan, now: DateTime<Utc>)
        -> StoreResult<Plan>;

    /// Returns `None` when no row with that id and owner exists
    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: PlanPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Plan>>;

    /// Returns whether a row was removed
    async fn delete(&self, id: Uuid, owner_id: Uuid) -> StoreResult<bool>;

    async fn list_catalog(&self, query: CatalogQuery) -> StoreResult<Vec<Plan>>;
}

const PLAN_COLUMNS: &str = "id, name, description, price, original_price, features, \
    is_active, is_featured, category, speed, duration_months, ott_apps, iptv_channels, \
    extra_days, user_id, created_at, updated_at";

/// Database row for plan
#[derive(Debug, sqlx::FromRow)]
struct PlanRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    price: Decimal,
    original_price: Option<Decimal>,
    features: Vec<String>,
    is_active: bool,
    is_featured: bool,
    category: String,
    speed: i32,
    duration_months: i32,
    ott_apps: bool,
    iptv_channels: bool,
    extra_days: i32,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PlanRow> for Plan {
    type Error = StoreError;

    fn try_from(row: PlanRow) -> Result<Self, Self::Error> {
        let category = row
            .category
            .parse()
            .map_err(|e| StoreError::InvalidRow(format!("plan {}: {}", row.id, e)))?;

        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            original_price: row.original_price,
            features: row.features,
            is_active: row.is_active,
            is_featured: row.is_featured,
            category,
            speed: row.speed,
            duration_months: row.duration_months,
            ott_apps: row.ott_apps,
            iptv_channels: row.iptv_channels,
            extra_days: row.extra_days,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_plans(rows: Vec<PlanRow>) -> StoreResult<Vec<Plan>> {
    rows.into_iter().map(Plan::try_from).collect()
}

/// `plans` table in PostgreSQL
#[derive(Clone)]
pub struct PgPlanRepository {
    pool: PgPool,
}

impl PgPlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanRepository for PgPlanRepository {
    async fn list_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Plan>> {
        let sql = format!(
            "SELECT {} FROM plans WHERE user_id = $1 ORDER BY created_at DESC",
            PLAN_COLUMNS
        );
        let rows = sqlx::query_as::<_, PlanRow>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        into_plans(rows)
    }

    async fn find_owned(&self, id: Uuid, owner_id: Uuid) -> StoreResult<Option<Plan>> {
        let sql = format!(
            "SELECT {} FROM plans WHERE id = $1 AND user_id = $2",
            PLAN_COLUMNS
        );
        sqlx::query_as::<_, PlanRow>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?
            .map(Plan::try_from)
            .transpose()
    }

    async fn insert(
        &self,
        owner_id: Uuid,
        plan: NewPlan,
        now: DateTime<Utc>,
    ) -> StoreResult<Plan> {
        let sql = format!(
            r#"
            INSERT INTO plans (
                id, name, description, price, original_price, features,
                is_active, is_featured, category, speed, duration_months,
                ott_apps, iptv_channels, extra_days, user_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $16)
            RETURNING {}
            "#,
            PLAN_COLUMNS
        );
        let row = sqlx::query_as::<_, PlanRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&plan.name)
            .bind(&plan.description)
            .bind(plan.price)
            .bind(plan.original_price)
            .bind(&plan.features)
            .bind(plan.is_active)
            .bind(plan.is_featured)
            .bind(plan.category.as_str())
            .bind(plan.speed)
            .bind(plan.duration_months)
            .bind(plan.ott_apps)
            .bind(plan.iptv_channels)
            .bind(plan.extra_days)
            .bind(owner_id)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: PlanPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Plan>> {
        let sql = format!(
            r#"
            UPDATE plans SET
                name = COALESCE($3, name),
                description = CASE WHEN $17 THEN $4 ELSE description END,
                price = COALESCE($5, price),
                original_price = CASE WHEN $18 THEN $6 ELSE original_price END,
                features = COALESCE($7, features),
                is_active = COALESCE($8, is_active),
                is_featured = COALESCE($9, is_featured),
                category = COALESCE($10, category),
                speed = COALESCE($11, speed),
                duration_months = COALESCE($12, duration_months),
                ott_apps = COALESCE($13, ott_apps),
                iptv_channels = COALESCE($14, iptv_channels),
                extra_days = COALESCE($15, extra_days),
                updated_at = $16
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            PLAN_COLUMNS
        );
        sqlx::query_as::<_, PlanRow>(&sql)
            .bind(id)
            .bind(owner_id)
            .bind(&patch.name)
            .bind(patch.description.clone().flatten())
            .bind(patch.price)
            .bind(patch.original_price.flatten())
            .bind(&patch.features)
            .bind(patch.is_active)
            .bind(patch.is_featured)
            .bind(patch.category.map(|c| c.as_str()))
            .bind(patch.speed)
            .bind(patch.duration_months)
            .bind(patch.ott_apps)
            .bind(patch.iptv_channels)
            .bind(patch.extra_days)
            .bind(now)
            .bind(patch.description.is_some())
            .bind(patch.original_price.is_some())
            .fetch_optional(&self.pool)
            .await?
            .map(Plan::try_from)
            .transpose()
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM plans WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_catalog(&self, query: CatalogQuery) -> StoreResult<Vec<Plan>> {
        // Direction comes from the enum, never from request text
        let direction = if query.order.is_ascending() {
            "ASC"
        } else {
            "DESC"
        };
        let sql = format!(
            r#"
            SELECT {} FROM plans
            WHERE ($1 = FALSE OR is_featured)
              AND ($2 = FALSE OR is_active)
            ORDER BY price {}, created_at DESC
            LIMIT $3
            "#,
            PLAN_COLUMNS, direction
        );
        let rows = sqlx::query_as::<_, PlanRow>(&sql)
            .bind(query.featured_only)
            .bind(query.active_only)
            .bind(query.limit)
            .fetch_all(&self.pool)
            .await?;

        into_plans(rows)
    }
}
