//! In-memory tables with the same contract as the PostgreSQL repositories.

use axum::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

use super::{CatalogQuery, PlanRepository, ProfileRepository, StoreResult};
use crate::domain::{NewPlan, Plan, PlanPatch, Profile, UpdateProfileRequest};

#[derive(Default)]
pub struct InMemoryPlans {
    rows: Mutex<Vec<Plan>>,
}

impl InMemoryPlans {
    pub fn with_rows(rows: Vec<Plan>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }

    pub fn snapshot(&self) -> Vec<Plan> {
        self.rows.lock().clone()
    }
}

#[async_trait]
impl PlanRepository for InMemoryPlans {
    async fn list_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Plan>> {
        let mut plans: Vec<Plan> = self
            .rows
            .lock()
            .iter()
            .filter(|p| p.user_id == owner_id)
            .cloned()
            .collect();
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(plans)
    }

    async fn find_owned(&self, id: Uuid, owner_id: Uuid) -> StoreResult<Option<Plan>> {
        Ok(self
            .rows
            .lock()
            .iter()
            .find(|p| p.id == id && p.user_id == owner_id)
            .cloned())
    }

    async fn insert(
        &self,
        owner_id: Uuid,
        plan: NewPlan,
        now: DateTime<Utc>,
    ) -> StoreResult<Plan> {
        let stored = Plan {
            id: Uuid::new_v4(),
            name: plan.name,
            description: plan.description,
            price: plan.price,
            original_price: plan.original_price,
            features: plan.features,
            is_active: plan.is_active,
            is_featured: plan.is_featured,
            category: plan.category,
            speed: plan.speed,
            duration_months: plan.duration_months,
            ott_apps: plan.ott_apps,
            iptv_channels: plan.iptv_channels,
            extra_days: plan.extra_days,
            user_id: owner_id,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().push(stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: PlanPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Plan>> {
        let mut rows = self.rows.lock();
        Ok(rows
            .iter_mut()
            .find(|p| p.id == id && p.user_id == owner_id)
            .map(|plan| {
                patch.apply_to(plan);
                plan.updated_at = now;
                plan.clone()
            }))
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> StoreResult<bool> {
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|p| !(p.id == id && p.user_id == owner_id));
        Ok(rows.len() < before)
    }

    async fn list_catalog(&self, query: CatalogQuery) -> StoreResult<Vec<Plan>> {
        let mut plans: Vec<Plan> = self
            .rows
            .lock()
            .iter()
            .filter(|p| !query.featured_only || p.is_featured)
            .filter(|p| !query.active_only || p.is_active)
            .cloned()
            .collect();
        plans.sort_by(|a, b| {
            let by_price = if query.order.is_ascending() {
                a.price.cmp(&b.price)
            } else {
                b.price.cmp(&a.price)
            };
            by_price.then_with(|| b.created_at.cmp(&a.created_at))
        });
        if let Some(limit) = query.limit {
            plans.truncate(limit.max(0) as usize);
        }
        Ok(plans)
    }
}

#[derive(Default)]
pub struct InMemoryProfiles {
    rows: Mutex<HashMap<Uuid, Profile>>,
}

impl InMemoryProfiles {
    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfiles {
    async fn find(&self, id: Uuid) -> StoreResult<Option<Profile>> {
        Ok(self.rows.lock().get(&id).cloned())
    }

    async fn insert_if_absent(
        &self,
        id: Uuid,
        full_name: String,
        email: Option<String>,
        now: DateTime<Utc>,
    ) -> StoreResult<Profile> {
        let mut rows = self.rows.lock();
        let profile = rows.entry(id).or_insert_with(|| Profile {
            id,
            full_name: Some(full_name),
            email,
            created_at: now,
            updated_at: now,
        });
        Ok(profile.clone())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: UpdateProfileRequest,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Profile>> {
        let mut rows = self.rows.lock();
        Ok(rows.get_mut(&id).map(|profile| {
            if let Some(full_name) = changes.full_name {
                profile.full_name = Some(full_name);
            }
            if let Some(email) = changes.email {
                profile.email = Some(email);
            }
            profile.updated_at = now;
            profile.clone()
        }))
    }
}
