//! Owner-scoped plan management for the dashboard.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::access::{authorize, require_identity, store_failure, AccessError, AccessResult, Identity};
use crate::domain::{NewPlan, Plan, PlanPatch, PlanStats};
use crate::repositories::PlanRepository;

#[derive(Clone)]
pub struct PlanService {
    repo: Arc<dyn PlanRepository>,
}

impl PlanService {
    pub fn new(repo: Arc<dyn PlanRepository>) -> Self {
        Self { repo }
    }

    /// All plans owned by the caller, newest first.
    #[instrument(skip_all)]
    pub async fn list(&self, session: Option<&Identity>) -> AccessResult<Vec<Plan>> {
        let identity = require_identity(session, "list_plans")?;
        debug!(user_id = %identity.user_id, "Fetching plans");

        let plans = self
            .repo
            .list_by_owner(identity.user_id)
            .await
            .map_err(store_failure("list_plans"))?;

        debug!(user_id = %identity.user_id, count = plans.len(), "Plans fetched");
        Ok(plans)
    }

    #[instrument(skip(self, session))]
    pub async fn get(&self, session: Option<&Identity>, id: Uuid) -> AccessResult<Plan> {
        let identity = require_identity(session, "get_plan")?;

        self.repo
            .find_owned(id, identity.user_id)
            .await
            .map_err(store_failure("get_plan"))?
            .ok_or(AccessError::NotFound)
    }

    #[instrument(skip_all, fields(plan_name = %plan.name))]
    pub async fn create(&self, session: Option<&Identity>, plan: NewPlan) -> AccessResult<Plan> {
        let identity = require_identity(session, "create_plan")?;
        info!(user_id = %identity.user_id, "Creating plan");

        let created = self
            .repo
            .insert(identity.user_id, plan.normalized(), Utc::now())
            .await
            .map_err(store_failure("create_plan"))?;

        info!(plan_id = %created.id, "Plan created");
        Ok(created)
    }

    /// Apply the supplied fields to a plan the caller owns.
    #[instrument(skip(self, session, patch))]
    pub async fn update(
        &self,
        session: Option<&Identity>,
        id: Uuid,
        patch: PlanPatch,
    ) -> AccessResult<Plan> {
        let owned = authorize(session, id, "update_plan", |id, owner| {
            self.repo.find_owned(id, owner)
        })
        .await?;
        info!(user_id = %owned.owner_id, "Updating plan");

        let updated = self
            .repo
            .update(owned.record.id, owned.owner_id, patch.normalized(), Utc::now())
            .await
            .map_err(store_failure("update_plan"))?
            // Removed between the check and the write
            .ok_or(AccessError::NotFound)?;

        info!("Plan updated");
        Ok(updated)
    }

    #[instrument(skip(self, session))]
    pub async fn delete(&self, session: Option<&Identity>, id: Uuid) -> AccessResult<()> {
        let owned = authorize(session, id, "delete_plan", |id, owner| {
            self.repo.find_owned(id, owner)
        })
        .await?;
        info!(user_id = %owned.owner_id, "Deleting plan");

        let removed = self
            .repo
            .delete(owned.record.id, owned.owner_id)
            .await
            .map_err(store_failure("delete_plan"))?;

        if !removed {
            return Err(AccessError::NotFound);
        }

        info!("Plan deleted successfully");
        Ok(())
    }

    /// Dashboard summary over the caller's plans.
    pub async fn stats(&self, session: Option<&Identity>) -> AccessResult<PlanStats> {
        let plans = self.list(session).await?;
        Ok(PlanStats::from_plans(&plans))
    }
}
