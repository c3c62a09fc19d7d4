//! Public plan listings. Reads every owner's plans; nothing here needs a session.

use std::sync::Arc;
use tracing::debug;

use super::access::{store_failure, AccessResult};
use crate::domain::catalog::{CatalogFilter, SortOrder};
use crate::domain::Plan;
use crate::repositories::{CatalogQuery, PlanRepository};

#[derive(Clone)]
pub struct CatalogService {
    repo: Arc<dyn PlanRepository>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn PlanRepository>) -> Self {
        Self { repo }
    }

    /// Home page plans: active, featured, cheapest first, at most three.
    pub async fn featured(&self) -> AccessResult<Vec<Plan>> {
        self.repo
            .list_catalog(CatalogQuery::featured())
            .await
            .map_err(store_failure("featured_plans"))
    }

    /// Full catalog in price order, narrowed in memory by `filter`.
    pub async fn browse(&self, filter: &CatalogFilter, order: SortOrder) -> AccessResult<Vec<Plan>> {
        let plans = self
            .repo
            .list_catalog(CatalogQuery::all(order))
            .await
            .map_err(store_failure("browse_plans"))?;

        let fetched = plans.len();
        let visible = filter.apply(plans);
        debug!(fetched, visible = visible.len(), "Catalog filtered");
        Ok(visible)
    }
}
