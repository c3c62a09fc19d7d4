//! Public plan catalog: query parameters, in-memory filtering, listing DTOs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::currency::{discount_percent, format_inr};
use super::plans::{Plan, PlanCategory};

/// Price ordering for catalog listings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    PriceAsc,
    PriceDesc,
}

impl SortOrder {
    pub fn is_ascending(&self) -> bool {
        matches!(self, Self::PriceAsc)
    }
}

/// Query string of `GET /plans`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub min_price: Option<Decimal>,
    #[serde(default)]
    pub max_price: Option<Decimal>,
    /// A category name, or `ALL`
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
}

/// Filters applied to an already-fetched catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogFilter {
    /// Lowercased search term
    search: Option<String>,
    min_price: Decimal,
    max_price: Option<Decimal>,
    category: Option<PlanCategory>,
}

impl CatalogFilter {
    pub fn from_params(params: &CatalogParams) -> Result<Self, String> {
        let category = match params.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(c) if c.eq_ignore_ascii_case("all") => None,
            Some(c) => Some(c.parse::<PlanCategory>()?),
        };

        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        Ok(Self {
            search,
            min_price: params.min_price.unwrap_or(Decimal::ZERO),
            max_price: params.max_price,
            category,
        })
    }

    pub fn with_max_price(mut self, max_price: Decimal) -> Self {
        self.max_price = Some(max_price);
        self
    }

    pub fn with_category(mut self, category: PlanCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_search(mut self, search: &str) -> Self {
        self.search = Some(search.to_lowercase());
        self
    }

    pub fn matches(&self, plan: &Plan) -> bool {
        let matches_search = match &self.search {
            None => true,
            Some(term) => {
                plan.name.to_lowercase().contains(term)
                    || plan
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(term))
            }
        };
        let matches_price = plan.price >= self.min_price
            && self.max_price.map_or(true, |max| plan.price <= max);
        let matches_category = self.category.map_or(true, |c| plan.category == c);

        matches_search && matches_price && matches_category
    }

    /// Keep matching plans, preserving the fetched order.
    pub fn apply(&self, plans: Vec<Plan>) -> Vec<Plan> {
        plans.into_iter().filter(|p| self.matches(p)).collect()
    }
}

/// Public view of a plan; the owner id is not exposed
#[derive(Debug, Clone, Serialize)]
pub struct CatalogPlan {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub price_display: String,
    pub original_price: Option<Decimal>,
    pub discount_percent: Option<u32>,
    pub features: Vec<String>,
    pub is_featured: bool,
    pub category: PlanCategory,
    pub speed: i32,
    pub duration_months: i32,
    pub ott_apps: bool,
    pub iptv_channels: bool,
    pub extra_days: i32,
}

impl From<Plan> for CatalogPlan {
    fn from(p: Plan) -> Self {
        Self {
            id: p.id,
            price_display: format_inr(p.price),
            discount_percent: discount_percent(p.price, p.original_price),
            name: p.name,
            description: p.description,
            price: p.price,
            original_price: p.original_price,
            features: p.features,
            is_featured: p.is_featured,
            category: p.category,
            speed: p.speed,
            duration_months: p.duration_months,
            ott_apps: p.ott_apps,
            iptv_channels: p.iptv_channels,
            extra_days: p.extra_days,
        }
    }
}

/// Shown when filters leave nothing to list
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EmptyState {
    pub title: &'static str,
    pub hint: &'static str,
}

pub const NO_PLANS_FOUND: EmptyState = EmptyState {
    title: "No plans found",
    hint: "Try adjusting your search or filter criteria",
};

#[derive(Debug, Clone, Serialize)]
pub struct CatalogResponse {
    pub data: Vec<CatalogPlan>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_state: Option<EmptyState>,
}

impl CatalogResponse {
    pub fn new(plans: Vec<Plan>) -> Self {
        let data: Vec<CatalogPlan> = plans.into_iter().map(CatalogPlan::from).collect();
        let empty_state = data.is_empty().then_some(NO_PLANS_FOUND);
        Self {
            total: data.len(),
            data,
            empty_state,
        }
    }
}
