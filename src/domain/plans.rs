//! Subscription plan domain types
//!
//! Plans are owned by the staff member who created them. The catalog pages
//! read them publicly; the dashboard manages them per owner.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::validation::{is_blank, FieldErrors};

/// Plan category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlanCategory {
    #[default]
    Data,
    Ott,
    Iptv,
    Commercial,
}

impl PlanCategory {
    pub const ALL: [PlanCategory; 4] = [Self::Data, Self::Ott, Self::Iptv, Self::Commercial];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Data => "DATA",
            Self::Ott => "OTT",
            Self::Iptv => "IPTV",
            Self::Commercial => "COMMERCIAL",
        }
    }
}

impl fmt::Display for PlanCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown plan category '{}'", s))
    }
}

/// Plan entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub features: Vec<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub category: PlanCategory,
    /// Mbps
    pub speed: i32,
    pub duration_months: i32,
    pub ott_apps: bool,
    pub iptv_channels: bool,
    pub extra_days: i32,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

fn default_duration_months() -> i32 {
    1
}

/// Request DTO for creating a plan. Owner and timestamps are stamped by the server.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NewPlan {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub original_price: Option<Decimal>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub category: PlanCategory,
    #[serde(default)]
    pub speed: i32,
    #[serde(default = "default_duration_months")]
    pub duration_months: i32,
    #[serde(default)]
    pub ott_apps: bool,
    #[serde(default)]
    pub iptv_channels: bool,
    #[serde(default)]
    pub extra_days: i32,
}

impl NewPlan {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if is_blank(&self.name) {
            errors.add("name", "Plan name is required");
        }
        check_amounts(&mut errors, Some(self.price), self.original_price);
        check_counts(
            &mut errors,
            Some(self.speed),
            Some(self.duration_months),
            Some(self.extra_days),
        );
        errors.into_result()
    }

    /// Trim the name and drop blank feature lines.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.features = clean_features(self.features);
        self
    }
}

/// Present-but-null becomes `Some(None)`; an absent field stays `None`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Request DTO for updating a plan; only supplied fields change.
///
/// `description` and `original_price` can be cleared by sending `null`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PlanPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "nullable")]
    pub original_price: Option<Option<Decimal>>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub is_featured: Option<bool>,
    #[serde(default)]
    pub category: Option<PlanCategory>,
    #[serde(default)]
    pub speed: Option<i32>,
    #[serde(default)]
    pub duration_months: Option<i32>,
    #[serde(default)]
    pub ott_apps: Option<bool>,
    #[serde(default)]
    pub iptv_channels: Option<bool>,
    #[serde(default)]
    pub extra_days: Option<i32>,
}

impl PlanPatch {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.name.as_deref().is_some_and(is_blank) {
            errors.add("name", "Plan name is required");
        }
        check_amounts(&mut errors, self.price, self.original_price.flatten());
        check_counts(&mut errors, self.speed, self.duration_months, self.extra_days);
        errors.into_result()
    }

    pub fn normalized(mut self) -> Self {
        self.name = self.name.map(|n| n.trim().to_string());
        self.features = self.features.map(clean_features);
        self
    }

    /// Apply the supplied fields to a plan in place. Timestamps are left alone.
    pub fn apply_to(&self, plan: &mut Plan) {
        if let Some(name) = &self.name {
            plan.name = name.clone();
        }
        if let Some(description) = &self.description {
            plan.description = description.clone();
        }
        if let Some(price) = self.price {
            plan.price = price;
        }
        if let Some(original_price) = self.original_price {
            plan.original_price = original_price;
        }
        if let Some(features) = &self.features {
            plan.features = features.clone();
        }
        if let Some(is_active) = self.is_active {
            plan.is_active = is_active;
        }
        if let Some(is_featured) = self.is_featured {
            plan.is_featured = is_featured;
        }
        if let Some(category) = self.category {
            plan.category = category;
        }
        if let Some(speed) = self.speed {
            plan.speed = speed;
        }
        if let Some(duration_months) = self.duration_months {
            plan.duration_months = duration_months;
        }
        if let Some(ott_apps) = self.ott_apps {
            plan.ott_apps = ott_apps;
        }
        if let Some(iptv_channels) = self.iptv_channels {
            plan.iptv_channels = iptv_channels;
        }
        if let Some(extra_days) = self.extra_days {
            plan.extra_days = extra_days;
        }
    }
}

fn clean_features(features: Vec<String>) -> Vec<String> {
    features
        .into_iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect()
}

/// Prices are stored as NUMERIC(10, 2)
const MAX_PRICE_SCALE: u32 = 2;
const PRICE_CEILING: i64 = 100_000_000;

fn check_amount(errors: &mut FieldErrors, field: &str, label: &str, amount: Option<Decimal>) {
    let Some(amount) = amount else {
        return;
    };
    if amount.is_sign_negative() {
        errors.add(field, format!("{} cannot be negative", label));
    } else if amount.normalize().scale() > MAX_PRICE_SCALE {
        errors.add(field, format!("{} can have at most two decimal places", label));
    } else if amount >= Decimal::from(PRICE_CEILING) {
        errors.add(field, format!("{} must be less than 100000000", label));
    }
}

fn check_amounts(errors: &mut FieldErrors, price: Option<Decimal>, original: Option<Decimal>) {
    check_amount(errors, "price", "Price", price);
    check_amount(errors, "original_price", "Original price", original);
}

fn check_counts(
    errors: &mut FieldErrors,
    speed: Option<i32>,
    duration_months: Option<i32>,
    extra_days: Option<i32>,
) {
    if speed.is_some_and(|s| s < 0) {
        errors.add("speed", "Speed cannot be negative");
    }
    if duration_months.is_some_and(|d| d < 1) {
        errors.add("duration_months", "Duration must be at least one month");
    }
    if extra_days.is_some_and(|d| d < 0) {
        errors.add("extra_days", "Extra days cannot be negative");
    }
}

/// Dashboard summary over one owner's plans
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlanStats {
    pub total_plans: usize,
    pub featured_plans: usize,
    pub active_plans: usize,
    pub average_price: Option<Decimal>,
    pub lowest_price: Option<Decimal>,
    pub highest_price: Option<Decimal>,
}

impl PlanStats {
    pub fn from_plans(plans: &[Plan]) -> Self {
        let prices = || plans.iter().map(|p| p.price);
        let average_price = if plans.is_empty() {
            None
        } else {
            let total: Decimal = prices().sum();
            Some(
                (total / Decimal::from(plans.len()))
                    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            )
        };

        Self {
            total_plans: plans.len(),
            featured_plans: plans.iter().filter(|p| p.is_featured).count(),
            active_plans: plans.iter().filter(|p| p.is_active).count(),
            average_price,
            lowest_price: prices().min(),
            highest_price: prices().max(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn new_plan(name: &str, price: i64) -> NewPlan {
        NewPlan {
            name: name.to_string(),
            description: Some(format!("{} broadband", name)),
            price: Decimal::from(price),
            original_price: None,
            features: vec!["Unlimited Data".to_string(), "Free Installation".to_string()],
            is_active: true,
            is_featured: false,
            category: PlanCategory::Data,
            speed: 100,
            duration_months: 1,
            ott_apps: false,
            iptv_channels: false,
            extra_days: 0,
        }
    }

    pub fn plan(owner: Uuid, name: &str, price: i64, category: PlanCategory) -> Plan {
        let now = Utc::now();
        let new = new_plan(name, price);
        Plan {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            price: new.price,
            original_price: None,
            features: new.features,
            is_active: true,
            is_featured: false,
            category,
            speed: 100,
            duration_months: 1,
            ott_apps: false,
            iptv_channels: false,
            extra_days: 0,
            user_id: owner,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("ott".parse::<PlanCategory>(), Ok(PlanCategory::Ott));
        assert_eq!("COMMERCIAL".parse::<PlanCategory>(), Ok(PlanCategory::Commercial));
        assert!("fiber".parse::<PlanCategory>().is_err());
    }

    #[test]
    fn new_plan_defaults_from_json() {
        let plan: NewPlan =
            serde_json::from_value(serde_json::json!({ "name": "Basic", "price": 599 })).unwrap();
        assert!(plan.is_active);
        assert!(!plan.is_featured);
        assert_eq!(plan.category, PlanCategory::Data);
        assert_eq!(plan.duration_months, 1);
        assert!(plan.features.is_empty());
    }

    #[test]
    fn new_plan_requires_name_and_non_negative_price() {
        let mut plan = new_plan("  ", 599);
        plan.price = Decimal::from(-1);
        let errors = plan.validate().unwrap_err();
        assert_eq!(errors.get("name"), Some("Plan name is required"));
        assert_eq!(errors.get("price"), Some("Price cannot be negative"));
    }

    #[test]
    fn prices_must_fit_the_stored_precision() {
        let mut plan = new_plan("Basic", 599);
        plan.price = Decimal::new(599999, 3);
        plan.original_price = Some(Decimal::from(100_000_000));
        let errors = plan.validate().unwrap_err();
        assert_eq!(
            errors.get("price"),
            Some("Price can have at most two decimal places")
        );
        assert_eq!(
            errors.get("original_price"),
            Some("Original price must be less than 100000000")
        );

        let mut plan = new_plan("Basic", 599);
        plan.price = Decimal::new(59950, 2);
        plan.original_price = Some(Decimal::new(9999999999, 2));
        assert!(plan.validate().is_ok());

        // Trailing zeros do not count as precision
        plan.price = Decimal::new(5990000, 4);
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn patch_prices_must_fit_the_stored_precision() {
        let patch = PlanPatch {
            price: Some(Decimal::new(1, 3)),
            original_price: Some(Some(Decimal::from(250_000_000))),
            ..Default::default()
        };
        let errors = patch.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.get("price").is_some());
        assert!(errors.get("original_price").is_some());
    }

    #[test]
    fn patch_null_clears_optional_fields() {
        let absent: PlanPatch = serde_json::from_value(serde_json::json!({ "price": 649 })).unwrap();
        assert_eq!(absent.description, None);
        assert_eq!(absent.original_price, None);

        let cleared: PlanPatch = serde_json::from_value(serde_json::json!({
            "description": null,
            "original_price": null
        }))
        .unwrap();
        assert_eq!(cleared.description, Some(None));
        assert_eq!(cleared.original_price, Some(None));

        let owner = Uuid::new_v4();
        let mut plan = plan(owner, "Basic", 599, PlanCategory::Data);
        plan.original_price = Some(Decimal::from(799));

        absent.apply_to(&mut plan);
        assert!(plan.description.is_some());
        assert_eq!(plan.original_price, Some(Decimal::from(799)));

        cleared.apply_to(&mut plan);
        assert_eq!(plan.description, None);
        assert_eq!(plan.original_price, None);
    }

    #[test]
    fn normalization_drops_blank_features() {
        let mut plan = new_plan(" Premium ", 999);
        plan.features = vec!["300 Mbps".into(), "  ".into(), String::new(), " OTT ".into()];
        let plan = plan.normalized();
        assert_eq!(plan.name, "Premium");
        assert_eq!(plan.features, vec!["300 Mbps".to_string(), "OTT".to_string()]);
    }

    #[test]
    fn patch_only_touches_supplied_fields() {
        let owner = Uuid::new_v4();
        let mut plan = plan(owner, "Basic", 599, PlanCategory::Data);
        let before = plan.clone();

        let patch = PlanPatch {
            price: Some(Decimal::from(649)),
            is_featured: Some(true),
            ..Default::default()
        };
        patch.apply_to(&mut plan);

        assert_eq!(plan.price, Decimal::from(649));
        assert!(plan.is_featured);
        assert_eq!(plan.name, before.name);
        assert_eq!(plan.features, before.features);
        assert_eq!(plan.user_id, owner);
    }

    #[test]
    fn stats_over_plans() {
        let owner = Uuid::new_v4();
        let mut featured = plan(owner, "Popular", 799, PlanCategory::Data);
        featured.is_featured = true;
        let plans = vec![
            plan(owner, "Basic", 599, PlanCategory::Data),
            featured,
            plan(owner, "Premium", 1000, PlanCategory::Ott),
        ];

        let stats = PlanStats::from_plans(&plans);
        assert_eq!(stats.total_plans, 3);
        assert_eq!(stats.featured_plans, 1);
        assert_eq!(stats.active_plans, 3);
        assert_eq!(stats.average_price, Some(Decimal::new(79933, 2)));
        assert_eq!(stats.lowest_price, Some(Decimal::from(599)));
        assert_eq!(stats.highest_price, Some(Decimal::from(1000)));
    }

    #[test]
    fn stats_without_plans_have_no_prices() {
        let stats = PlanStats::from_plans(&[]);
        assert_eq!(stats.total_plans, 0);
        assert_eq!(stats.average_price, None);
        assert_eq!(stats.lowest_price, None);
    }
}
