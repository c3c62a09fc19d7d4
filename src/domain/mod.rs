//! Domain types and DTOs
//!
//! Plans, profiles, leads and the public catalog.

pub mod auth;
pub mod catalog;
pub mod currency;
pub mod leads;
pub mod plans;
pub mod profiles;
pub mod validation;

// Re-export commonly used types
pub use plans::{NewPlan, Plan, PlanCategory, PlanPatch, PlanStats};
pub use profiles::{NewProfile, Profile, UpdateProfileRequest};
pub use validation::FieldErrors;
