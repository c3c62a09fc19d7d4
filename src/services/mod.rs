//! Service layer: data access rules and external integrations.
//!
//! Contains the owner-scoped plan and profile services, the public catalog,
//! and lead forwarding to the CRM.

pub mod access;
pub mod catalog;
pub mod crm;
pub mod leads;
pub mod plans;
pub mod profiles;

pub use access::{AccessError, AccessResult, Identity};
pub use catalog::CatalogService;
pub use crm::{CrmClient, LeadGateway};
pub use leads::{LeadError, LeadService};
pub use plans::PlanService;
pub use profiles::ProfileService;
