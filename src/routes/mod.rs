pub mod auth;
pub mod catalog;
pub mod contact;
pub mod health;
pub mod me;
pub mod plans;
pub mod profiles;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Public routes
        .route("/health", get(health::health_check))
        .route("/plans", get(catalog::browse_plans))
        .route("/plans/featured", get(catalog::featured_plans))
        .route("/contact", post(contact::submit_contact))
        // Auth proxy
        .route("/auth/signup", post(auth::sign_up))
        .route("/auth/signin", post(auth::sign_in))
        .route("/auth/refresh", post(auth::refresh_token))
        .route("/auth/recover", post(auth::recover))
        .route("/auth/signout", post(auth::sign_out))
        .route("/auth/session", get(auth::get_session))
        .route("/me", get(me::get_me))
        // Session routes
        .route(
            "/dashboard/plans",
            get(plans::list_plans).post(plans::create_plan),
        )
        .route(
            "/dashboard/plans/:plan_id",
            get(plans::get_plan)
                .put(plans::update_plan)
                .delete(plans::delete_plan),
        )
        .route("/dashboard/stats", get(plans::plan_stats))
        .route(
            "/profile",
            get(profiles::get_my_profile).put(profiles::update_my_profile),
        )
}
