pub mod auth;
pub mod dashboard;
pub mod error;
pub mod health;
pub mod missions;
pub mod programs;
pub mod ratings;
pub mod resources;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::auth::Claims;
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::models::profile;
use crate::services::gamification_service::profile_for_user;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/me", get(auth::get_me))
        // Dashboard & missions
        .route("/dashboard", get(dashboard::get_dashboard))
        .route("/missions/today", get(dashboard::today_missions))
        // Programs
        .route("/programs", get(programs::list_programs))
        .route("/programs/:id/resource-types", get(programs::resource_types))
        .route(
            "/programs/:id/resources/:type",
            get(programs::browse_resources),
        )
        // Resources
        .route("/resources/suggest", post(resources::suggest_resource))
        .route("/resources/:id", get(resources::get_resource))
        .route(
            "/resources/:id/ratings",
            get(ratings::list_ratings).post(ratings::add_rating),
        )
        .route("/resources/:id/favorite", post(resources::toggle_favorite))
        .route("/resources/:id/visit", post(resources::record_visit))
        .route("/favorites", get(resources::list_favorites))
        // Administration
        .route(
            "/admin/resources/:id/status",
            put(resources::set_resource_status),
        )
        .route(
            "/admin/missions",
            get(missions::list_missions).post(missions::create_mission),
        )
        .route("/admin/missions/:id", put(missions::update_mission))
        .with_state(state)
}

/// Profile of the authenticated user
pub(crate) async fn current_profile(
    state: &AppState,
    claims: &Claims,
) -> Result<profile::Model, DomainError> {
    profile_for_user(state.db(), claims.uid).await
}

pub(crate) fn require(allowed: bool, message: &str) -> Result<(), DomainError> {
    if allowed {
        Ok(())
    } else {
        Err(DomainError::Forbidden(message.to_string()))
    }
}
