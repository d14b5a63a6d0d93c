use axum::{Json, extract::State, response::IntoResponse};
use chrono::Utc;
use serde_json::json;

use crate::api::current_profile;
use crate::auth::Claims;
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::services::dashboard_service;
use crate::services::gamification_service::{assign_daily_missions, get_daily_missions};

#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses((status = 200, description = "Counters, missions, recent visits and a role-specific block"))
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<impl IntoResponse, DomainError> {
    let dashboard = dashboard_service::build_dashboard(
        state.db(),
        state.resource_repo.as_ref(),
        claims.uid,
        claims.role(),
        Utc::now().date_naive(),
    )
    .await?;

    Ok(Json(dashboard))
}

/// Today's missions. Assigns them first when the day has none yet, which
/// covers sessions that outlive midnight.
pub async fn today_missions(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<impl IntoResponse, DomainError> {
    let profile = current_profile(&state, &claims).await?;
    let today = Utc::now().date_naive();

    assign_daily_missions(state.db(), profile.id, today, &state.gamification).await?;
    let missions = get_daily_missions(state.db(), profile.id, today).await?;

    Ok(Json(json!({
        "date": today,
        "points": profile.points,
        "streak": profile.current_streak,
        "missions": missions,
    })))
}
