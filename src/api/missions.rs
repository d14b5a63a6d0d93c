//! Mission catalog administration (admin only)

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::api::require;
use crate::auth::Claims;
use crate::domain::DomainError;
use crate::domain::catalog::Role;
use crate::infrastructure::AppState;
use crate::models::mission::MissionDto;
use crate::services::mission_service::{self, MissionUpdate};

fn require_admin(claims: &Claims) -> Result<(), DomainError> {
    require(
        claims.role() == Role::Admin,
        "only administrators can manage missions",
    )
}

pub async fn list_missions(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<impl IntoResponse, DomainError> {
    require_admin(&claims)?;
    let missions = mission_service::list_missions(state.db()).await?;
    Ok(Json(json!({ "missions": missions })))
}

pub async fn create_mission(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<MissionDto>,
) -> Result<impl IntoResponse, DomainError> {
    require_admin(&claims)?;
    let mission = mission_service::create_mission(state.db(), payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "mission": mission }))))
}

pub async fn update_mission(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<MissionUpdate>,
) -> Result<impl IntoResponse, DomainError> {
    require_admin(&claims)?;
    let mission = mission_service::update_mission(state.db(), id, payload).await?;
    Ok(Json(json!({ "mission": mission })))
}
