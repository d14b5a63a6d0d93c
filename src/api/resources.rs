//! Resource detail, suggestion, moderation, favourites and visits

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::api::{current_profile, require};
use crate::auth::Claims;
use crate::domain::catalog::ResourceStatus;
use crate::domain::gamification::MissionKey;
use crate::domain::{DomainError, SuggestResourceInput};
use crate::infrastructure::AppState;
use crate::services::{activity_service, gamification_service, rating_service};

#[utoipa::path(
    get,
    path = "/api/resources/{id}",
    params(("id" = i32, Path, description = "Resource ID")),
    responses(
        (status = 200, description = "Resource with its ratings"),
        (status = 404, description = "Resource not found")
    )
)]
pub async fn get_resource(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    let resource = state
        .resource_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("resource {}", id)))?;

    // Unapproved resources are visible to moderators and their author only
    if resource.status != ResourceStatus::Approved.as_str()
        && !claims.role().can_moderate()
        && resource.suggested_by != Some(claims.uid)
    {
        return Err(DomainError::NotFound(format!("resource {}", id)));
    }

    let profile = current_profile(&state, &claims).await?;
    let ratings = rating_service::ratings_for_resource(state.db(), id).await?;
    let user_has_rated = ratings.iter().any(|r| r.user_id == claims.uid);
    let is_favorited = activity_service::is_favorite(state.db(), profile.id, id).await?;
    let (average, count) = rating_service::average_for(state.db(), id).await?;

    let mission = gamification_service::complete_mission(
        state.db(),
        profile.id,
        MissionKey::VisitResource,
        Utc::now(),
    )
    .await?;

    Ok(Json(json!({
        "resource": resource,
        "ratings": ratings,
        "average": average,
        "rating_count": count,
        "user_has_rated": user_has_rated,
        "is_favorited": is_favorited,
        "mission": mission,
    })))
}

#[utoipa::path(
    post,
    path = "/api/resources/suggest",
    responses(
        (status = 201, description = "Pending resource created"),
        (status = 403, description = "Only teachers and admins can suggest")
    )
)]
pub async fn suggest_resource(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<SuggestResourceInput>,
) -> Result<impl IntoResponse, DomainError> {
    require(
        claims.role().can_suggest(),
        "only teachers and administrators can suggest resources",
    )?;

    let resource = state.resource_repo.suggest(payload, claims.uid).await?;

    let mission = gamification_service::complete_mission_for_user(
        state.db(),
        claims.uid,
        MissionKey::SuggestResource,
        Utc::now(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "resource": resource,
            "mission": mission,
            "message": "Resource submitted for review"
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

pub async fn set_resource_status(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<StatusRequest>,
) -> Result<impl IntoResponse, DomainError> {
    require(
        claims.role().can_moderate(),
        "only content managers and administrators can moderate resources",
    )?;

    let status = ResourceStatus::parse(&payload.status).ok_or_else(|| {
        DomainError::Validation(format!("unknown status '{}'", payload.status))
    })?;

    let resource = state.resource_repo.set_status(id, status).await?;
    Ok(Json(json!({ "resource": resource })))
}

pub async fn toggle_favorite(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    let profile = current_profile(&state, &claims).await?;
    let is_favorited = activity_service::toggle_favorite(state.db(), profile.id, id).await?;

    Ok(Json(json!({ "resource_id": id, "is_favorited": is_favorited })))
}

pub async fn list_favorites(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<impl IntoResponse, DomainError> {
    let profile = current_profile(&state, &claims).await?;
    let ids = activity_service::favorite_ids(state.db(), profile.id).await?;
    let resources = state.resource_repo.find_many(&ids).await?;

    Ok(Json(json!({ "resources": resources })))
}

pub async fn record_visit(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    let profile = current_profile(&state, &claims).await?;
    let outcome = activity_service::record_visit(state.db(), profile.id, id, Utc::now()).await?;

    Ok(Json(json!(outcome)))
}
