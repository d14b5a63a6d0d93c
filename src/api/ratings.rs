use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;

use crate::auth::Claims;
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::models::rating::RatingDto;
use crate::services::rating_service;

#[utoipa::path(
    post,
    path = "/api/resources/{id}/ratings",
    params(("id" = i32, Path, description = "Resource ID")),
    responses(
        (status = 201, description = "Rating stored, new average returned"),
        (status = 400, description = "Score outside 1-5 or empty comment"),
        (status = 409, description = "Resource already rated by this user")
    )
)]
pub async fn add_rating(
    State(state): State<AppState>,
    claims: Claims,
    Path(resource_id): Path<i32>,
    Json(payload): Json<RatingDto>,
) -> Result<impl IntoResponse, DomainError> {
    let outcome =
        rating_service::add_rating(state.db(), resource_id, claims.uid, payload, Utc::now())
            .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "rating_id": outcome.rating_id,
            "average": outcome.average,
            "rating_count": outcome.count,
            "mission": outcome.mission,
        })),
    ))
}

pub async fn list_ratings(
    State(state): State<AppState>,
    _claims: Claims,
    Path(resource_id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    let ratings = rating_service::ratings_for_resource(state.db(), resource_id).await?;
    let (average, count) = rating_service::average_for(state.db(), resource_id).await?;

    Ok(Json(json!({
        "ratings": ratings,
        "average": average,
        "rating_count": count,
    })))
}
