use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::auth::{Claims, create_jwt};
use crate::domain::DomainError;
use crate::domain::catalog::Role;
use crate::infrastructure::AppState;
use crate::models::user::Entity as User;
use crate::services::gamification_service::{self, record_login};
use crate::services::user_service::{self, RegisterInput};
use sea_orm::EntityTrait;

#[derive(Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    responses(
        (status = 200, description = "Token issued and login recorded"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, DomainError> {
    tracing::info!("Login attempt for user: {}", payload.username);

    let Some(user) =
        user_service::authenticate(state.db(), &payload.username, &payload.password).await?
    else {
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid credentials" })),
        )
            .into_response());
    };

    let token = create_jwt(user.id, &user.username, &user.role).map_err(DomainError::Internal)?;
    let outcome = record_login(state.db(), user.id, Utc::now(), &state.gamification).await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "token": token,
            "user": user,
            "login": outcome,
        })),
    )
        .into_response())
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    responses(
        (status = 201, description = "Student account created"),
        (status = 400, description = "Invalid national id or program"),
        (status = 409, description = "National id already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterInput>,
) -> Result<Response, DomainError> {
    let registration = user_service::register(state.db(), payload, Role::Student).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "user_id": registration.user_id,
            "username": registration.username,
            "temporary_password": registration.temporary_password,
        })),
    )
        .into_response())
}

pub async fn get_me(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<impl IntoResponse, DomainError> {
    let user = User::find_by_id(claims.uid)
        .one(state.db())
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("user {}", claims.uid)))?;
    let profile = gamification_service::profile_for_user(state.db(), user.id).await?;

    Ok(Json(json!({
        "user": user,
        "profile": {
            "id": profile.id,
            "program_id": profile.program_id,
            "points": profile.points,
            "current_streak": profile.current_streak,
        }
    })))
}
