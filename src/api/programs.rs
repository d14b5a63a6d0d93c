//! Program listing and resource browsing

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::current_profile;
use crate::auth::Claims;
use crate::domain::catalog::ResourceType;
use crate::domain::{DomainError, ResourceFilter, ResourceSort};
use crate::infrastructure::AppState;
use crate::services::activity_service;

#[utoipa::path(
    get,
    path = "/api/programs",
    responses((status = 200, description = "All programs, by name"))
)]
pub async fn list_programs(
    State(state): State<AppState>,
    _claims: Claims,
) -> Result<impl IntoResponse, DomainError> {
    let programs = state.resource_repo.list_programs().await?;
    Ok(Json(json!({ "programs": programs })))
}

pub async fn resource_types(
    State(state): State<AppState>,
    _claims: Claims,
    Path(program_id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    let program = state
        .resource_repo
        .find_program(program_id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("program {}", program_id)))?;

    let types: Vec<_> = ResourceType::BROWSABLE.iter().map(|t| t.info()).collect();

    Ok(Json(json!({ "program": program, "types": types })))
}

#[derive(Debug, Deserialize)]
pub struct BrowseQuery {
    pub q: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/programs/{id}/resources/{type}",
    params(
        ("id" = i32, Path, description = "Program ID"),
        ("type" = String, Path, description = "ai, tool, app, website or other")
    ),
    responses(
        (status = 200, description = "Approved resources, 9 per page"),
        (status = 404, description = "Unknown program")
    )
)]
pub async fn browse_resources(
    State(state): State<AppState>,
    claims: Claims,
    Path((program_id, type_key)): Path<(i32, String)>,
    Query(query): Query<BrowseQuery>,
) -> Result<impl IntoResponse, DomainError> {
    let resource_type = ResourceType::parse(&type_key)
        .ok_or_else(|| DomainError::Validation(format!("unknown resource type '{}'", type_key)))?;

    let program = state
        .resource_repo
        .find_program(program_id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("program {}", program_id)))?;

    let sort = ResourceSort::parse(query.sort.as_deref());
    let page = state
        .resource_repo
        .browse(ResourceFilter {
            program_id,
            resource_type,
            query: query.q.clone(),
            sort,
            page: query.page.unwrap_or(1),
        })
        .await?;

    let profile = current_profile(&state, &claims).await?;
    let favorite_ids = activity_service::favorite_ids(state.db(), profile.id).await?;

    Ok(Json(json!({
        "program": program,
        "type": resource_type.info(),
        "query": query.q.unwrap_or_default(),
        "sort": if sort == ResourceSort::TopRated { "rated" } else { "recent" },
        "resources": page.resources,
        "total": page.total,
        "page": page.page,
        "num_pages": page.num_pages,
        "favorite_ids": favorite_ids,
    })))
}
