//! Favourites and visit history of a profile

use chrono::{DateTime, Utc};
use sea_orm::*;
use serde::Serialize;
use std::collections::HashSet;

use crate::domain::DomainError;
use crate::domain::gamification::MissionKey;
use crate::models::favorite::{self, Entity as Favorite};
use crate::models::resource::{self, Entity as Resource};
use crate::models::visit::{self, Entity as Visit};
use crate::services::gamification_service::{self, MissionCompletion};

/// Distinct resources listed as "recently visited"
pub const RECENT_VISITS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct VisitOutcome {
    pub visit_id: i32,
    pub mission: MissionCompletion,
}

async fn ensure_resource<C: ConnectionTrait>(db: &C, resource_id: i32) -> Result<(), DomainError> {
    match Resource::find_by_id(resource_id).one(db).await? {
        Some(_) => Ok(()),
        None => Err(DomainError::NotFound(format!("resource {}", resource_id))),
    }
}

/// Add or remove a resource from the favourites. Returns the new membership.
pub async fn toggle_favorite(
    db: &DatabaseConnection,
    profile_id: i32,
    resource_id: i32,
) -> Result<bool, DomainError> {
    ensure_resource(db, resource_id).await?;

    let removed = Favorite::delete_many()
        .filter(favorite::Column::ProfileId.eq(profile_id))
        .filter(favorite::Column::ResourceId.eq(resource_id))
        .exec(db)
        .await?;

    if removed.rows_affected > 0 {
        tracing::debug!(profile_id, resource_id, "Favourite removed");
        return Ok(false);
    }

    Favorite::insert(favorite::ActiveModel {
        profile_id: Set(profile_id),
        resource_id: Set(resource_id),
    })
    .on_conflict(
        sea_query::OnConflict::columns([favorite::Column::ProfileId, favorite::Column::ResourceId])
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(db)
    .await?;

    tracing::debug!(profile_id, resource_id, "Favourite added");
    Ok(true)
}

pub async fn is_favorite<C: ConnectionTrait>(
    db: &C,
    profile_id: i32,
    resource_id: i32,
) -> Result<bool, DomainError> {
    let found = Favorite::find()
        .filter(favorite::Column::ProfileId.eq(profile_id))
        .filter(favorite::Column::ResourceId.eq(resource_id))
        .one(db)
        .await?;
    Ok(found.is_some())
}

/// IDs of the profile's favourite resources, newest resource first
pub async fn favorite_ids<C: ConnectionTrait>(
    db: &C,
    profile_id: i32,
) -> Result<Vec<i32>, DomainError> {
    let ids: Vec<i32> = Favorite::find()
        .filter(favorite::Column::ProfileId.eq(profile_id))
        .all(db)
        .await?
        .into_iter()
        .map(|f| f.resource_id)
        .collect();

    if ids.is_empty() {
        return Ok(ids);
    }

    Ok(Resource::find()
        .filter(resource::Column::Id.is_in(ids))
        .order_by_desc(resource::Column::CreatedAt)
        .order_by_desc(resource::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|r| r.id)
        .collect())
}

/// Append to the visit history, then credit the visit_resource mission
pub async fn record_visit(
    db: &DatabaseConnection,
    profile_id: i32,
    resource_id: i32,
    now: DateTime<Utc>,
) -> Result<VisitOutcome, DomainError> {
    ensure_resource(db, resource_id).await?;

    let saved = visit::ActiveModel {
        profile_id: Set(profile_id),
        resource_id: Set(resource_id),
        visited_at: Set(now.to_rfc3339()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::debug!(profile_id, resource_id, "Visit recorded");

    let mission =
        gamification_service::complete_mission(db, profile_id, MissionKey::VisitResource, now)
            .await?;

    Ok(VisitOutcome {
        visit_id: saved.id,
        mission,
    })
}

/// Last `limit` distinct resources visited, most recent first
pub async fn recent_visit_ids<C: ConnectionTrait>(
    db: &C,
    profile_id: i32,
    limit: usize,
) -> Result<Vec<i32>, DomainError> {
    let visits = Visit::find()
        .filter(visit::Column::ProfileId.eq(profile_id))
        .order_by_desc(visit::Column::VisitedAt)
        .order_by_desc(visit::Column::Id)
        .all(db)
        .await?;

    Ok(distinct_in_order(visits.into_iter().map(|v| v.resource_id), limit))
}

fn distinct_in_order(ids: impl Iterator<Item = i32>, limit: usize) -> Vec<i32> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::distinct_in_order;

    #[test]
    fn recent_visits_skip_repeats() {
        let ids = [3, 3, 1, 2, 1, 4, 5, 6];
        assert_eq!(distinct_in_order(ids.into_iter(), 5), vec![3, 1, 2, 4, 5]);
        assert_eq!(distinct_in_order([7, 7].into_iter(), 5), vec![7]);
    }
}
