use chrono::{DateTime, Utc};
use sea_orm::*;
use serde::Serialize;

use crate::domain::DomainError;
use crate::domain::catalog::ResourceStatus;
use crate::domain::gamification::MissionKey;
use crate::models::rating::{self, Entity as Rating, RatingDto};
use crate::models::resource::Entity as Resource;
use crate::models::user::Entity as User;
use crate::services::gamification_service::{self, MissionCompletion};

/// A rating as shown on a resource page
#[derive(Debug, Clone, Serialize)]
pub struct RatingView {
    pub id: i32,
    pub user_id: i32,
    pub author: String,
    pub score: i32,
    pub comment: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RatingOutcome {
    pub rating_id: i32,
    /// Rounded to one decimal
    pub average: f64,
    pub count: u64,
    pub mission: MissionCompletion,
}

/// Validate and store a rating, then credit the rate_resource mission.
///
/// The rating is committed before the mission fires; a failing mission
/// does not undo it.
pub async fn add_rating(
    db: &DatabaseConnection,
    resource_id: i32,
    user_id: i32,
    dto: RatingDto,
    now: DateTime<Utc>,
) -> Result<RatingOutcome, DomainError> {
    if !(1..=5).contains(&dto.score) {
        return Err(DomainError::Validation(
            "score must be between 1 and 5".to_string(),
        ));
    }
    let comment = dto.comment.trim();
    if comment.is_empty() {
        return Err(DomainError::Validation("comment is required".to_string()));
    }

    let resource = Resource::find_by_id(resource_id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("resource {}", resource_id)))?;
    if resource.status != ResourceStatus::Approved.as_str() {
        return Err(DomainError::Validation(
            "only approved resources can be rated".to_string(),
        ));
    }

    let already = Rating::find()
        .filter(rating::Column::ResourceId.eq(resource_id))
        .filter(rating::Column::UserId.eq(user_id))
        .one(db)
        .await?;
    if already.is_some() {
        return Err(DomainError::Conflict(
            "you already rated this resource".to_string(),
        ));
    }

    let saved = rating::ActiveModel {
        resource_id: Set(resource_id),
        user_id: Set(user_id),
        score: Set(dto.score),
        comment: Set(comment.to_string()),
        created_at: Set(now.to_rfc3339()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            DomainError::Conflict("you already rated this resource".to_string())
        }
        _ => DomainError::from(e),
    })?;

    tracing::info!(resource_id, user_id, score = dto.score, "Rating added");

    let mission = gamification_service::complete_mission_for_user(
        db,
        user_id,
        MissionKey::RateResource,
        now,
    )
    .await?;

    let (average, count) = average_for(db, resource_id).await?;

    Ok(RatingOutcome {
        rating_id: saved.id,
        average,
        count,
        mission,
    })
}

/// Average score (one decimal, 0.0 when unrated) and number of ratings
pub async fn average_for<C: ConnectionTrait>(
    db: &C,
    resource_id: i32,
) -> Result<(f64, u64), DomainError> {
    let scores: Vec<i32> = Rating::find()
        .filter(rating::Column::ResourceId.eq(resource_id))
        .all(db)
        .await?
        .into_iter()
        .map(|r| r.score)
        .collect();

    Ok((round_one_decimal(&scores), scores.len() as u64))
}

/// Ratings of a resource, newest first
pub async fn ratings_for_resource<C: ConnectionTrait>(
    db: &C,
    resource_id: i32,
) -> Result<Vec<RatingView>, DomainError> {
    let rows = Rating::find()
        .filter(rating::Column::ResourceId.eq(resource_id))
        .order_by_desc(rating::Column::CreatedAt)
        .order_by_desc(rating::Column::Id)
        .find_also_related(User)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(r, author)| RatingView {
            id: r.id,
            user_id: r.user_id,
            author: author
                .map(|u| u.display_name())
                .unwrap_or_else(|| "unknown".to_string()),
            score: r.score,
            comment: r.comment,
            created_at: r.created_at,
        })
        .collect())
}

pub fn round_one_decimal(scores: &[i32]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let sum: i64 = scores.iter().map(|s| i64::from(*s)).sum();
    let mean = sum as f64 / scores.len() as f64;
    (mean * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::round_one_decimal;

    #[test]
    fn average_is_rounded() {
        assert_eq!(round_one_decimal(&[]), 0.0);
        assert_eq!(round_one_decimal(&[5]), 5.0);
        assert_eq!(round_one_decimal(&[4, 5, 5]), 4.7);
        assert_eq!(round_one_decimal(&[1, 2]), 1.5);
    }
}
