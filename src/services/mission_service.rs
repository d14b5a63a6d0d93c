//! Mission catalog administration. Missions are switched off, never deleted,
//! so past assignments keep pointing at a row.

use sea_orm::*;
use serde::Deserialize;

use crate::domain::DomainError;
use crate::models::mission::{self, Entity as Mission, MissionDto};

#[derive(Debug, Default, Deserialize)]
pub struct MissionUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub reward_points: Option<i32>,
    pub active: Option<bool>,
}

fn check_reward(reward: i32) -> Result<(), DomainError> {
    if reward <= 0 {
        return Err(DomainError::Validation(
            "reward_points must be positive".to_string(),
        ));
    }
    Ok(())
}

pub async fn list_missions(db: &DatabaseConnection) -> Result<Vec<mission::Model>, DomainError> {
    Ok(Mission::find()
        .order_by_asc(mission::Column::Id)
        .all(db)
        .await?)
}

pub async fn create_mission(
    db: &DatabaseConnection,
    dto: MissionDto,
) -> Result<mission::Model, DomainError> {
    let key = dto.key.trim().to_string();
    if key.is_empty() || dto.name.trim().is_empty() {
        return Err(DomainError::Validation(
            "key and name are required".to_string(),
        ));
    }
    check_reward(dto.reward_points)?;

    let taken = Mission::find()
        .filter(mission::Column::Key.eq(key.as_str()))
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(DomainError::Conflict(format!(
            "mission '{}' already exists",
            key
        )));
    }

    let saved = mission::ActiveModel {
        key: Set(key),
        name: Set(dto.name.trim().to_string()),
        description: Set(dto.description.unwrap_or_default()),
        reward_points: Set(dto.reward_points),
        active: Set(dto.active.unwrap_or(true)),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(mission = %saved.key, reward = saved.reward_points, "Mission created");
    Ok(saved)
}

pub async fn update_mission(
    db: &DatabaseConnection,
    id: i32,
    update: MissionUpdate,
) -> Result<mission::Model, DomainError> {
    let existing = Mission::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("mission {}", id)))?;

    let mut active: mission::ActiveModel = existing.into();

    if let Some(name) = update.name {
        if name.trim().is_empty() {
            return Err(DomainError::Validation("name is required".to_string()));
        }
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = update.description {
        active.description = Set(description);
    }
    if let Some(reward) = update.reward_points {
        check_reward(reward)?;
        active.reward_points = Set(reward);
    }
    if let Some(flag) = update.active {
        active.active = Set(flag);
    }

    let saved = active.update(db).await?;
    tracing::info!(mission = %saved.key, active = saved.active, "Mission updated");
    Ok(saved)
}
