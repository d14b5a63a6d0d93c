use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An assignable daily task. Disabled through `active`, never deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "missions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub key: String,
    pub name: String,
    pub description: String,
    pub reward_points: i32,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::daily_mission::Entity")]
    DailyMission,
}

impl Related<super::daily_mission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailyMission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Deserialize)]
pub struct MissionDto {
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub reward_points: i32,
    pub active: Option<bool>,
}
