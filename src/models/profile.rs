use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Gamification state attached 1:1 to a user
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub user_id: i32,
    #[sea_orm(unique)]
    pub national_id: String,
    pub program_id: Option<i32>,
    pub points: i32,
    pub current_streak: i32, // 0 = never logged in
    pub last_streak_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::program::Entity",
        from = "Column::ProgramId",
        to = "super::program::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Program,
    #[sea_orm(has_many = "super::daily_mission::Entity")]
    DailyMission,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::program::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Program.def()
    }
}

impl Related<super::daily_mission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailyMission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
