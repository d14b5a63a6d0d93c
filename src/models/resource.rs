use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "resources")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub description: String,
    pub ideal_use: Option<String>, // one use per line
    pub url: String,
    pub resource_type: String, // 'app', 'tool', 'website', 'ai', 'other'
    pub status: String,        // 'pending', 'approved', 'rejected'
    pub suggested_by: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SuggestedBy",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    SuggestedBy,
    #[sea_orm(has_many = "super::rating::Entity")]
    Rating,
}

impl Related<super::rating::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rating.def()
    }
}

impl Related<super::program::Entity> for Entity {
    fn to() -> RelationDef {
        super::resource_program::Relation::Program.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::resource_program::Relation::Resource.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
