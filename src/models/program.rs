use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Academic program (career) resources are grouped by
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "programs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::resource::Entity> for Entity {
    fn to() -> RelationDef {
        super::resource_program::Relation::Resource.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::resource_program::Relation::Program.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
