use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tool master data (read-only collaborator).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tools")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tool_assignment::Entity")]
    ToolAssignments,
}

impl Related<super::tool_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ToolAssignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
