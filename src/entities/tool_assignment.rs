use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Custody grant binding a tool to an account until returned.
///
/// The status literal only ever holds `assigned`, `return_requested` or
/// `returned`; a rejected return reverts the literal to `assigned` while the
/// `rejected_at`/`rejected_by` audit stamps stay in place. Rows are never
/// reused after `returned`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = ToolAssignment)]
#[sea_orm(table_name = "tool_assignments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tool_id: Uuid,
    pub warehouse_id: Uuid,
    pub assigned_to: Uuid,
    pub assigned_by: Uuid,
    pub status: ToolAssignmentStatus,
    pub assigned_at: DateTime<Utc>,
    #[sea_orm(nullable)]
    pub return_requested_at: Option<DateTime<Utc>>,
    #[sea_orm(nullable)]
    pub returned_at: Option<DateTime<Utc>>,
    #[sea_orm(nullable)]
    pub approved_at: Option<DateTime<Utc>>,
    #[sea_orm(nullable)]
    pub approved_by: Option<Uuid>,
    #[sea_orm(nullable)]
    pub rejected_at: Option<DateTime<Utc>>,
    #[sea_orm(nullable)]
    pub rejected_by: Option<Uuid>,
    #[sea_orm(nullable)]
    pub assign_notes: Option<String>,
    #[sea_orm(nullable)]
    pub return_notes: Option<String>,
    #[sea_orm(nullable)]
    pub approve_notes: Option<String>,
    #[sea_orm(nullable)]
    pub reject_notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tool::Entity",
        from = "Column::ToolId",
        to = "super::tool::Column::Id"
    )]
    Tool,
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AssignedTo",
        to = "super::account::Column::Id"
    )]
    Assignee,
}

impl Related<super::tool::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tool.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum ToolAssignmentStatus {
    #[sea_orm(string_value = "assigned")]
    Assigned,
    #[sea_orm(string_value = "return_requested")]
    ReturnRequested,
    #[sea_orm(string_value = "returned")]
    Returned,
}
