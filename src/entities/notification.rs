use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One notification per (event, recipient) pair. Created only by the fan-out
/// service; the recipient may flip `is_read`, nothing else mutates the row.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = Notification)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[sea_orm(nullable)]
    pub related_type: Option<String>,
    #[sea_orm(nullable)]
    pub related_id: Option<Uuid>,
    pub is_read: bool,
    pub sent_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id"
    )]
    Account,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
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
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(40))")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    #[sea_orm(string_value = "work_order_created")]
    WorkOrderCreated,
    #[sea_orm(string_value = "work_order_status_changed")]
    WorkOrderStatusChanged,
    #[sea_orm(string_value = "material_request")]
    MaterialRequest,
    #[sea_orm(string_value = "tool_assigned")]
    ToolAssigned,
    #[sea_orm(string_value = "tool_return_approved")]
    ToolReturnApproved,
    #[sea_orm(string_value = "vehicle_maintenance_due")]
    VehicleMaintenanceDue,
    #[sea_orm(string_value = "vehicle_insurance_due")]
    VehicleInsuranceDue,
}
