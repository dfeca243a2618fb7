use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Work order row. Mutated only through the state machine and the
/// material/form update operations; never physically deleted here.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = WorkOrder)]
#[sea_orm(table_name = "work_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Human-readable `WO-<year>-<6-digit seq>`; unique, monotonic per year.
    #[sea_orm(unique)]
    pub order_number: String,
    pub order_year: i32,
    pub order_seq: i32,
    pub customer_id: Uuid,
    #[sea_orm(nullable)]
    pub device_id: Option<Uuid>,
    pub service_id: Uuid,
    pub priority: WorkOrderPriority,
    pub status: WorkOrderStatus,
    #[sea_orm(nullable)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[sea_orm(nullable)]
    pub started_at: Option<DateTime<Utc>>,
    #[sea_orm(nullable)]
    pub completed_at: Option<DateTime<Utc>>,
    #[sea_orm(nullable)]
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Geolocation captured on entering in_progress, never before.
    #[sea_orm(column_type = "Decimal(Some((10, 7)))", nullable)]
    pub latitude: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((10, 7)))", nullable)]
    pub longitude: Option<Decimal>,
    #[sea_orm(nullable)]
    pub address: Option<String>,
    #[sea_orm(nullable)]
    pub vehicle_id: Option<Uuid>,
    #[sea_orm(nullable)]
    pub vehicle_start_km: Option<i32>,
    #[sea_orm(nullable)]
    pub vehicle_end_km: Option<i32>,
    #[sea_orm(column_type = "Json", nullable)]
    pub form_data: Option<Json>,
    #[sea_orm(nullable)]
    pub work_description: Option<String>,
    #[sea_orm(column_type = "Json", nullable)]
    pub before_photos: Option<Json>,
    #[sea_orm(column_type = "Json", nullable)]
    pub after_photos: Option<Json>,
    #[sea_orm(nullable)]
    pub customer_signature: Option<String>,
    #[sea_orm(nullable)]
    pub technician_signature: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::service_template::Entity",
        from = "Column::ServiceId",
        to = "super::service_template::Column::Id"
    )]
    ServiceTemplate,
    #[sea_orm(has_many = "super::work_order_assignee::Entity")]
    Assignees,
    #[sea_orm(has_many = "super::work_order_material::Entity")]
    Materials,
    #[sea_orm(has_many = "super::vehicle_usage_log::Entity")]
    UsageLogs,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::service_template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceTemplate.def()
    }
}

impl Related<super::work_order_assignee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignees.def()
    }
}

impl Related<super::work_order_material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Materials.def()
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
pub enum WorkOrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

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
pub enum WorkOrderPriority {
    #[sea_orm(string_value = "low")]
    Low,
    #[sea_orm(string_value = "normal")]
    Normal,
    #[sea_orm(string_value = "high")]
    High,
    #[sea_orm(string_value = "urgent")]
    Urgent,
}

/// The single legal-transition table. Every call site consults this instead
/// of re-deriving legality. `pending -> completed` is deliberately listed:
/// the business tolerates paperwork-only orders that skip execution.
pub const LEGAL_TRANSITIONS: &[(WorkOrderStatus, WorkOrderStatus)] = &[
    (WorkOrderStatus::Pending, WorkOrderStatus::InProgress),
    (WorkOrderStatus::InProgress, WorkOrderStatus::Completed),
    (WorkOrderStatus::Pending, WorkOrderStatus::Completed),
    (WorkOrderStatus::InProgress, WorkOrderStatus::Pending),
    (WorkOrderStatus::Pending, WorkOrderStatus::Cancelled),
    (WorkOrderStatus::InProgress, WorkOrderStatus::Cancelled),
    (WorkOrderStatus::Cancelled, WorkOrderStatus::Pending),
];

impl WorkOrderStatus {
    pub fn can_transition_to(self, target: WorkOrderStatus) -> bool {
        LEGAL_TRANSITIONS.contains(&(self, target))
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, WorkOrderStatus::Completed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WorkOrderStatus::Pending => "pending",
            WorkOrderStatus::InProgress => "in_progress",
            WorkOrderStatus::Completed => "completed",
            WorkOrderStatus::Cancelled => "cancelled",
        }
    }
}

/// Format an order number from its parts.
pub fn format_order_number(year: i32, seq: i32) -> String {
    format!("WO-{}-{:06}", year, seq)
}

#[cfg(test)]
mod tests {
    use super::WorkOrderStatus::*;
    use super::*;

    #[test]
    fn transition_table_matches_lifecycle() {
        assert!(Pending.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Pending));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(InProgress.can_transition_to(Cancelled));
        assert!(Cancelled.can_transition_to(Pending));

        // completed is immutable
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(InProgress));
        // cancelled cannot jump straight back into execution
        assert!(!Cancelled.can_transition_to(InProgress));
        assert!(!Cancelled.can_transition_to(Completed));
        // no self-transitions
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn order_number_format() {
        assert_eq!(format_order_number(2025, 1), "WO-2025-000001");
        assert_eq!(format_order_number(2025, 123456), "WO-2025-123456");
    }
}
