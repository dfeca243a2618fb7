use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Vehicle master data. The due-date columns feed the maintenance scanner;
/// the `*_notified_on` stamps gate same-day duplicate alerts.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub plate: String,
    pub active: bool,
    #[sea_orm(nullable)]
    pub next_maintenance_date: Option<Date>,
    #[sea_orm(nullable)]
    pub kasko_expiry_date: Option<Date>,
    #[sea_orm(nullable)]
    pub maintenance_notified_on: Option<Date>,
    #[sea_orm(nullable)]
    pub insurance_notified_on: Option<Date>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::vehicle_usage_log::Entity")]
    UsageLogs,
}

impl Related<super::vehicle_usage_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UsageLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
