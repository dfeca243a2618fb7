use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product master data. `unit_price` is the live master price; material rows
/// copy it at attach time and never reference it afterwards.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub unit_price: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::work_order_material::Entity")]
    WorkOrderMaterials,
}

impl Related<super::work_order_material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkOrderMaterials.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
