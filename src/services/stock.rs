//! Warehouse stock counter mutations.
//!
//! Every mutation is a single conditional UPDATE (or an insert when the row
//! does not exist yet), so counters stay correct under concurrent requests
//! without a read-then-write window. The non-negativity invariant lives in
//! [`debit`]: the decrement only applies when enough quantity remains.

use crate::entities::warehouse_stock::{self, StockItemKind};
use crate::errors::ServiceError;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

fn keyed(
    query: sea_orm::UpdateMany<warehouse_stock::Entity>,
    warehouse_id: Uuid,
    item_id: Uuid,
    item_kind: StockItemKind,
) -> sea_orm::UpdateMany<warehouse_stock::Entity> {
    query
        .filter(warehouse_stock::Column::WarehouseId.eq(warehouse_id))
        .filter(warehouse_stock::Column::ItemId.eq(item_id))
        .filter(warehouse_stock::Column::ItemKind.eq(item_kind))
}

/// Atomically subtract `quantity` from the counter, failing with
/// `InsufficientStock` when the row is missing or holds less than `quantity`.
pub(crate) async fn debit<C: ConnectionTrait>(
    conn: &C,
    warehouse_id: Uuid,
    item_id: Uuid,
    item_kind: StockItemKind,
    quantity: i32,
) -> Result<(), ServiceError> {
    let result = keyed(
        warehouse_stock::Entity::update_many()
            .col_expr(
                warehouse_stock::Column::Quantity,
                Expr::col(warehouse_stock::Column::Quantity).sub(quantity),
            )
            .col_expr(warehouse_stock::Column::UpdatedAt, Expr::value(Utc::now())),
        warehouse_id,
        item_id,
        item_kind,
    )
    .filter(warehouse_stock::Column::Quantity.gte(quantity))
    .exec(conn)
    .await?;

    if result.rows_affected == 0 {
        return Err(ServiceError::InsufficientStock(format!(
            "warehouse {} does not hold {} unit(s) of item {}",
            warehouse_id, quantity, item_id
        )));
    }
    Ok(())
}

/// Add `quantity` back to the counter, creating the row when absent.
pub(crate) async fn credit<C: ConnectionTrait>(
    conn: &C,
    warehouse_id: Uuid,
    item_id: Uuid,
    item_kind: StockItemKind,
    quantity: i32,
) -> Result<(), ServiceError> {
    let result = keyed(
        warehouse_stock::Entity::update_many()
            .col_expr(
                warehouse_stock::Column::Quantity,
                Expr::col(warehouse_stock::Column::Quantity).add(quantity),
            )
            .col_expr(warehouse_stock::Column::UpdatedAt, Expr::value(Utc::now())),
        warehouse_id,
        item_id,
        item_kind,
    )
    .exec(conn)
    .await?;

    if result.rows_affected == 0 {
        insert_row(conn, warehouse_id, item_id, item_kind, quantity).await?;
    }
    Ok(())
}

/// Force the counter to an exact value, creating the row when absent. Used by
/// tool custody, where the counter only ever holds 0 or 1.
pub(crate) async fn set<C: ConnectionTrait>(
    conn: &C,
    warehouse_id: Uuid,
    item_id: Uuid,
    item_kind: StockItemKind,
    quantity: i32,
) -> Result<(), ServiceError> {
    let result = keyed(
        warehouse_stock::Entity::update_many()
            .col_expr(warehouse_stock::Column::Quantity, Expr::value(quantity))
            .col_expr(warehouse_stock::Column::UpdatedAt, Expr::value(Utc::now())),
        warehouse_id,
        item_id,
        item_kind,
    )
    .exec(conn)
    .await?;

    if result.rows_affected == 0 {
        insert_row(conn, warehouse_id, item_id, item_kind, quantity).await?;
    }
    Ok(())
}

async fn insert_row<C: ConnectionTrait>(
    conn: &C,
    warehouse_id: Uuid,
    item_id: Uuid,
    item_kind: StockItemKind,
    quantity: i32,
) -> Result<(), ServiceError> {
    warehouse_stock::ActiveModel {
        id: Set(Uuid::new_v4()),
        warehouse_id: Set(warehouse_id),
        item_id: Set(item_id),
        item_kind: Set(item_kind),
        quantity: Set(quantity),
        updated_at: Set(Utc::now()),
    }
    .insert(conn)
    .await?;
    Ok(())
}
