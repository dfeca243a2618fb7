//! Work order lifecycle, material ledger, and form updates.
//!
//! All writes for one operation share a transaction; the matching outbox row
//! is enqueued inside it. Notification fan-out runs after commit and is
//! best-effort.

use crate::auth::{AuthContext, Role};
use crate::db::DbPool;
use crate::entities::notification::NotificationKind;
use crate::entities::warehouse_stock::StockItemKind;
use crate::entities::work_order::{
    self, format_order_number, WorkOrderPriority, WorkOrderStatus,
};
use crate::entities::{
    customer, product, service_template, vehicle_usage_log, work_order_assignee,
    work_order_material,
};
use crate::errors::ServiceError;
use crate::events::{outbox, Event};
use crate::services::notifications::{NotificationEvent, NotificationService};
use crate::services::stock;
use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use sea_orm::error::SqlErr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Bounded retries for order-number allocation under concurrent creates.
const ORDER_NUMBER_RETRIES: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateWorkOrderInput {
    pub customer_id: Uuid,
    pub device_id: Option<Uuid>,
    pub service_id: Uuid,
    #[serde(default = "default_priority")]
    pub priority: WorkOrderPriority,
    pub scheduled_at: Option<DateTime<Utc>>,
    /// At least one technician must be assigned at creation.
    #[validate(length(min = 1))]
    pub assignee_ids: Vec<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub work_description: Option<String>,
}

fn default_priority() -> WorkOrderPriority {
    WorkOrderPriority::Normal
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransitionInput {
    pub target: WorkOrderStatus,
    /// When true and no coordinates are supplied, entering `in_progress`
    /// fails instead of recording "not captured".
    #[serde(default)]
    pub location_required: bool,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub address: Option<String>,
    /// Vehicle taken out for the job; set on the order when entering
    /// `in_progress` and preferred over the vehicle chosen at creation.
    pub vehicle_id: Option<Uuid>,
    /// Odometer at departure; opens the vehicle usage log on `in_progress`.
    pub vehicle_start_km: Option<i32>,
    /// Odometer at completion; ignored when it regresses below the start.
    pub vehicle_end_km: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AttachMaterialInput {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateMaterialPriceInput {
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateFormInput {
    pub form_data: Option<JsonValue>,
    pub work_description: Option<String>,
    pub before_photos: Option<JsonValue>,
    pub after_photos: Option<JsonValue>,
    pub customer_signature: Option<String>,
    pub technician_signature: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkOrderFilter {
    pub status: Option<WorkOrderStatus>,
    pub assignee_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct WorkOrderService {
    db: DbPool,
    notifications: NotificationService,
}

impl WorkOrderService {
    pub fn new(db: DbPool, notifications: NotificationService) -> Self {
        Self { db, notifications }
    }

    /// Create a work order in `pending`, allocating the next `WO-<year>-<seq>`
    /// number. Allocation races resolve through the unique (year, seq) index:
    /// the loser retries with a fresh sequence.
    #[instrument(skip(self, input), fields(customer_id = %input.customer_id))]
    pub async fn create(
        &self,
        auth: &AuthContext,
        input: CreateWorkOrderInput,
    ) -> Result<work_order::Model, ServiceError> {
        input.validate()?;

        customer::Entity::find_by_id(input.customer_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("customer {} not found", input.customer_id))
            })?;
        service_template::Entity::find_by_id(input.service_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("service {} not found", input.service_id))
            })?;

        let year = Utc::now().year();
        let mut attempts = 0;
        let order = loop {
            attempts += 1;
            match self.try_insert(auth, &input, year).await {
                Ok(order) => break order,
                Err(e) if is_unique_violation(&e) && attempts < ORDER_NUMBER_RETRIES => {
                    continue;
                }
                Err(e) if is_unique_violation(&e) => {
                    return Err(ServiceError::Conflict(
                        "could not allocate a work order number, please retry".into(),
                    ));
                }
                Err(e) => return Err(e),
            }
        };

        info!(order_number = %order.order_number, "work order created");
        self.notifications
            .send_best_effort(NotificationEvent {
                kind: NotificationKind::WorkOrderCreated,
                title: "New work order".into(),
                message: format!("Work order {} was created", order.order_number),
                target_roles: vec![
                    Role::FieldStaff,
                    Role::FieldSupervisor,
                    Role::OfficeSupervisor,
                ],
                related: Some(("work_order", order.id)),
                excluded_accounts: vec![auth.account_id],
            })
            .await;

        Ok(order)
    }

    async fn try_insert(
        &self,
        auth: &AuthContext,
        input: &CreateWorkOrderInput,
        year: i32,
    ) -> Result<work_order::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let max_seq: Option<i32> = work_order::Entity::find()
            .select_only()
            .column_as(work_order::Column::OrderSeq.max(), "max_seq")
            .filter(work_order::Column::OrderYear.eq(year))
            .into_tuple()
            .one(&txn)
            .await?
            .flatten();
        let seq = max_seq.unwrap_or(0) + 1;

        let now = Utc::now();
        let id = Uuid::new_v4();
        let order = work_order::ActiveModel {
            id: Set(id),
            order_number: Set(format_order_number(year, seq)),
            order_year: Set(year),
            order_seq: Set(seq),
            customer_id: Set(input.customer_id),
            device_id: Set(input.device_id),
            service_id: Set(input.service_id),
            priority: Set(input.priority),
            status: Set(WorkOrderStatus::Pending),
            scheduled_at: Set(input.scheduled_at),
            started_at: Set(None),
            completed_at: Set(None),
            cancelled_at: Set(None),
            latitude: Set(None),
            longitude: Set(None),
            address: Set(None),
            vehicle_id: Set(input.vehicle_id),
            vehicle_start_km: Set(None),
            vehicle_end_km: Set(None),
            form_data: Set(None),
            work_description: Set(input.work_description.clone()),
            before_photos: Set(None),
            after_photos: Set(None),
            customer_signature: Set(None),
            technician_signature: Set(None),
            created_by: Set(auth.account_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let assignees: Vec<work_order_assignee::ActiveModel> = input
            .assignee_ids
            .iter()
            .map(|account_id| work_order_assignee::ActiveModel {
                work_order_id: Set(id),
                account_id: Set(*account_id),
            })
            .collect();
        work_order_assignee::Entity::insert_many(assignees)
            .exec(&txn)
            .await?;

        outbox::enqueue(
            &txn,
            &Event::WorkOrderCreated {
                work_order_id: id,
                order_number: order.order_number.clone(),
            },
        )
        .await?;

        txn.commit().await?;
        Ok(order)
    }

    /// Drive the order through one legal transition, applying the per-target
    /// side effects (timestamps, geolocation, vehicle usage ledger).
    #[instrument(skip(self, input), fields(target = input.target.as_str()))]
    pub async fn transition(
        &self,
        auth: &AuthContext,
        work_order_id: Uuid,
        input: TransitionInput,
    ) -> Result<work_order::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let order = work_order::Entity::find_by_id(work_order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("work order {} not found", work_order_id))
            })?;

        if !auth.role.is_admin_equivalent() {
            let is_assignee =
                work_order_assignee::Entity::find_by_id((work_order_id, auth.account_id))
                    .one(&txn)
                    .await?
                    .is_some();
            if !is_assignee {
                return Err(ServiceError::Forbidden(
                    "only administrators or assigned technicians can move this work order".into(),
                ));
            }
        }

        let old_status = order.status;
        if !old_status.can_transition_to(input.target) {
            return Err(ServiceError::InvalidTransition(format!(
                "work order {} cannot move from {} to {}",
                order.order_number,
                old_status.as_str(),
                input.target.as_str()
            )));
        }

        let now = Utc::now();
        let vehicle_id = input.vehicle_id.or(order.vehicle_id);
        let start_km_on_order = order.vehicle_start_km;
        let mut active: work_order::ActiveModel = order.into();
        active.status = Set(input.target);
        active.updated_at = Set(now);

        match input.target {
            WorkOrderStatus::InProgress => {
                if input.location_required && input.latitude.is_none() && input.longitude.is_none()
                {
                    return Err(ServiceError::LocationUnavailable(
                        "location capture was required but no coordinates were supplied".into(),
                    ));
                }
                active.started_at = Set(Some(now));
                if input.latitude.is_some() {
                    active.latitude = Set(input.latitude);
                }
                if input.longitude.is_some() {
                    active.longitude = Set(input.longitude);
                }
                if input.address.is_some() {
                    active.address = Set(input.address.clone());
                }
                if input.vehicle_id.is_some() {
                    active.vehicle_id = Set(input.vehicle_id);
                }
                if let (Some(vehicle_id), Some(start_km)) = (vehicle_id, input.vehicle_start_km) {
                    active.vehicle_start_km = Set(Some(start_km));
                    vehicle_usage_log::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        vehicle_id: Set(vehicle_id),
                        work_order_id: Set(work_order_id),
                        started_at: Set(now),
                        start_km: Set(start_km),
                        ended_at: Set(None),
                        end_km: Set(None),
                    }
                    .insert(&txn)
                    .await?;
                }
            }
            WorkOrderStatus::Completed => {
                active.completed_at = Set(Some(now));
                if let (Some(start_km), Some(end_km)) = (start_km_on_order, input.vehicle_end_km) {
                    // odometer regressions are ignored, not rejected
                    if end_km >= start_km {
                        active.vehicle_end_km = Set(Some(end_km));
                        let open_log = vehicle_usage_log::Entity::find()
                            .filter(vehicle_usage_log::Column::WorkOrderId.eq(work_order_id))
                            .filter(vehicle_usage_log::Column::EndedAt.is_null())
                            .one(&txn)
                            .await?;
                        if let Some(log) = open_log {
                            let mut log: vehicle_usage_log::ActiveModel = log.into();
                            log.ended_at = Set(Some(now));
                            log.end_km = Set(Some(end_km));
                            log.update(&txn).await?;
                        }
                    }
                }
            }
            WorkOrderStatus::Cancelled => {
                active.cancelled_at = Set(Some(now));
            }
            // reverts keep the audit stamps already on the row
            WorkOrderStatus::Pending => {}
        }

        let updated = active.update(&txn).await?;
        outbox::enqueue(
            &txn,
            &Event::WorkOrderStatusChanged {
                work_order_id,
                old_status,
                new_status: input.target,
            },
        )
        .await?;
        txn.commit().await?;

        let mut targets = vec![Role::FieldSupervisor, Role::OfficeSupervisor];
        if input.target == WorkOrderStatus::Completed {
            targets.push(Role::AccountingStaff);
        }
        self.notifications
            .send_best_effort(NotificationEvent {
                kind: NotificationKind::WorkOrderStatusChanged,
                title: "Work order status changed".into(),
                message: format!(
                    "Work order {} moved from {} to {}",
                    updated.order_number,
                    old_status.as_str(),
                    input.target.as_str()
                ),
                target_roles: targets,
                related: Some(("work_order", updated.id)),
                excluded_accounts: vec![auth.account_id],
            })
            .await;

        Ok(updated)
    }

    /// Attach a material to the order, atomically debiting warehouse stock
    /// and snapshotting the product's current price.
    #[instrument(skip(self, input))]
    pub async fn attach_material(
        &self,
        auth: &AuthContext,
        work_order_id: Uuid,
        input: AttachMaterialInput,
    ) -> Result<work_order_material::Model, ServiceError> {
        input.validate()?;
        let txn = self.db.begin().await?;

        let order = work_order::Entity::find_by_id(work_order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("work order {} not found", work_order_id))
            })?;
        if order.status.is_terminal() {
            return Err(ServiceError::Conflict(format!(
                "work order {} is completed and immutable",
                order.order_number
            )));
        }

        let product = product::Entity::find_by_id(input.product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("product {} not found", input.product_id))
            })?;

        stock::debit(
            &txn,
            input.warehouse_id,
            input.product_id,
            StockItemKind::Product,
            input.quantity,
        )
        .await?;

        let material = work_order_material::ActiveModel {
            id: Set(Uuid::new_v4()),
            work_order_id: Set(work_order_id),
            product_id: Set(input.product_id),
            warehouse_id: Set(input.warehouse_id),
            quantity: Set(input.quantity),
            unit_price: Set(product.unit_price),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;

        outbox::enqueue(
            &txn,
            &Event::MaterialRequested {
                work_order_id,
                product_id: input.product_id,
                warehouse_id: input.warehouse_id,
                quantity: input.quantity,
            },
        )
        .await?;
        txn.commit().await?;

        self.notifications
            .send_best_effort(NotificationEvent {
                kind: NotificationKind::MaterialRequest,
                title: "Material used".into(),
                message: format!(
                    "Work order {} used {} x {}",
                    order.order_number, input.quantity, product.name
                ),
                target_roles: vec![Role::InventoryStaff, Role::OfficeStaff],
                related: Some(("work_order", work_order_id)),
                excluded_accounts: vec![auth.account_id],
            })
            .await;

        Ok(material)
    }

    /// Detach a material row and credit its quantity back to the warehouse.
    #[instrument(skip(self))]
    pub async fn detach_material(
        &self,
        _auth: &AuthContext,
        material_id: Uuid,
    ) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;

        let material = work_order_material::Entity::find_by_id(material_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("material {} not found", material_id))
            })?;
        let order = work_order::Entity::find_by_id(material.work_order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("work order {} not found", material.work_order_id))
            })?;
        if order.status.is_terminal() {
            return Err(ServiceError::Conflict(format!(
                "work order {} is completed and immutable",
                order.order_number
            )));
        }

        work_order_material::Entity::delete_by_id(material_id)
            .exec(&txn)
            .await?;
        stock::credit(
            &txn,
            material.warehouse_id,
            material.product_id,
            StockItemKind::Product,
            material.quantity,
        )
        .await?;

        outbox::enqueue(
            &txn,
            &Event::MaterialDetached {
                work_order_id: material.work_order_id,
                product_id: material.product_id,
                warehouse_id: material.warehouse_id,
                quantity: material.quantity,
            },
        )
        .await?;
        txn.commit().await?;
        Ok(())
    }

    /// Correct the snapshot price on an attached material. Stock is untouched.
    pub async fn update_material_price(
        &self,
        auth: &AuthContext,
        material_id: Uuid,
        input: UpdateMaterialPriceInput,
    ) -> Result<work_order_material::Model, ServiceError> {
        auth.require_admin()?;
        if input.unit_price <= Decimal::ZERO {
            return Err(ServiceError::Validation("unit price must be positive".into()));
        }

        let material = work_order_material::Entity::find_by_id(material_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("material {} not found", material_id))
            })?;

        let mut active: work_order_material::ActiveModel = material.into();
        active.unit_price = Set(input.unit_price);
        Ok(active.update(&self.db).await?)
    }

    /// Merge service form data, free-text description, photos, and signatures
    /// into the order. Allowed in any status, including after completion.
    #[instrument(skip(self, input))]
    pub async fn update_form(
        &self,
        _auth: &AuthContext,
        work_order_id: Uuid,
        input: UpdateFormInput,
    ) -> Result<work_order::Model, ServiceError> {
        let order = work_order::Entity::find_by_id(work_order_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("work order {} not found", work_order_id))
            })?;

        let existing_form = order.form_data.clone();
        let service_id = order.service_id;
        let mut active: work_order::ActiveModel = order.into();

        if let Some(form) = &input.form_data {
            let template = service_template::Entity::find_by_id(service_id)
                .one(&self.db)
                .await?;
            let schema = template.as_ref().and_then(|t| t.form_schema.as_ref());
            validate_form_data(form, schema)?;

            let mut merged = existing_form.unwrap_or_else(|| serde_json::json!({}));
            if let (Some(dst), Some(src)) = (merged.as_object_mut(), form.as_object()) {
                for (key, value) in src {
                    dst.insert(key.clone(), value.clone());
                }
            }
            active.form_data = Set(Some(merged));
        }
        if input.work_description.is_some() {
            active.work_description = Set(input.work_description.clone());
        }
        if input.before_photos.is_some() {
            active.before_photos = Set(input.before_photos.clone());
        }
        if input.after_photos.is_some() {
            active.after_photos = Set(input.after_photos.clone());
        }
        if input.customer_signature.is_some() {
            active.customer_signature = Set(input.customer_signature.clone());
        }
        if input.technician_signature.is_some() {
            active.technician_signature = Set(input.technician_signature.clone());
        }
        active.updated_at = Set(Utc::now());

        Ok(active.update(&self.db).await?)
    }

    pub async fn get(&self, work_order_id: Uuid) -> Result<work_order::Model, ServiceError> {
        work_order::Entity::find_by_id(work_order_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("work order {} not found", work_order_id))
            })
    }

    pub async fn list(
        &self,
        filter: WorkOrderFilter,
    ) -> Result<Vec<work_order::Model>, ServiceError> {
        let mut query = work_order::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(work_order::Column::Status.eq(status));
        }
        if let Some(assignee_id) = filter.assignee_id {
            query = query
                .join(JoinType::InnerJoin, work_order::Relation::Assignees.def())
                .filter(work_order_assignee::Column::AccountId.eq(assignee_id));
        }
        Ok(query
            .order_by_desc(work_order::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    pub async fn list_materials(
        &self,
        work_order_id: Uuid,
    ) -> Result<Vec<work_order_material::Model>, ServiceError> {
        Ok(work_order_material::Entity::find()
            .filter(work_order_material::Column::WorkOrderId.eq(work_order_id))
            .order_by_asc(work_order_material::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }
}

fn is_unique_violation(err: &ServiceError) -> bool {
    matches!(
        err,
        ServiceError::DatabaseError(db_err)
            if matches!(db_err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
    )
}

/// Check submitted form values against the service template's declared field
/// schema: `{ "<field>": "string" | "number" | "boolean" | "array" | "object" }`.
/// Unknown fields and wrong primitive types are rejected; templates without a
/// schema accept any object.
fn validate_form_data(
    form: &JsonValue,
    schema: Option<&JsonValue>,
) -> Result<(), ServiceError> {
    let fields = form
        .as_object()
        .ok_or_else(|| ServiceError::Validation("form_data must be a JSON object".into()))?;

    let Some(schema) = schema.and_then(|s| s.as_object()) else {
        return Ok(());
    };

    for (key, value) in fields {
        let expected = schema
            .get(key)
            .ok_or_else(|| ServiceError::Validation(format!("unknown form field '{}'", key)))?
            .as_str()
            .unwrap_or("any");
        let matches_type = match expected {
            "string" => value.is_string(),
            "number" => value.is_number(),
            "boolean" => value.is_boolean(),
            "array" => value.is_array(),
            "object" => value.is_object(),
            _ => true,
        };
        if !matches_type && !value.is_null() {
            return Err(ServiceError::Validation(format!(
                "form field '{}' must be of type {}",
                key, expected
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn form_data_must_be_object() {
        let err = validate_form_data(&json!([1, 2]), None).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn schemaless_template_accepts_any_object() {
        assert!(validate_form_data(&json!({"anything": 1}), None).is_ok());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let schema = json!({"voltage": "number"});
        let err = validate_form_data(&json!({"current": 5}), Some(&schema)).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn wrong_primitive_type_is_rejected() {
        let schema = json!({"voltage": "number", "notes": "string"});
        assert!(validate_form_data(&json!({"voltage": 230}), Some(&schema)).is_ok());
        let err =
            validate_form_data(&json!({"voltage": "high"}), Some(&schema)).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn null_values_pass_type_checks() {
        let schema = json!({"notes": "string"});
        assert!(validate_form_data(&json!({"notes": null}), Some(&schema)).is_ok());
    }
}
