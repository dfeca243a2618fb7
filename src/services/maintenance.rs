//! Maintenance-due scanner.
//!
//! Sweeps active vehicles for overdue maintenance and expired insurance and
//! alerts the manager tier. Each condition carries its own `*_notified_on`
//! stamp so a second run on the same day does not duplicate alerts; the stamp
//! and the outbox row commit together, the fan-out follows after.

use crate::db::DbPool;
use crate::entities::notification::NotificationKind;
use crate::entities::vehicle;
use crate::errors::ServiceError;
use crate::events::{outbox, Event};
use crate::services::notifications::{NotificationEvent, NotificationService};
use chrono::NaiveDate;
use sea_orm::sea_query::Condition;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::Serialize;
use tracing::{info, instrument};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Default, Serialize, ToSchema)]
pub struct ScanSummary {
    pub maintenance_due: usize,
    pub insurance_due: usize,
    pub notifications_sent: usize,
}

#[derive(Clone)]
pub struct MaintenanceService {
    db: DbPool,
    notifications: NotificationService,
}

impl MaintenanceService {
    pub fn new(db: DbPool, notifications: NotificationService) -> Self {
        Self { db, notifications }
    }

    /// Run both sweeps as of `today`. A vehicle can match both conditions and
    /// then produces two alerts.
    #[instrument(skip(self))]
    pub async fn scan(&self, today: NaiveDate) -> Result<ScanSummary, ServiceError> {
        let mut summary = ScanSummary::default();

        let maintenance_due = vehicle::Entity::find()
            .filter(vehicle::Column::Active.eq(true))
            .filter(vehicle::Column::NextMaintenanceDate.lte(today))
            .filter(
                Condition::any()
                    .add(vehicle::Column::MaintenanceNotifiedOn.is_null())
                    .add(vehicle::Column::MaintenanceNotifiedOn.lt(today)),
            )
            .all(&self.db)
            .await?;
        summary.maintenance_due = maintenance_due.len();

        for v in maintenance_due {
            // stamp and outbox row commit together; fan-out is post-commit
            let due_date = v.next_maintenance_date.unwrap_or(today);
            let plate = v.plate.clone();
            let vehicle_id = v.id;

            let txn = self.db.begin().await?;
            let mut active: vehicle::ActiveModel = v.into();
            active.maintenance_notified_on = Set(Some(today));
            active.update(&txn).await?;
            outbox::enqueue(
                &txn,
                &Event::VehicleMaintenanceDue {
                    vehicle_id,
                    due_date,
                },
            )
            .await?;
            txn.commit().await?;

            summary.notifications_sent += self
                .notifications
                .send_best_effort(NotificationEvent {
                    kind: NotificationKind::VehicleMaintenanceDue,
                    title: "Vehicle maintenance due".into(),
                    message: format!("Vehicle {} had maintenance due on {}", plate, due_date),
                    target_roles: vec![],
                    related: Some(("vehicle", vehicle_id)),
                    excluded_accounts: vec![],
                })
                .await;
        }

        let insurance_due = vehicle::Entity::find()
            .filter(vehicle::Column::Active.eq(true))
            .filter(vehicle::Column::KaskoExpiryDate.lte(today))
            .filter(
                Condition::any()
                    .add(vehicle::Column::InsuranceNotifiedOn.is_null())
                    .add(vehicle::Column::InsuranceNotifiedOn.lt(today)),
            )
            .all(&self.db)
            .await?;
        summary.insurance_due = insurance_due.len();

        for v in insurance_due {
            let expiry_date = v.kasko_expiry_date.unwrap_or(today);
            let plate = v.plate.clone();
            let vehicle_id = v.id;

            let txn = self.db.begin().await?;
            let mut active: vehicle::ActiveModel = v.into();
            active.insurance_notified_on = Set(Some(today));
            active.update(&txn).await?;
            outbox::enqueue(
                &txn,
                &Event::VehicleInsuranceDue {
                    vehicle_id,
                    expiry_date,
                },
            )
            .await?;
            txn.commit().await?;

            summary.notifications_sent += self
                .notifications
                .send_best_effort(NotificationEvent {
                    kind: NotificationKind::VehicleInsuranceDue,
                    title: "Vehicle insurance expired".into(),
                    message: format!("Vehicle {} insurance expired on {}", plate, expiry_date),
                    target_roles: vec![],
                    related: Some(("vehicle", vehicle_id)),
                    excluded_accounts: vec![],
                })
                .await;
        }

        info!(
            maintenance_due = summary.maintenance_due,
            insurance_due = summary.insurance_due,
            notifications_sent = summary.notifications_sent,
            "maintenance scan finished"
        );
        Ok(summary)
    }
}
