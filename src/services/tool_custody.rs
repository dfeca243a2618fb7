//! Tool custody workflow.
//!
//! A tool is either in a warehouse (stock counter 1) or in someone's custody
//! (counter 0, one open assignment row). Assignment rows move
//! assigned -> return_requested -> returned and are never reused; a rejected
//! return reverts the status literal to `assigned` while keeping the
//! rejection stamps.

use crate::auth::{AuthContext, Role};
use crate::db::DbPool;
use crate::entities::notification::NotificationKind;
use crate::entities::tool_assignment::{self, ToolAssignmentStatus};
use crate::entities::warehouse_stock::StockItemKind;
use crate::entities::{account, tool};
use crate::errors::ServiceError;
use crate::events::{outbox, Event};
use crate::services::notifications::{NotificationEvent, NotificationService};
use crate::services::stock;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignToolInput {
    pub tool_id: Uuid,
    pub warehouse_id: Uuid,
    pub assigned_to: Uuid,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CustodyNotesInput {
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ApproveReturnInput {
    /// Warehouse the tool is checked back into; defaults to the warehouse it
    /// was assigned out of.
    pub warehouse_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolAssignmentFilter {
    pub assigned_to: Option<Uuid>,
    pub status: Option<ToolAssignmentStatus>,
}

#[derive(Clone)]
pub struct ToolCustodyService {
    db: DbPool,
    notifications: NotificationService,
}

impl ToolCustodyService {
    pub fn new(db: DbPool, notifications: NotificationService) -> Self {
        Self { db, notifications }
    }

    /// Hand a tool to a base-role account. Admin-only; the warehouse counter
    /// drops to 0 so the tool cannot be consumed or double-assigned.
    #[instrument(skip(self, input), fields(tool_id = %input.tool_id))]
    pub async fn assign(
        &self,
        auth: &AuthContext,
        input: AssignToolInput,
    ) -> Result<tool_assignment::Model, ServiceError> {
        auth.require_admin()?;

        let txn = self.db.begin().await?;

        let tool = tool::Entity::find_by_id(input.tool_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("tool {} not found", input.tool_id)))?;
        let assignee = account::Entity::find_by_id(input.assigned_to)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("account {} not found", input.assigned_to))
            })?;
        if !assignee.active {
            return Err(ServiceError::Validation(
                "tools cannot be assigned to inactive accounts".into(),
            ));
        }
        if assignee.role.is_privileged() {
            return Err(ServiceError::Validation(
                "tools are assigned to base-role accounts only".into(),
            ));
        }

        let open = tool_assignment::Entity::find()
            .filter(tool_assignment::Column::ToolId.eq(input.tool_id))
            .filter(tool_assignment::Column::Status.ne(ToolAssignmentStatus::Returned))
            .one(&txn)
            .await?;
        if open.is_some() {
            return Err(ServiceError::Conflict(format!(
                "tool {} is already in custody",
                tool.name
            )));
        }

        let assignment = tool_assignment::ActiveModel {
            id: Set(Uuid::new_v4()),
            tool_id: Set(input.tool_id),
            warehouse_id: Set(input.warehouse_id),
            assigned_to: Set(input.assigned_to),
            assigned_by: Set(auth.account_id),
            status: Set(ToolAssignmentStatus::Assigned),
            assigned_at: Set(Utc::now()),
            return_requested_at: Set(None),
            returned_at: Set(None),
            approved_at: Set(None),
            approved_by: Set(None),
            rejected_at: Set(None),
            rejected_by: Set(None),
            assign_notes: Set(input.notes.clone()),
            return_notes: Set(None),
            approve_notes: Set(None),
            reject_notes: Set(None),
        }
        .insert(&txn)
        .await?;

        stock::set(&txn, input.warehouse_id, input.tool_id, StockItemKind::Tool, 0).await?;

        outbox::enqueue(
            &txn,
            &Event::ToolAssigned {
                assignment_id: assignment.id,
                tool_id: input.tool_id,
                assigned_to: input.assigned_to,
            },
        )
        .await?;
        txn.commit().await?;

        self.notifications
            .send_best_effort(NotificationEvent {
                kind: NotificationKind::ToolAssigned,
                title: "Tool assigned".into(),
                message: format!("Tool {} was assigned to {}", tool.name, assignee.name),
                target_roles: vec![Role::InventoryStaff, Role::FieldSupervisor],
                related: Some(("tool_assignment", assignment.id)),
                excluded_accounts: vec![auth.account_id],
            })
            .await;

        Ok(assignment)
    }

    /// The current holder asks to give the tool back.
    #[instrument(skip(self, input))]
    pub async fn request_return(
        &self,
        auth: &AuthContext,
        assignment_id: Uuid,
        input: CustodyNotesInput,
    ) -> Result<tool_assignment::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let assignment = self.load(&txn, assignment_id).await?;

        if assignment.assigned_to != auth.account_id {
            return Err(ServiceError::Forbidden(
                "only the current holder can request a return".into(),
            ));
        }
        if assignment.status != ToolAssignmentStatus::Assigned {
            return Err(ServiceError::Conflict(format!(
                "assignment {} is not in the assigned state",
                assignment_id
            )));
        }

        let tool_id = assignment.tool_id;
        let mut active: tool_assignment::ActiveModel = assignment.into();
        active.status = Set(ToolAssignmentStatus::ReturnRequested);
        active.return_requested_at = Set(Some(Utc::now()));
        if input.notes.is_some() {
            active.return_notes = Set(input.notes.clone());
        }
        let updated = active.update(&txn).await?;

        outbox::enqueue(
            &txn,
            &Event::ToolReturnRequested {
                assignment_id,
                tool_id,
            },
        )
        .await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Accept a pending return: the assignment closes and the tool reappears
    /// in the given warehouse with counter 1.
    #[instrument(skip(self, input))]
    pub async fn approve_return(
        &self,
        auth: &AuthContext,
        assignment_id: Uuid,
        input: ApproveReturnInput,
    ) -> Result<tool_assignment::Model, ServiceError> {
        auth.require_admin()?;

        let txn = self.db.begin().await?;
        let assignment = self.load(&txn, assignment_id).await?;
        if assignment.status != ToolAssignmentStatus::ReturnRequested {
            return Err(ServiceError::Conflict(format!(
                "assignment {} has no pending return request",
                assignment_id
            )));
        }

        let tool_id = assignment.tool_id;
        let warehouse_id = input.warehouse_id.unwrap_or(assignment.warehouse_id);
        let now = Utc::now();
        let mut active: tool_assignment::ActiveModel = assignment.into();
        active.status = Set(ToolAssignmentStatus::Returned);
        active.returned_at = Set(Some(now));
        active.approved_at = Set(Some(now));
        active.approved_by = Set(Some(auth.account_id));
        if input.notes.is_some() {
            active.approve_notes = Set(input.notes.clone());
        }
        let updated = active.update(&txn).await?;

        stock::set(&txn, warehouse_id, tool_id, StockItemKind::Tool, 1).await?;

        outbox::enqueue(
            &txn,
            &Event::ToolReturnApproved {
                assignment_id,
                tool_id,
            },
        )
        .await?;
        txn.commit().await?;

        let tool_name = tool::Entity::find_by_id(tool_id)
            .one(&self.db)
            .await?
            .map(|t| t.name)
            .unwrap_or_else(|| tool_id.to_string());
        self.notifications
            .send_best_effort(NotificationEvent {
                kind: NotificationKind::ToolReturnApproved,
                title: "Tool return approved".into(),
                message: format!("Tool {} is back in the warehouse", tool_name),
                target_roles: vec![Role::InventoryStaff, Role::FieldSupervisor],
                related: Some(("tool_assignment", updated.id)),
                excluded_accounts: vec![auth.account_id],
            })
            .await;

        Ok(updated)
    }

    /// Refuse a pending return: custody stays with the holder and the status
    /// literal reverts to `assigned`. No stock movement.
    #[instrument(skip(self, input))]
    pub async fn reject_return(
        &self,
        auth: &AuthContext,
        assignment_id: Uuid,
        input: CustodyNotesInput,
    ) -> Result<tool_assignment::Model, ServiceError> {
        auth.require_admin()?;

        let txn = self.db.begin().await?;
        let assignment = self.load(&txn, assignment_id).await?;
        if assignment.status != ToolAssignmentStatus::ReturnRequested {
            return Err(ServiceError::Conflict(format!(
                "assignment {} has no pending return request",
                assignment_id
            )));
        }

        let tool_id = assignment.tool_id;
        let mut active: tool_assignment::ActiveModel = assignment.into();
        active.status = Set(ToolAssignmentStatus::Assigned);
        active.return_requested_at = Set(None);
        active.rejected_at = Set(Some(Utc::now()));
        active.rejected_by = Set(Some(auth.account_id));
        if input.notes.is_some() {
            active.reject_notes = Set(input.notes.clone());
        }
        let updated = active.update(&txn).await?;

        outbox::enqueue(
            &txn,
            &Event::ToolReturnRejected {
                assignment_id,
                tool_id,
            },
        )
        .await?;
        txn.commit().await?;
        Ok(updated)
    }

    pub async fn list(
        &self,
        filter: ToolAssignmentFilter,
    ) -> Result<Vec<tool_assignment::Model>, ServiceError> {
        let mut query = tool_assignment::Entity::find();
        if let Some(assigned_to) = filter.assigned_to {
            query = query.filter(tool_assignment::Column::AssignedTo.eq(assigned_to));
        }
        if let Some(status) = filter.status {
            query = query.filter(tool_assignment::Column::Status.eq(status));
        }
        Ok(query
            .order_by_desc(tool_assignment::Column::AssignedAt)
            .all(&self.db)
            .await?)
    }

    async fn load<C: sea_orm::ConnectionTrait>(
        &self,
        conn: &C,
        assignment_id: Uuid,
    ) -> Result<tool_assignment::Model, ServiceError> {
        tool_assignment::Entity::find_by_id(assignment_id)
            .one(conn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("tool assignment {} not found", assignment_id))
            })
    }
}
