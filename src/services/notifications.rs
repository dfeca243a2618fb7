use crate::auth::{AuthContext, Role, MANAGER_EQUIVALENT};
use crate::db::DbPool;
use crate::entities::{account, notification, notification::NotificationKind};
use crate::errors::ServiceError;
use chrono::Utc;
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, warn};
use uuid::Uuid;

/// One fan-out request. The manager tier is always added to `target_roles`;
/// `excluded_accounts` removes actors so nobody is notified about their own
/// action.
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub target_roles: Vec<Role>,
    pub related: Option<(&'static str, Uuid)>,
    pub excluded_accounts: Vec<Uuid>,
}

#[derive(Clone)]
pub struct NotificationService {
    db: DbPool,
}

impl NotificationService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Fan a notification out to every active account holding one of the
    /// effective target roles. Returns the number of rows inserted; an empty
    /// recipient set is Ok(0), not an error.
    pub async fn send(&self, event: NotificationEvent) -> Result<usize, ServiceError> {
        let mut roles = event.target_roles.clone();
        for role in MANAGER_EQUIVALENT {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }

        let recipients = account::Entity::find()
            .filter(account::Column::Active.eq(true))
            .filter(account::Column::Role.is_in(roles))
            .all(&self.db)
            .await?;

        let sent_at = Utc::now();
        let rows: Vec<notification::ActiveModel> = recipients
            .into_iter()
            .filter(|a| !event.excluded_accounts.contains(&a.id))
            .map(|a| notification::ActiveModel {
                id: Set(Uuid::new_v4()),
                account_id: Set(a.id),
                kind: Set(event.kind),
                title: Set(event.title.clone()),
                message: Set(event.message.clone()),
                related_type: Set(event.related.map(|(t, _)| t.to_string())),
                related_id: Set(event.related.map(|(_, id)| id)),
                is_read: Set(false),
                sent_at: Set(sent_at),
            })
            .collect();

        if rows.is_empty() {
            debug!(kind = ?event.kind, "notification fan-out resolved no recipients");
            return Ok(0);
        }

        let count = rows.len();
        notification::Entity::insert_many(rows).exec(&self.db).await?;
        counter!("fieldops_notifications.sent", count as u64);
        Ok(count)
    }

    /// Best-effort variant for callers whose primary write already committed.
    /// Failures are logged and swallowed.
    pub async fn send_best_effort(&self, event: NotificationEvent) -> usize {
        let kind = event.kind;
        match self.send(event).await {
            Ok(n) => n,
            Err(e) => {
                warn!(?kind, "notification fan-out failed: {}", e);
                counter!("fieldops_notifications.fanout_failures", 1);
                0
            }
        }
    }

    /// List the calling account's notifications, newest first.
    pub async fn list_own(
        &self,
        auth: &AuthContext,
    ) -> Result<Vec<notification::Model>, ServiceError> {
        let rows = notification::Entity::find()
            .filter(notification::Column::AccountId.eq(auth.account_id))
            .order_by_desc(notification::Column::SentAt)
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    /// Flip `is_read` on one of the caller's own notifications.
    pub async fn mark_read(
        &self,
        auth: &AuthContext,
        notification_id: Uuid,
    ) -> Result<notification::Model, ServiceError> {
        let row = notification::Entity::find_by_id(notification_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("notification {} not found", notification_id))
            })?;

        if row.account_id != auth.account_id {
            return Err(ServiceError::Forbidden(
                "notifications can only be read by their recipient".into(),
            ));
        }
        if row.is_read {
            return Ok(row);
        }

        let mut update: notification::ActiveModel = row.into();
        update.is_read = Set(true);
        Ok(update.update(&self.db).await?)
    }
}
