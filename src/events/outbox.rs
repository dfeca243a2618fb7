//! Transactional outbox.
//!
//! State-changing services insert an outbox row in the same transaction as
//! their writes; a single background worker polls pending rows in insertion
//! order and replays them onto the event channel. A row is marked delivered
//! only after the send succeeds, so delivery is at-least-once.

use crate::db::DbPool;
use crate::entities::outbox_event::{self, OutboxStatus};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use chrono::Utc;
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const MAX_ATTEMPTS: i32 = 5;

/// Insert an outbox row for `event` on `conn`, which is normally an open
/// transaction so the enqueue commits or rolls back with the state change.
pub async fn enqueue<C: ConnectionTrait>(conn: &C, event: &Event) -> Result<(), ServiceError> {
    let payload = serde_json::to_value(event)
        .map_err(|e| ServiceError::EventError(format!("failed to serialize event: {}", e)))?;
    let (aggregate_type, aggregate_id) = event.aggregate();

    let row = outbox_event::ActiveModel {
        id: Set(Uuid::new_v4()),
        aggregate_type: Set(aggregate_type.to_string()),
        aggregate_id: Set(aggregate_id),
        event_type: Set(event.event_type().to_string()),
        payload: Set(payload),
        status: Set(OutboxStatus::Pending),
        attempts: Set(0),
        error_message: Set(None),
        created_at: Set(Utc::now()),
        processed_at: Set(None),
    };
    row.insert(conn).await?;
    counter!("fieldops_outbox.enqueued", 1, "event_type" => event.event_type());
    Ok(())
}

/// Background worker that drains pending outbox rows onto the event channel.
pub struct OutboxWorker {
    db: DbPool,
    sender: EventSender,
    batch_size: u64,
    poll_interval: Duration,
}

impl OutboxWorker {
    pub fn new(db: DbPool, sender: EventSender) -> Self {
        Self {
            db,
            sender,
            batch_size: 50,
            poll_interval: Duration::from_secs(1),
        }
    }

    /// Poll forever. Intended to be spawned as a task; exits only if the
    /// runtime shuts the task down.
    pub async fn run(self) {
        info!("Outbox worker started");
        let mut ticker = tokio::time::interval(self.poll_interval);
        loop {
            ticker.tick().await;
            match self.drain_once().await {
                Ok(0) => {}
                Ok(n) => debug!("Dispatched {} outbox event(s)", n),
                Err(e) => error!("Outbox drain failed: {}", e),
            }
        }
    }

    /// Dispatch one batch of pending rows. Returns the number delivered.
    pub async fn drain_once(&self) -> Result<usize, ServiceError> {
        let pending = outbox_event::Entity::find()
            .filter(outbox_event::Column::Status.eq(OutboxStatus::Pending))
            .order_by_asc(outbox_event::Column::CreatedAt)
            .limit(self.batch_size)
            .all(&self.db)
            .await?;

        let mut delivered = 0;
        for row in pending {
            match self.dispatch(&row).await {
                Ok(()) => {
                    let mut update: outbox_event::ActiveModel = row.into();
                    update.status = Set(OutboxStatus::Delivered);
                    update.processed_at = Set(Some(Utc::now()));
                    update.update(&self.db).await?;
                    delivered += 1;
                    counter!("fieldops_outbox.delivered", 1);
                }
                Err(e) => {
                    let attempts = row.attempts + 1;
                    let exhausted = attempts >= MAX_ATTEMPTS;
                    warn!(
                        outbox_id = %row.id,
                        event_type = %row.event_type,
                        attempts,
                        "Outbox dispatch failed: {}",
                        e
                    );
                    let mut update: outbox_event::ActiveModel = row.into();
                    update.attempts = Set(attempts);
                    update.error_message = Set(Some(e.to_string()));
                    if exhausted {
                        update.status = Set(OutboxStatus::Failed);
                        update.processed_at = Set(Some(Utc::now()));
                        counter!("fieldops_outbox.failed", 1);
                    }
                    update.update(&self.db).await?;
                }
            }
        }
        Ok(delivered)
    }

    async fn dispatch(&self, row: &outbox_event::Model) -> Result<(), ServiceError> {
        let event: Event = serde_json::from_value(row.payload.clone())
            .map_err(|e| ServiceError::EventError(format!("unreadable outbox payload: {}", e)))?;
        self.sender.send(event).await
    }
}
