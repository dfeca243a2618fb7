mod common;

use chrono::Utc;
use common::TestApp;
use fieldops_api::entities::outbox_event::{self, OutboxStatus};
use fieldops_api::entities::work_order::WorkOrderPriority;
use fieldops_api::events::outbox::OutboxWorker;
use fieldops_api::events::{event_channel, Event};
use fieldops_api::services::work_orders::CreateWorkOrderInput;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

#[tokio::test]
async fn committed_writes_leave_a_pending_outbox_row() {
    let app = TestApp::new().await;
    let order = app
        .state
        .services
        .work_orders
        .create(
            &app.admin_auth(),
            CreateWorkOrderInput {
                customer_id: app.seed.customer,
                device_id: None,
                service_id: app.seed.service,
                priority: WorkOrderPriority::Normal,
                scheduled_at: None,
                assignee_ids: vec![app.seed.field_staff],
                vehicle_id: None,
                work_description: None,
            },
        )
        .await
        .unwrap();

    let rows = outbox_event::Entity::find()
        .filter(outbox_event::Column::EventType.eq("work_order_created"))
        .all(&app.db)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, OutboxStatus::Pending);
    assert_eq!(rows[0].aggregate_type, "work_order");
    assert_eq!(rows[0].aggregate_id, Some(order.id));
}

#[tokio::test]
async fn worker_dispatches_pending_rows_in_order() {
    let app = TestApp::new().await;
    let order = app
        .state
        .services
        .work_orders
        .create(
            &app.admin_auth(),
            CreateWorkOrderInput {
                customer_id: app.seed.customer,
                device_id: None,
                service_id: app.seed.service,
                priority: WorkOrderPriority::Normal,
                scheduled_at: None,
                assignee_ids: vec![app.seed.field_staff],
                vehicle_id: None,
                work_description: None,
            },
        )
        .await
        .unwrap();

    let (sender, mut receiver) = event_channel(16);
    let worker = OutboxWorker::new(app.db.clone(), sender);
    let delivered = worker.drain_once().await.unwrap();
    assert_eq!(delivered, 1);

    match receiver.recv().await.unwrap() {
        Event::WorkOrderCreated {
            work_order_id,
            order_number,
        } => {
            assert_eq!(work_order_id, order.id);
            assert_eq!(order_number, order.order_number);
        }
        other => panic!("unexpected event: {:?}", other),
    }

    let row = outbox_event::Entity::find()
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, OutboxStatus::Delivered);
    assert!(row.processed_at.is_some());

    // nothing left to do
    assert_eq!(worker.drain_once().await.unwrap(), 0);
}

#[tokio::test]
async fn unreadable_payloads_fail_after_bounded_attempts() {
    let app = TestApp::new().await;
    outbox_event::ActiveModel {
        id: Set(Uuid::new_v4()),
        aggregate_type: Set("work_order".to_string()),
        aggregate_id: Set(None),
        event_type: Set("work_order_created".to_string()),
        payload: Set(serde_json::json!({"type": "no_such_event"})),
        status: Set(OutboxStatus::Pending),
        attempts: Set(0),
        error_message: Set(None),
        created_at: Set(Utc::now()),
        processed_at: Set(None),
    }
    .insert(&app.db)
    .await
    .unwrap();

    let (sender, _receiver) = event_channel(16);
    let worker = OutboxWorker::new(app.db.clone(), sender);

    for _ in 0..5 {
        assert_eq!(worker.drain_once().await.unwrap(), 0);
    }

    let row = outbox_event::Entity::find()
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, OutboxStatus::Failed);
    assert_eq!(row.attempts, 5);
    assert!(row.error_message.is_some());
}
