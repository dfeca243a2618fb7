mod common;

use assert_matches::assert_matches;
use common::TestApp;
use fieldops_api::auth::Role;
use fieldops_api::entities::notification::{self, NotificationKind};
use fieldops_api::entities::work_order::WorkOrderPriority;
use fieldops_api::errors::ServiceError;
use fieldops_api::services::notifications::NotificationEvent;
use fieldops_api::services::work_orders::CreateWorkOrderInput;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

fn event(target_roles: Vec<Role>, excluded: Vec<Uuid>) -> NotificationEvent {
    NotificationEvent {
        kind: NotificationKind::WorkOrderCreated,
        title: "Test".to_string(),
        message: "Test message".to_string(),
        target_roles,
        related: None,
        excluded_accounts: excluded,
    }
}

async fn recipient_ids(app: &TestApp) -> Vec<Uuid> {
    notification::Entity::find()
        .all(&app.db)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.account_id)
        .collect()
}

#[tokio::test]
async fn managers_are_always_included() {
    let app = TestApp::new().await;
    let count = app
        .state
        .services
        .notifications
        .send(event(vec![Role::InventoryStaff], vec![]))
        .await
        .unwrap();

    // inventory staff + admin + manager; the inactive manager is skipped
    assert_eq!(count, 3);
    let recipients = recipient_ids(&app).await;
    assert!(recipients.contains(&app.seed.inventory_staff));
    assert!(recipients.contains(&app.seed.admin));
    assert!(recipients.contains(&app.seed.manager));
    assert!(!recipients.contains(&app.seed.inactive_manager));
}

#[tokio::test]
async fn actor_is_excluded_from_fanout() {
    let app = TestApp::new().await;
    let count = app
        .state
        .services
        .notifications
        .send(event(vec![Role::InventoryStaff], vec![app.seed.admin]))
        .await
        .unwrap();

    assert_eq!(count, 2);
    assert!(!recipient_ids(&app).await.contains(&app.seed.admin));
}

#[tokio::test]
async fn empty_target_set_still_reaches_managers() {
    let app = TestApp::new().await;
    let count = app
        .state
        .services
        .notifications
        .send(event(vec![], vec![]))
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn empty_recipient_set_is_ok_zero() {
    let app = TestApp::new().await;
    let count = app
        .state
        .services
        .notifications
        .send(event(vec![], vec![app.seed.admin, app.seed.manager]))
        .await
        .unwrap();
    assert_eq!(count, 0);
    assert!(recipient_ids(&app).await.is_empty());
}

#[tokio::test]
async fn work_order_creation_notifies_field_and_office_roles() {
    let app = TestApp::new().await;
    app.state
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

    let rows = notification::Entity::find()
        .filter(notification::Column::Kind.eq(NotificationKind::WorkOrderCreated))
        .all(&app.db)
        .await
        .unwrap();
    let recipients: Vec<Uuid> = rows.iter().map(|n| n.account_id).collect();

    assert!(recipients.contains(&app.seed.field_staff));
    assert!(recipients.contains(&app.seed.field_supervisor));
    assert!(recipients.contains(&app.seed.office_supervisor));
    assert!(recipients.contains(&app.seed.manager));
    // the creating admin never hears about their own action
    assert!(!recipients.contains(&app.seed.admin));
    // office staff are not in the creation target set
    assert!(!recipients.contains(&app.seed.office_staff));
}

#[tokio::test]
async fn recipients_share_one_sent_at_per_event() {
    let app = TestApp::new().await;
    app.state
        .services
        .notifications
        .send(event(vec![Role::InventoryStaff], vec![]))
        .await
        .unwrap();

    let rows = notification::Entity::find().all(&app.db).await.unwrap();
    assert!(rows.len() > 1);
    assert!(rows.iter().all(|n| n.sent_at == rows[0].sent_at));
    assert!(rows.iter().all(|n| !n.is_read));
}

#[tokio::test]
async fn mark_read_is_recipient_only() {
    let app = TestApp::new().await;
    app.state
        .services
        .notifications
        .send(event(vec![], vec![]))
        .await
        .unwrap();

    let manager_auth = app.auth(app.seed.manager, Role::Manager);
    let own = app
        .state
        .services
        .notifications
        .list_own(&manager_auth)
        .await
        .unwrap();
    assert_eq!(own.len(), 1);

    // another account cannot flip the flag, not even an admin
    let err = app
        .state
        .services
        .notifications
        .mark_read(&app.admin_auth(), own[0].id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Forbidden(_));

    let read = app
        .state
        .services
        .notifications
        .mark_read(&manager_auth, own[0].id)
        .await
        .unwrap();
    assert!(read.is_read);

    // marking twice is a no-op, not an error
    let again = app
        .state
        .services
        .notifications
        .mark_read(&manager_auth, own[0].id)
        .await
        .unwrap();
    assert!(again.is_read);
}
