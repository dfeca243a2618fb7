mod common;

use assert_matches::assert_matches;
use common::{insert_warehouse, stock_qty, TestApp};
use fieldops_api::auth::Role;
use fieldops_api::entities::tool_assignment::ToolAssignmentStatus;
use fieldops_api::entities::warehouse_stock::StockItemKind;
use fieldops_api::errors::ServiceError;
use fieldops_api::services::tool_custody::{
    ApproveReturnInput, AssignToolInput, CustodyNotesInput,
};

fn assign_input(app: &TestApp) -> AssignToolInput {
    AssignToolInput {
        tool_id: app.seed.tool,
        warehouse_id: app.seed.warehouse,
        assigned_to: app.seed.base_user,
        notes: Some("take good care".to_string()),
    }
}

fn no_notes() -> CustodyNotesInput {
    CustodyNotesInput { notes: None }
}

#[tokio::test]
async fn assign_puts_tool_into_custody_and_zeroes_stock() {
    let app = TestApp::new().await;
    let assignment = app
        .state
        .services
        .tool_custody
        .assign(&app.admin_auth(), assign_input(&app))
        .await
        .unwrap();

    assert_eq!(assignment.status, ToolAssignmentStatus::Assigned);
    assert_eq!(assignment.assigned_to, app.seed.base_user);
    assert_eq!(assignment.assigned_by, app.seed.admin);
    assert_eq!(assignment.assign_notes.as_deref(), Some("take good care"));
    assert_eq!(
        stock_qty(&app.db, app.seed.warehouse, app.seed.tool, StockItemKind::Tool).await,
        0
    );
}

#[tokio::test]
async fn assign_is_admin_only() {
    let app = TestApp::new().await;
    let supervisor = app.auth(app.seed.field_supervisor, Role::FieldSupervisor);
    let err = app
        .state
        .services
        .tool_custody
        .assign(&supervisor, assign_input(&app))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Forbidden(_));
}

#[tokio::test]
async fn assign_rejects_privileged_assignees() {
    let app = TestApp::new().await;
    let mut input = assign_input(&app);
    input.assigned_to = app.seed.field_staff;
    let err = app
        .state
        .services
        .tool_custody
        .assign(&app.admin_auth(), input)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Validation(_));
}

#[tokio::test]
async fn tool_cannot_be_assigned_twice() {
    let app = TestApp::new().await;
    let custody = &app.state.services.tool_custody;
    custody.assign(&app.admin_auth(), assign_input(&app)).await.unwrap();

    let err = custody
        .assign(&app.admin_auth(), assign_input(&app))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn full_return_cycle_restores_stock() {
    let app = TestApp::new().await;
    let custody = &app.state.services.tool_custody;
    let assignment = custody.assign(&app.admin_auth(), assign_input(&app)).await.unwrap();

    let holder = app.auth(app.seed.base_user, Role::User);
    let requested = custody
        .request_return(&holder, assignment.id, no_notes())
        .await
        .unwrap();
    assert_eq!(requested.status, ToolAssignmentStatus::ReturnRequested);
    assert!(requested.return_requested_at.is_some());

    let manager = app.auth(app.seed.manager, Role::Manager);
    let returned = custody
        .approve_return(&manager, assignment.id, ApproveReturnInput::default())
        .await
        .unwrap();
    assert_eq!(returned.status, ToolAssignmentStatus::Returned);
    assert!(returned.returned_at.is_some());
    assert_eq!(returned.approved_by, Some(app.seed.manager));
    assert_eq!(
        stock_qty(&app.db, app.seed.warehouse, app.seed.tool, StockItemKind::Tool).await,
        1
    );

    // the tool is free again
    custody.assign(&app.admin_auth(), assign_input(&app)).await.unwrap();
}

#[tokio::test]
async fn only_the_holder_may_request_a_return() {
    let app = TestApp::new().await;
    let custody = &app.state.services.tool_custody;
    let assignment = custody.assign(&app.admin_auth(), assign_input(&app)).await.unwrap();

    let other = app.auth(app.seed.field_staff, Role::FieldStaff);
    let err = custody
        .request_return(&other, assignment.id, no_notes())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Forbidden(_));

    // even an admin cannot request on the holder's behalf
    let err = custody
        .request_return(&app.admin_auth(), assignment.id, no_notes())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Forbidden(_));
}

#[tokio::test]
async fn approval_requires_a_pending_request() {
    let app = TestApp::new().await;
    let custody = &app.state.services.tool_custody;
    let assignment = custody.assign(&app.admin_auth(), assign_input(&app)).await.unwrap();

    let err = custody
        .approve_return(&app.admin_auth(), assignment.id, ApproveReturnInput::default())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));

    let err = custody
        .reject_return(&app.admin_auth(), assignment.id, no_notes())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn duplicate_return_request_conflicts() {
    let app = TestApp::new().await;
    let custody = &app.state.services.tool_custody;
    let assignment = custody.assign(&app.admin_auth(), assign_input(&app)).await.unwrap();

    let holder = app.auth(app.seed.base_user, Role::User);
    custody.request_return(&holder, assignment.id, no_notes()).await.unwrap();
    let err = custody
        .request_return(&holder, assignment.id, no_notes())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn rejection_reverts_to_assigned_keeping_audit_stamps() {
    let app = TestApp::new().await;
    let custody = &app.state.services.tool_custody;
    let assignment = custody.assign(&app.admin_auth(), assign_input(&app)).await.unwrap();

    let holder = app.auth(app.seed.base_user, Role::User);
    custody.request_return(&holder, assignment.id, no_notes()).await.unwrap();

    let rejected = custody
        .reject_return(
            &app.admin_auth(),
            assignment.id,
            CustodyNotesInput {
                notes: Some("tool still needed on site".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(rejected.status, ToolAssignmentStatus::Assigned);
    assert!(rejected.return_requested_at.is_none());
    assert!(rejected.rejected_at.is_some());
    assert_eq!(rejected.rejected_by, Some(app.seed.admin));
    assert_eq!(rejected.reject_notes.as_deref(), Some("tool still needed on site"));
    // custody did not move, counter stays zeroed
    assert_eq!(
        stock_qty(&app.db, app.seed.warehouse, app.seed.tool, StockItemKind::Tool).await,
        0
    );

    // the holder can try again after a rejection
    let requested = custody
        .request_return(&holder, assignment.id, no_notes())
        .await
        .unwrap();
    assert_eq!(requested.status, ToolAssignmentStatus::ReturnRequested);
}

#[tokio::test]
async fn returned_assignments_are_never_reused() {
    let app = TestApp::new().await;
    let custody = &app.state.services.tool_custody;
    let assignment = custody.assign(&app.admin_auth(), assign_input(&app)).await.unwrap();

    let holder = app.auth(app.seed.base_user, Role::User);
    custody.request_return(&holder, assignment.id, no_notes()).await.unwrap();
    custody
        .approve_return(&app.admin_auth(), assignment.id, ApproveReturnInput::default())
        .await
        .unwrap();

    let err = custody
        .request_return(&holder, assignment.id, no_notes())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
    let err = custody
        .approve_return(&app.admin_auth(), assignment.id, ApproveReturnInput::default())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn return_can_be_approved_into_a_different_warehouse() {
    let app = TestApp::new().await;
    let custody = &app.state.services.tool_custody;
    let assignment = custody.assign(&app.admin_auth(), assign_input(&app)).await.unwrap();

    let holder = app.auth(app.seed.base_user, Role::User);
    custody.request_return(&holder, assignment.id, no_notes()).await.unwrap();

    let field_depot = insert_warehouse(&app.db, "Field depot").await;
    let returned = custody
        .approve_return(
            &app.admin_auth(),
            assignment.id,
            ApproveReturnInput {
                warehouse_id: Some(field_depot),
                notes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(returned.status, ToolAssignmentStatus::Returned);

    // checked in at the new location, not the one it left from
    assert_eq!(
        stock_qty(&app.db, field_depot, app.seed.tool, StockItemKind::Tool).await,
        1
    );
    assert_eq!(
        stock_qty(&app.db, app.seed.warehouse, app.seed.tool, StockItemKind::Tool).await,
        0
    );
}
