//! Test harness: file-backed SQLite, embedded migrations, seeded master
//! data, and a router driven through `tower::ServiceExt`.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, Utc};
use fieldops_api::auth::{issue_token, AuthContext, Role};
use fieldops_api::config::AppConfig;
use fieldops_api::db::{self, DbPool};
use fieldops_api::entities::warehouse_stock::StockItemKind;
use fieldops_api::entities::{
    account, customer, product, service_template, tool, vehicle, warehouse, warehouse_stock,
};
use fieldops_api::{handlers, AppState};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test_secret_key_for_testing_purposes_only_32chars";

/// Seeded master-data ids, one account per role.
pub struct Seed {
    pub admin: Uuid,
    pub manager: Uuid,
    pub office_supervisor: Uuid,
    pub office_staff: Uuid,
    pub field_supervisor: Uuid,
    pub field_staff: Uuid,
    pub inventory_staff: Uuid,
    pub accounting_staff: Uuid,
    pub base_user: Uuid,
    pub inactive_manager: Uuid,
    pub customer: Uuid,
    pub service: Uuid,
    pub service_with_schema: Uuid,
    pub product: Uuid,
    pub warehouse: Uuid,
    pub tool: Uuid,
    pub vehicle: Uuid,
}

pub struct TestApp {
    pub db: DbPool,
    pub state: AppState,
    pub seed: Seed,
    _tmp: tempfile::TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let tmp = tempfile::tempdir().expect("failed to create temp dir");
        let db_file = tmp.path().join("fieldops_test.db");
        let url = format!("sqlite://{}?mode=rwc", db_file.display());

        let mut cfg = AppConfig::new(
            url,
            JWT_SECRET.to_string(),
            3600,
            "127.0.0.1".to_string(),
            0,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool).await.expect("migrations failed");

        let seed = seed_master_data(&pool).await;
        let state = AppState::new(pool.clone(), cfg);
        Self {
            db: pool,
            state,
            seed,
            _tmp: tmp,
        }
    }

    pub fn router(&self) -> Router {
        handlers::app(self.state.clone())
    }

    pub fn token(&self, account_id: Uuid, role: Role) -> String {
        issue_token(account_id, role, JWT_SECRET, 3600).expect("failed to issue token")
    }

    pub fn auth(&self, account_id: Uuid, role: Role) -> AuthContext {
        AuthContext::new(account_id, role)
    }

    pub fn admin_auth(&self) -> AuthContext {
        self.auth(self.seed.admin, Role::Admin)
    }

    /// Drive the router with one request; returns status and parsed body.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("failed to build request"),
            None => builder.body(Body::empty()).expect("failed to build request"),
        };

        let response = self
            .router()
            .oneshot(request)
            .await
            .expect("router did not respond");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// Minimal valid create payload against the seeded master data.
    pub fn create_order_body(&self) -> Value {
        json!({
            "customer_id": self.seed.customer,
            "service_id": self.seed.service,
            "assignee_ids": [self.seed.field_staff],
        })
    }
}

async fn seed_master_data(pool: &DbPool) -> Seed {
    let mut ids = Vec::new();
    for (name, role, active) in [
        ("Admin", Role::Admin, true),
        ("Manager", Role::Manager, true),
        ("Office Supervisor", Role::OfficeSupervisor, true),
        ("Office Staff", Role::OfficeStaff, true),
        ("Field Supervisor", Role::FieldSupervisor, true),
        ("Field Staff", Role::FieldStaff, true),
        ("Inventory Staff", Role::InventoryStaff, true),
        ("Accounting Staff", Role::AccountingStaff, true),
        ("Base User", Role::User, true),
        ("Former Manager", Role::Manager, false),
    ] {
        let id = Uuid::new_v4();
        account::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            role: Set(role),
            active: Set(active),
            created_at: Set(Utc::now()),
        }
        .insert(pool)
        .await
        .expect("failed to seed account");
        ids.push(id);
    }

    let customer_id = Uuid::new_v4();
    customer::ActiveModel {
        id: Set(customer_id),
        name: Set("Acme Facilities".to_string()),
        phone: Set(None),
        address: Set(None),
    }
    .insert(pool)
    .await
    .expect("failed to seed customer");

    let service_id = Uuid::new_v4();
    service_template::ActiveModel {
        id: Set(service_id),
        name: Set("HVAC inspection".to_string()),
        form_schema: Set(None),
    }
    .insert(pool)
    .await
    .expect("failed to seed service template");

    let service_with_schema_id = Uuid::new_v4();
    service_template::ActiveModel {
        id: Set(service_with_schema_id),
        name: Set("Electrical check".to_string()),
        form_schema: Set(Some(json!({"voltage": "number", "notes": "string"}))),
    }
    .insert(pool)
    .await
    .expect("failed to seed service template");

    let product_id = Uuid::new_v4();
    product::ActiveModel {
        id: Set(product_id),
        name: Set("Air filter".to_string()),
        unit_price: Set(dec!(25.50)),
    }
    .insert(pool)
    .await
    .expect("failed to seed product");

    let warehouse_id = Uuid::new_v4();
    warehouse::ActiveModel {
        id: Set(warehouse_id),
        name: Set("Main depot".to_string()),
    }
    .insert(pool)
    .await
    .expect("failed to seed warehouse");

    // 10 filters on the shelf, the tool checked in
    let tool_id = Uuid::new_v4();
    tool::ActiveModel {
        id: Set(tool_id),
        name: Set("Torque wrench".to_string()),
    }
    .insert(pool)
    .await
    .expect("failed to seed tool");

    insert_stock(pool, warehouse_id, product_id, StockItemKind::Product, 10).await;
    insert_stock(pool, warehouse_id, tool_id, StockItemKind::Tool, 1).await;

    let vehicle_id = Uuid::new_v4();
    vehicle::ActiveModel {
        id: Set(vehicle_id),
        plate: Set("34 ABC 123".to_string()),
        active: Set(true),
        next_maintenance_date: Set(None),
        kasko_expiry_date: Set(None),
        maintenance_notified_on: Set(None),
        insurance_notified_on: Set(None),
    }
    .insert(pool)
    .await
    .expect("failed to seed vehicle");

    Seed {
        admin: ids[0],
        manager: ids[1],
        office_supervisor: ids[2],
        office_staff: ids[3],
        field_supervisor: ids[4],
        field_staff: ids[5],
        inventory_staff: ids[6],
        accounting_staff: ids[7],
        base_user: ids[8],
        inactive_manager: ids[9],
        customer: customer_id,
        service: service_id,
        service_with_schema: service_with_schema_id,
        product: product_id,
        warehouse: warehouse_id,
        tool: tool_id,
        vehicle: vehicle_id,
    }
}

pub async fn insert_stock(
    pool: &DbPool,
    warehouse_id: Uuid,
    item_id: Uuid,
    item_kind: StockItemKind,
    quantity: i32,
) {
    warehouse_stock::ActiveModel {
        id: Set(Uuid::new_v4()),
        warehouse_id: Set(warehouse_id),
        item_id: Set(item_id),
        item_kind: Set(item_kind),
        quantity: Set(quantity),
        updated_at: Set(Utc::now()),
    }
    .insert(pool)
    .await
    .expect("failed to seed stock");
}

pub async fn insert_vehicle(
    pool: &DbPool,
    plate: &str,
    active: bool,
    next_maintenance_date: Option<NaiveDate>,
    kasko_expiry_date: Option<NaiveDate>,
) -> Uuid {
    let id = Uuid::new_v4();
    vehicle::ActiveModel {
        id: Set(id),
        plate: Set(plate.to_string()),
        active: Set(active),
        next_maintenance_date: Set(next_maintenance_date),
        kasko_expiry_date: Set(kasko_expiry_date),
        maintenance_notified_on: Set(None),
        insurance_notified_on: Set(None),
    }
    .insert(pool)
    .await
    .expect("failed to seed vehicle");
    id
}

/// Current counter value, 0 when the row does not exist.
pub async fn stock_qty(
    pool: &DbPool,
    warehouse_id: Uuid,
    item_id: Uuid,
    item_kind: StockItemKind,
) -> i32 {
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
    warehouse_stock::Entity::find()
        .filter(warehouse_stock::Column::WarehouseId.eq(warehouse_id))
        .filter(warehouse_stock::Column::ItemId.eq(item_id))
        .filter(warehouse_stock::Column::ItemKind.eq(item_kind))
        .one(pool)
        .await
        .expect("stock query failed")
        .map(|row| row.quantity)
        .unwrap_or(0)
}

pub async fn insert_warehouse(pool: &DbPool, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    warehouse::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
    }
    .insert(pool)
    .await
    .expect("failed to seed warehouse");
    id
}

pub async fn insert_product(pool: &DbPool, name: &str, unit_price: Decimal) -> Uuid {
    let id = Uuid::new_v4();
    product::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
        unit_price: Set(unit_price),
    }
    .insert(pool)
    .await
    .expect("failed to seed product");
    id
}
