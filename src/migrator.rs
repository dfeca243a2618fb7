use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_master_data_tables::Migration),
            Box::new(m20250101_000002_create_work_orders_table::Migration),
            Box::new(m20250101_000003_create_ledger_tables::Migration),
            Box::new(m20250101_000004_create_tool_assignments_table::Migration),
            Box::new(m20250101_000005_create_notifications_table::Migration),
            Box::new(m20250101_000006_create_outbox_events_table::Migration),
        ]
    }
}

mod m20250101_000001_create_master_data_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_master_data_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Accounts::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Accounts::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Accounts::Name).string().not_null())
                        .col(ColumnDef::new(Accounts::Role).string_len(32).not_null())
                        .col(
                            ColumnDef::new(Accounts::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Accounts::CreatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_accounts_role")
                        .table(Accounts::Table)
                        .col(Accounts::Role)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Customers::Name).string().not_null())
                        .col(ColumnDef::new(Customers::Phone).string().null())
                        .col(ColumnDef::new(Customers::Address).string().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ServiceTemplates::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ServiceTemplates::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ServiceTemplates::Name).string().not_null())
                        .col(ColumnDef::new(ServiceTemplates::FormSchema).json().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(
                            ColumnDef::new(Products::UnitPrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Tools::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Tools::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Tools::Name).string().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Warehouses::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Warehouses::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Warehouses::Name).string().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Vehicles::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Vehicles::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Vehicles::Plate).string().not_null())
                        .col(
                            ColumnDef::new(Vehicles::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Vehicles::NextMaintenanceDate).date().null())
                        .col(ColumnDef::new(Vehicles::KaskoExpiryDate).date().null())
                        .col(
                            ColumnDef::new(Vehicles::MaintenanceNotifiedOn)
                                .date()
                                .null(),
                        )
                        .col(ColumnDef::new(Vehicles::InsuranceNotifiedOn).date().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Vehicles::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Warehouses::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Tools::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ServiceTemplates::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Accounts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Accounts {
        Table,
        Id,
        Name,
        Role,
        Active,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum Customers {
        Table,
        Id,
        Name,
        Phone,
        Address,
    }

    #[derive(DeriveIden)]
    pub(super) enum ServiceTemplates {
        Table,
        Id,
        Name,
        FormSchema,
    }

    #[derive(DeriveIden)]
    pub(super) enum Products {
        Table,
        Id,
        Name,
        UnitPrice,
    }

    #[derive(DeriveIden)]
    pub(super) enum Tools {
        Table,
        Id,
        Name,
    }

    #[derive(DeriveIden)]
    pub(super) enum Warehouses {
        Table,
        Id,
        Name,
    }

    #[derive(DeriveIden)]
    pub(super) enum Vehicles {
        Table,
        Id,
        Plate,
        Active,
        NextMaintenanceDate,
        KaskoExpiryDate,
        MaintenanceNotifiedOn,
        InsuranceNotifiedOn,
    }
}

mod m20250101_000002_create_work_orders_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_work_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(WorkOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WorkOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(WorkOrders::OrderNumber).string().not_null())
                        .col(ColumnDef::new(WorkOrders::OrderYear).integer().not_null())
                        .col(ColumnDef::new(WorkOrders::OrderSeq).integer().not_null())
                        .col(ColumnDef::new(WorkOrders::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(WorkOrders::DeviceId).uuid().null())
                        .col(ColumnDef::new(WorkOrders::ServiceId).uuid().not_null())
                        .col(
                            ColumnDef::new(WorkOrders::Priority)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(ColumnDef::new(WorkOrders::Status).string_len(20).not_null())
                        .col(ColumnDef::new(WorkOrders::ScheduledAt).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(WorkOrders::StartedAt).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(WorkOrders::CompletedAt).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(WorkOrders::CancelledAt).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(WorkOrders::Latitude).decimal().null())
                        .col(ColumnDef::new(WorkOrders::Longitude).decimal().null())
                        .col(ColumnDef::new(WorkOrders::Address).string().null())
                        .col(ColumnDef::new(WorkOrders::VehicleId).uuid().null())
                        .col(ColumnDef::new(WorkOrders::VehicleStartKm).integer().null())
                        .col(ColumnDef::new(WorkOrders::VehicleEndKm).integer().null())
                        .col(ColumnDef::new(WorkOrders::FormData).json().null())
                        .col(ColumnDef::new(WorkOrders::WorkDescription).string().null())
                        .col(ColumnDef::new(WorkOrders::BeforePhotos).json().null())
                        .col(ColumnDef::new(WorkOrders::AfterPhotos).json().null())
                        .col(
                            ColumnDef::new(WorkOrders::CustomerSignature)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrders::TechnicianSignature)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(WorkOrders::CreatedBy).uuid().not_null())
                        .col(ColumnDef::new(WorkOrders::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(WorkOrders::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            // Uniqueness backs the atomic order-number allocation: concurrent
            // creates race to the same (year, seq) and the loser retries.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_work_orders_order_number")
                        .table(WorkOrders::Table)
                        .col(WorkOrders::OrderNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_work_orders_year_seq")
                        .table(WorkOrders::Table)
                        .col(WorkOrders::OrderYear)
                        .col(WorkOrders::OrderSeq)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_work_orders_status")
                        .table(WorkOrders::Table)
                        .col(WorkOrders::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(WorkOrderAssignees::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WorkOrderAssignees::WorkOrderId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrderAssignees::AccountId)
                                .uuid()
                                .not_null(),
                        )
                        .primary_key(
                            Index::create()
                                .col(WorkOrderAssignees::WorkOrderId)
                                .col(WorkOrderAssignees::AccountId),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(WorkOrderAssignees::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(WorkOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum WorkOrders {
        Table,
        Id,
        OrderNumber,
        OrderYear,
        OrderSeq,
        CustomerId,
        DeviceId,
        ServiceId,
        Priority,
        Status,
        ScheduledAt,
        StartedAt,
        CompletedAt,
        CancelledAt,
        Latitude,
        Longitude,
        Address,
        VehicleId,
        VehicleStartKm,
        VehicleEndKm,
        FormData,
        WorkDescription,
        BeforePhotos,
        AfterPhotos,
        CustomerSignature,
        TechnicianSignature,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum WorkOrderAssignees {
        Table,
        WorkOrderId,
        AccountId,
    }
}

mod m20250101_000003_create_ledger_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000003_create_ledger_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(WarehouseStocks::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WarehouseStocks::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WarehouseStocks::WarehouseId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(WarehouseStocks::ItemId).uuid().not_null())
                        .col(
                            ColumnDef::new(WarehouseStocks::ItemKind)
                                .string_len(10)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WarehouseStocks::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(WarehouseStocks::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_warehouse_stocks_warehouse_item")
                        .table(WarehouseStocks::Table)
                        .col(WarehouseStocks::WarehouseId)
                        .col(WarehouseStocks::ItemId)
                        .col(WarehouseStocks::ItemKind)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(VehicleUsageLogs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(VehicleUsageLogs::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(VehicleUsageLogs::VehicleId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(VehicleUsageLogs::WorkOrderId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(VehicleUsageLogs::StartedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(VehicleUsageLogs::StartKm)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(VehicleUsageLogs::EndedAt).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(VehicleUsageLogs::EndKm).integer().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(WorkOrderMaterials::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WorkOrderMaterials::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrderMaterials::WorkOrderId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrderMaterials::ProductId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrderMaterials::WarehouseId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrderMaterials::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrderMaterials::UnitPrice)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrderMaterials::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(WorkOrderMaterials::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(VehicleUsageLogs::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(WarehouseStocks::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum WarehouseStocks {
        Table,
        Id,
        WarehouseId,
        ItemId,
        ItemKind,
        Quantity,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum VehicleUsageLogs {
        Table,
        Id,
        VehicleId,
        WorkOrderId,
        StartedAt,
        StartKm,
        EndedAt,
        EndKm,
    }

    #[derive(DeriveIden)]
    pub(super) enum WorkOrderMaterials {
        Table,
        Id,
        WorkOrderId,
        ProductId,
        WarehouseId,
        Quantity,
        UnitPrice,
        CreatedAt,
    }
}

mod m20250101_000004_create_tool_assignments_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000004_create_tool_assignments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ToolAssignments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ToolAssignments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ToolAssignments::ToolId).uuid().not_null())
                        .col(
                            ColumnDef::new(ToolAssignments::WarehouseId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ToolAssignments::AssignedTo)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ToolAssignments::AssignedBy)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ToolAssignments::Status)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ToolAssignments::AssignedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ToolAssignments::ReturnRequestedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ToolAssignments::ReturnedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ToolAssignments::ApprovedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(ToolAssignments::ApprovedBy).uuid().null())
                        .col(
                            ColumnDef::new(ToolAssignments::RejectedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(ToolAssignments::RejectedBy).uuid().null())
                        .col(
                            ColumnDef::new(ToolAssignments::AssignNotes)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ToolAssignments::ReturnNotes)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ToolAssignments::ApproveNotes)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ToolAssignments::RejectNotes)
                                .string()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_tool_assignments_assigned_to")
                        .table(ToolAssignments::Table)
                        .col(ToolAssignments::AssignedTo)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ToolAssignments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum ToolAssignments {
        Table,
        Id,
        ToolId,
        WarehouseId,
        AssignedTo,
        AssignedBy,
        Status,
        AssignedAt,
        ReturnRequestedAt,
        ReturnedAt,
        ApprovedAt,
        ApprovedBy,
        RejectedAt,
        RejectedBy,
        AssignNotes,
        ReturnNotes,
        ApproveNotes,
        RejectNotes,
    }
}

mod m20250101_000005_create_notifications_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000005_create_notifications_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Notifications::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Notifications::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Notifications::AccountId).uuid().not_null())
                        .col(
                            ColumnDef::new(Notifications::Kind)
                                .string_len(40)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Notifications::Title).string().not_null())
                        .col(ColumnDef::new(Notifications::Message).string().not_null())
                        .col(ColumnDef::new(Notifications::RelatedType).string().null())
                        .col(ColumnDef::new(Notifications::RelatedId).uuid().null())
                        .col(
                            ColumnDef::new(Notifications::IsRead)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Notifications::SentAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_notifications_account_id")
                        .table(Notifications::Table)
                        .col(Notifications::AccountId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Notifications::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Notifications {
        Table,
        Id,
        AccountId,
        Kind,
        Title,
        Message,
        RelatedType,
        RelatedId,
        IsRead,
        SentAt,
    }
}

mod m20250101_000006_create_outbox_events_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000006_create_outbox_events_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OutboxEvents::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OutboxEvents::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OutboxEvents::AggregateType)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OutboxEvents::AggregateId).uuid().null())
                        .col(ColumnDef::new(OutboxEvents::EventType).string().not_null())
                        .col(ColumnDef::new(OutboxEvents::Payload).json().not_null())
                        .col(
                            ColumnDef::new(OutboxEvents::Status)
                                .string_len(20)
                                .not_null()
                                .default("pending"),
                        )
                        .col(
                            ColumnDef::new(OutboxEvents::Attempts)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(OutboxEvents::ErrorMessage).string().null())
                        .col(
                            ColumnDef::new(OutboxEvents::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OutboxEvents::ProcessedAt).timestamp_with_time_zone().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_outbox_events_status")
                        .table(OutboxEvents::Table)
                        .col(OutboxEvents::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OutboxEvents::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum OutboxEvents {
        Table,
        Id,
        AggregateType,
        AggregateId,
        EventType,
        Payload,
        Status,
        Attempts,
        CreatedAt,
        ProcessedAt,
        ErrorMessage,
    }
}
