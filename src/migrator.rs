use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_products_table::Migration),
            Box::new(m20250301_000002_create_stock_movements_table::Migration),
            Box::new(m20250301_000003_create_stock_alerts_table::Migration),
            Box::new(m20250301_000004_create_purchase_orders_table::Migration),
        ]
    }
}

// Migration implementations

mod m20250301_000001_create_products_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create products table aligned with entities::product Model
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Category).string().null())
                        .col(
                            ColumnDef::new(Products::CurrentStock)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::LowStockThreshold)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::MaxStockLevel)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::ReorderPoint)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Products::Unit).string().not_null())
                        .col(
                            ColumnDef::new(Products::UnitPrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Products::SupplierId).uuid().null())
                        .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Products::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_supplier_id")
                        .table(Products::Table)
                        .col(Products::SupplierId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
        Name,
        Category,
        CurrentStock,
        LowStockThreshold,
        MaxStockLevel,
        ReorderPoint,
        Unit,
        UnitPrice,
        SupplierId,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000002_create_stock_movements_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_stock_movements_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Append-only movement log read by the consumption forecast
            manager
                .create_table(
                    Table::create()
                        .table(StockMovements::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockMovements::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockMovements::ProductId).uuid().not_null())
                        .col(ColumnDef::new(StockMovements::Direction).string().not_null())
                        .col(ColumnDef::new(StockMovements::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(StockMovements::OccurredAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockMovements::ReferenceType)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(StockMovements::ReferenceId).uuid().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_movements_product_id")
                        .table(StockMovements::Table)
                        .col(StockMovements::ProductId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_movements_occurred_at")
                        .table(StockMovements::Table)
                        .col(StockMovements::OccurredAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockMovements::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum StockMovements {
        Table,
        Id,
        ProductId,
        Direction,
        Quantity,
        OccurredAt,
        ReferenceType,
        ReferenceId,
    }
}

mod m20250301_000003_create_stock_alerts_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000003_create_stock_alerts_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockAlerts::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(StockAlerts::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(StockAlerts::AlertType).string().not_null())
                        .col(ColumnDef::new(StockAlerts::Priority).integer().not_null())
                        .col(ColumnDef::new(StockAlerts::RelatedId).uuid().not_null())
                        .col(ColumnDef::new(StockAlerts::Title).string().not_null())
                        .col(ColumnDef::new(StockAlerts::Message).string().not_null())
                        .col(ColumnDef::new(StockAlerts::Status).string().not_null())
                        .col(ColumnDef::new(StockAlerts::IgnoreReason).string().null())
                        .col(
                            ColumnDef::new(StockAlerts::ResolvingPurchaseOrderId)
                                .uuid()
                                .null(),
                        )
                        .col(ColumnDef::new(StockAlerts::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(StockAlerts::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_alerts_status")
                        .table(StockAlerts::Table)
                        .col(StockAlerts::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_alerts_created_at")
                        .table(StockAlerts::Table)
                        .col(StockAlerts::CreatedAt)
                        .to_owned(),
                )
                .await?;

            // At most one Active alert per (related_id, alert_type); concurrent
            // generators race on this index, not on application state. Partial
            // indexes have the same syntax on Postgres and SQLite.
            manager
                .get_connection()
                .execute_unprepared(
                    "CREATE UNIQUE INDEX IF NOT EXISTS idx_stock_alerts_active_dedup \
                     ON stock_alerts (related_id, alert_type) WHERE status = 'Active'",
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockAlerts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum StockAlerts {
        Table,
        Id,
        AlertType,
        Priority,
        RelatedId,
        Title,
        Message,
        Status,
        IgnoreReason,
        ResolvingPurchaseOrderId,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000004_create_purchase_orders_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000004_create_purchase_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::PoNumber).string().not_null())
                        .col(ColumnDef::new(PurchaseOrders::ProductId).uuid().not_null())
                        .col(ColumnDef::new(PurchaseOrders::SupplierId).uuid().not_null())
                        .col(
                            ColumnDef::new(PurchaseOrders::QuantityOrdered)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::UnitPriceAtIssuance)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::TotalAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(PurchaseOrders::Status).string().not_null())
                        .col(ColumnDef::new(PurchaseOrders::SentMethod).string().null())
                        .col(ColumnDef::new(PurchaseOrders::SentTo).string().null())
                        .col(ColumnDef::new(PurchaseOrders::SentAt).timestamp().null())
                        .col(
                            ColumnDef::new(PurchaseOrders::ExpectedDeliveryDate)
                                .date()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::Notes).string().null())
                        .col(
                            ColumnDef::new(PurchaseOrders::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_orders_po_number")
                        .table(PurchaseOrders::Table)
                        .col(PurchaseOrders::PoNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_orders_product_id")
                        .table(PurchaseOrders::Table)
                        .col(PurchaseOrders::ProductId)
                        .to_owned(),
                )
                .await?;

            // The overdue scan filters on expected_delivery_date < today
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_orders_expected_delivery_date")
                        .table(PurchaseOrders::Table)
                        .col(PurchaseOrders::ExpectedDeliveryDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum PurchaseOrders {
        Table,
        Id,
        PoNumber,
        ProductId,
        SupplierId,
        QuantityOrdered,
        UnitPriceAtIssuance,
        TotalAmount,
        Status,
        SentMethod,
        SentTo,
        SentAt,
        ExpectedDeliveryDate,
        Notes,
        CreatedAt,
    }
}
