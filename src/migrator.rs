use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_machines_tables::Migration),
            Box::new(m20240101_000003_create_providers_and_parts_tables::Migration),
            Box::new(m20240101_000004_create_repair_requests_tables::Migration),
            Box::new(m20240101_000005_create_receipts_tables::Migration),
            Box::new(m20240101_000006_create_notifications_table::Migration),
        ]
    }
}

mod m20240101_000001_create_users_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Users::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Users::Username).string_len(100).not_null().unique_key())
                        .col(ColumnDef::new(Users::Email).string_len(255).not_null().unique_key())
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Users::Role).string_len(32).not_null())
                        .col(ColumnDef::new(Users::FullName).string().null())
                        .col(ColumnDef::new(Users::Phone).string_len(40).null())
                        .col(ColumnDef::new(Users::Active).boolean().not_null().default(true))
                        .col(ColumnDef::new(Users::LoginCodeHash).string().null())
                        .col(ColumnDef::new(Users::LoginCodeExpiresAt).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(Users::LoginCodeAttempts).integer().not_null().default(0))
                        .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Users::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_users_role")
                        .table(Users::Table)
                        .col(Users::Role)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Users {
        Table,
        Id,
        Username,
        Email,
        PasswordHash,
        Role,
        FullName,
        Phone,
        Active,
        LoginCodeHash,
        LoginCodeExpiresAt,
        LoginCodeAttempts,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_machines_tables {

    use super::m20240101_000001_create_users_table::Users;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_machines_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Machines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Machines::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Machines::Name).string().not_null())
                        .col(ColumnDef::new(Machines::MachineType).string().not_null())
                        .col(ColumnDef::new(Machines::Brand).string().null())
                        .col(ColumnDef::new(Machines::Model).string().null())
                        .col(ColumnDef::new(Machines::SerialNumber).string().null())
                        .col(ColumnDef::new(Machines::Status).string_len(32).not_null())
                        .col(ColumnDef::new(Machines::Location).string().null())
                        .col(ColumnDef::new(Machines::PurchaseDate).date().null())
                        .col(ColumnDef::new(Machines::WarrantyExpiration).date().null())
                        .col(ColumnDef::new(Machines::Notes).text().null())
                        .col(ColumnDef::new(Machines::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Machines::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(MachineClients::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MachineClients::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(MachineClients::MachineId).integer().not_null())
                        .col(ColumnDef::new(MachineClients::ClientId).integer().not_null())
                        .col(
                            ColumnDef::new(MachineClients::AssignedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_machine_clients_machine_id")
                                .from(MachineClients::Table, MachineClients::MachineId)
                                .to(Machines::Table, Machines::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_machine_clients_client_id")
                                .from(MachineClients::Table, MachineClients::ClientId)
                                .to(Users::Table, Users::Id),
                        )
                        .to_owned(),
                )
                .await?;

            // At most one client per machine.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .unique()
                        .name("uq_machine_clients_machine_id")
                        .table(MachineClients::Table)
                        .col(MachineClients::MachineId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_machine_clients_client_id")
                        .table(MachineClients::Table)
                        .col(MachineClients::ClientId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MachineClients::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Machines::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Machines {
        Table,
        Id,
        Name,
        MachineType,
        Brand,
        Model,
        SerialNumber,
        Status,
        Location,
        PurchaseDate,
        WarrantyExpiration,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum MachineClients {
        Table,
        Id,
        MachineId,
        ClientId,
        AssignedAt,
    }
}

mod m20240101_000003_create_providers_and_parts_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_providers_and_parts_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Providers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Providers::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Providers::Name).string().not_null())
                        .col(ColumnDef::new(Providers::ContactName).string().null())
                        .col(ColumnDef::new(Providers::Phone).string_len(40).null())
                        .col(ColumnDef::new(Providers::Email).string().null())
                        .col(ColumnDef::new(Providers::Address).string().null())
                        .col(ColumnDef::new(Providers::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Providers::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Parts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Parts::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Parts::Name).string().not_null())
                        .col(ColumnDef::new(Parts::Description).text().null())
                        .col(ColumnDef::new(Parts::ProviderId).integer().not_null())
                        .col(
                            ColumnDef::new(Parts::Quantity)
                                .integer()
                                .not_null()
                                .default(0)
                                .check(Expr::col(Parts::Quantity).gte(0)),
                        )
                        .col(ColumnDef::new(Parts::UnitPrice).decimal_len(12, 2).null())
                        .col(ColumnDef::new(Parts::Location).string().null())
                        .col(ColumnDef::new(Parts::Status).string_len(32).not_null())
                        .col(ColumnDef::new(Parts::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Parts::UpdatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_parts_provider_id")
                                .from(Parts::Table, Parts::ProviderId)
                                .to(Providers::Table, Providers::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_parts_provider_id")
                        .table(Parts::Table)
                        .col(Parts::ProviderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Parts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Providers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Providers {
        Table,
        Id,
        Name,
        ContactName,
        Phone,
        Email,
        Address,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum Parts {
        Table,
        Id,
        Name,
        Description,
        ProviderId,
        Quantity,
        UnitPrice,
        Location,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_repair_requests_tables {

    use super::m20240101_000001_create_users_table::Users;
    use super::m20240101_000002_create_machines_tables::Machines;
    use super::m20240101_000003_create_providers_and_parts_tables::Parts;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_repair_requests_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(RepairRequests::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RepairRequests::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(RepairRequests::ClientId).integer().not_null())
                        .col(ColumnDef::new(RepairRequests::MachineId).integer().not_null())
                        .col(ColumnDef::new(RepairRequests::FaultDescription).text().not_null())
                        .col(ColumnDef::new(RepairRequests::Severity).string_len(16).not_null())
                        .col(ColumnDef::new(RepairRequests::State).string_len(32).not_null())
                        .col(ColumnDef::new(RepairRequests::TechnicianId).integer().null())
                        .col(ColumnDef::new(RepairRequests::ScheduledAt).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(RepairRequests::TechnicianObservations).text().null())
                        .col(ColumnDef::new(RepairRequests::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(RepairRequests::UpdatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(RepairRequests::RepairDoneAt).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(RepairRequests::FinalizedAt).timestamp_with_time_zone().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_repair_requests_client_id")
                                .from(RepairRequests::Table, RepairRequests::ClientId)
                                .to(Users::Table, Users::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_repair_requests_technician_id")
                                .from(RepairRequests::Table, RepairRequests::TechnicianId)
                                .to(Users::Table, Users::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_repair_requests_machine_id")
                                .from(RepairRequests::Table, RepairRequests::MachineId)
                                .to(Machines::Table, Machines::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_repair_requests_state")
                        .table(RepairRequests::Table)
                        .col(RepairRequests::State)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_repair_requests_client_id")
                        .table(RepairRequests::Table)
                        .col(RepairRequests::ClientId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PartsUsed::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PartsUsed::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(PartsUsed::RepairRequestId).integer().not_null())
                        .col(ColumnDef::new(PartsUsed::PartId).integer().not_null())
                        .col(ColumnDef::new(PartsUsed::Quantity).integer().not_null())
                        .col(ColumnDef::new(PartsUsed::CreatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_parts_used_repair_request_id")
                                .from(PartsUsed::Table, PartsUsed::RepairRequestId)
                                .to(RepairRequests::Table, RepairRequests::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_parts_used_part_id")
                                .from(PartsUsed::Table, PartsUsed::PartId)
                                .to(Parts::Table, Parts::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_parts_used_repair_request_id")
                        .table(PartsUsed::Table)
                        .col(PartsUsed::RepairRequestId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PartsUsed::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(RepairRequests::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum RepairRequests {
        Table,
        Id,
        ClientId,
        MachineId,
        FaultDescription,
        Severity,
        State,
        TechnicianId,
        ScheduledAt,
        TechnicianObservations,
        CreatedAt,
        UpdatedAt,
        RepairDoneAt,
        FinalizedAt,
    }

    #[derive(DeriveIden)]
    enum PartsUsed {
        Table,
        Id,
        RepairRequestId,
        PartId,
        Quantity,
        CreatedAt,
    }
}

mod m20240101_000005_create_receipts_tables {

    use super::m20240101_000001_create_users_table::Users;
    use super::m20240101_000002_create_machines_tables::Machines;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_receipts_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ReceiptBatches::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ReceiptBatches::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(ReceiptBatches::ClientId).integer().not_null())
                        .col(ColumnDef::new(ReceiptBatches::PeriodStart).date().not_null())
                        .col(ColumnDef::new(ReceiptBatches::PeriodEnd).date().not_null())
                        .col(ColumnDef::new(ReceiptBatches::TotalIncome).decimal_len(14, 2).not_null())
                        .col(ColumnDef::new(ReceiptBatches::TotalExpense).decimal_len(14, 2).not_null())
                        .col(ColumnDef::new(ReceiptBatches::Total).decimal_len(14, 2).not_null())
                        .col(ColumnDef::new(ReceiptBatches::CompanyPercentage).decimal_len(5, 2).not_null())
                        .col(ColumnDef::new(ReceiptBatches::CompanyShare).decimal_len(14, 2).not_null())
                        .col(ColumnDef::new(ReceiptBatches::ClientShare).decimal_len(14, 2).not_null())
                        .col(ColumnDef::new(ReceiptBatches::Notes).text().null())
                        .col(ColumnDef::new(ReceiptBatches::CreatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_receipt_batches_client_id")
                                .from(ReceiptBatches::Table, ReceiptBatches::ClientId)
                                .to(Users::Table, Users::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Receipts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Receipts::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Receipts::BatchId).integer().null())
                        .col(ColumnDef::new(Receipts::ClientId).integer().not_null())
                        .col(ColumnDef::new(Receipts::MachineId).integer().not_null())
                        .col(ColumnDef::new(Receipts::Income).decimal_len(14, 2).not_null())
                        .col(ColumnDef::new(Receipts::Expense).decimal_len(14, 2).not_null())
                        .col(ColumnDef::new(Receipts::Total).decimal_len(14, 2).not_null())
                        .col(ColumnDef::new(Receipts::ReceiptDate).date().not_null())
                        .col(ColumnDef::new(Receipts::Notes).text().null())
                        .col(ColumnDef::new(Receipts::CreatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_receipts_batch_id")
                                .from(Receipts::Table, Receipts::BatchId)
                                .to(ReceiptBatches::Table, ReceiptBatches::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_receipts_client_id")
                                .from(Receipts::Table, Receipts::ClientId)
                                .to(Users::Table, Users::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_receipts_machine_id")
                                .from(Receipts::Table, Receipts::MachineId)
                                .to(Machines::Table, Machines::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_receipts_batch_id")
                        .table(Receipts::Table)
                        .col(Receipts::BatchId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Receipts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ReceiptBatches::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ReceiptBatches {
        Table,
        Id,
        ClientId,
        PeriodStart,
        PeriodEnd,
        TotalIncome,
        TotalExpense,
        Total,
        CompanyPercentage,
        CompanyShare,
        ClientShare,
        Notes,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Receipts {
        Table,
        Id,
        BatchId,
        ClientId,
        MachineId,
        Income,
        Expense,
        Total,
        ReceiptDate,
        Notes,
        CreatedAt,
    }
}

mod m20240101_000006_create_notifications_table {

    use super::m20240101_000001_create_users_table::Users;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_notifications_table"
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
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Notifications::UserId).integer().not_null())
                        .col(ColumnDef::new(Notifications::Title).string().not_null())
                        .col(ColumnDef::new(Notifications::Message).text().not_null())
                        .col(ColumnDef::new(Notifications::NotificationType).string_len(40).not_null())
                        .col(ColumnDef::new(Notifications::RelatedId).integer().null())
                        .col(ColumnDef::new(Notifications::Read).boolean().not_null().default(false))
                        .col(ColumnDef::new(Notifications::CreatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_notifications_user_id")
                                .from(Notifications::Table, Notifications::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_notifications_user_read")
                        .table(Notifications::Table)
                        .col(Notifications::UserId)
                        .col(Notifications::Read)
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
    enum Notifications {
        Table,
        Id,
        UserId,
        Title,
        Message,
        NotificationType,
        RelatedId,
        Read,
        CreatedAt,
    }
}
