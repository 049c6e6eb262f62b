//! Database migrations for tenant schedule service

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_tenants::Migration),
            Box::new(m20250301_000002_create_crontab_schedules::Migration),
            Box::new(m20250301_000003_create_task_definitions::Migration),
            Box::new(m20250301_000004_create_tenant_links::Migration),
        ]
    }
}

mod m20250301_000001_create_tenants {
    use super::*;

    pub struct Migration;

    // Migrations share one file, so the name cannot come from the file stem
    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_tenants"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Tenants::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Tenants::SchemaName)
                                .string_len(63)
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Tenants::Name).string().not_null())
                        .col(
                            ColumnDef::new(Tenants::Timezone)
                                .string_len(63)
                                .not_null()
                                .default("UTC"),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Tenants::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Tenants {
        Table,
        SchemaName,
        Name,
        Timezone,
    }
}

mod m20250301_000002_create_crontab_schedules {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_crontab_schedules"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CrontabSchedules::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CrontabSchedules::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(CrontabSchedules::Minute).string_len(240).not_null())
                        .col(ColumnDef::new(CrontabSchedules::Hour).string_len(96).not_null())
                        .col(ColumnDef::new(CrontabSchedules::DayOfWeek).string_len(64).not_null())
                        .col(ColumnDef::new(CrontabSchedules::DayOfMonth).string_len(124).not_null())
                        .col(ColumnDef::new(CrontabSchedules::MonthOfYear).string_len(64).not_null())
                        .col(ColumnDef::new(CrontabSchedules::Timezone).string_len(63).not_null())
                        .to_owned(),
                )
                .await?;

            // Upsert-by-value relies on this
            manager
                .create_index(
                    Index::create()
                        .name("uq_crontab_schedules_value")
                        .table(CrontabSchedules::Table)
                        .col(CrontabSchedules::Minute)
                        .col(CrontabSchedules::Hour)
                        .col(CrontabSchedules::DayOfWeek)
                        .col(CrontabSchedules::DayOfMonth)
                        .col(CrontabSchedules::MonthOfYear)
                        .col(CrontabSchedules::Timezone)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CrontabSchedules::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum CrontabSchedules {
        Table,
        Id,
        Minute,
        Hour,
        DayOfWeek,
        DayOfMonth,
        MonthOfYear,
        Timezone,
    }
}

mod m20250301_000003_create_task_definitions {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000003_create_task_definitions"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(TaskDefinitions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TaskDefinitions::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(TaskDefinitions::Name)
                                .string_len(200)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(TaskDefinitions::Task).string_len(200).not_null())
                        .col(ColumnDef::new(TaskDefinitions::IntervalEvery).big_integer())
                        .col(ColumnDef::new(TaskDefinitions::IntervalPeriod).string_len(24))
                        .col(ColumnDef::new(TaskDefinitions::CrontabId).big_integer())
                        .col(
                            ColumnDef::new(TaskDefinitions::Headers)
                                .text()
                                .not_null()
                                .default("{}"),
                        )
                        .col(
                            ColumnDef::new(TaskDefinitions::Enabled)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(TaskDefinitions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(TaskDefinitions::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_task_definitions_crontab")
                                .from(TaskDefinitions::Table, TaskDefinitions::CrontabId)
                                .to(CrontabSchedules::Table, CrontabSchedules::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TaskDefinitions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum TaskDefinitions {
        Table,
        Id,
        Name,
        Task,
        IntervalEvery,
        IntervalPeriod,
        CrontabId,
        Headers,
        Enabled,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum CrontabSchedules {
        Table,
        Id,
    }
}

mod m20250301_000004_create_tenant_links {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000004_create_tenant_links"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(TenantLinks::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TenantLinks::TaskDefinitionId)
                                .big_integer()
                                .not_null()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(TenantLinks::TenantSchemaName)
                                .string_len(63)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TenantLinks::UseTenantTimezone)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_tenant_links_task_definition")
                                .from(TenantLinks::Table, TenantLinks::TaskDefinitionId)
                                .to(TaskDefinitions::Table, TaskDefinitions::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_tenant_links_tenant")
                                .from(TenantLinks::Table, TenantLinks::TenantSchemaName)
                                .to(Tenants::Table, Tenants::SchemaName)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_tenant_links_tenant")
                        .table(TenantLinks::Table)
                        .col(TenantLinks::TenantSchemaName)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TenantLinks::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum TenantLinks {
        Table,
        TaskDefinitionId,
        TenantSchemaName,
        UseTenantTimezone,
    }

    #[derive(DeriveIden)]
    enum TaskDefinitions {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Tenants {
        Table,
        SchemaName,
    }
}
