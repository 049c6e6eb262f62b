//! SeaORM entities for database tables

/// Tenants table (provisioned by the tenant system, read-only here)
pub mod tenant {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "tenants")]
    pub struct Model {
        /// Schema name (primary key)
        #[sea_orm(primary_key, auto_increment = false)]
        pub schema_name: String,

        pub name: String,

        /// IANA timezone name
        pub timezone: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::tenant_link::Entity")]
        TenantLinks,
    }

    impl Related<super::tenant_link::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::TenantLinks.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Crontab schedules, unique over all fields and the timezone
pub mod crontab_schedule {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "crontab_schedules")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub minute: String,
        pub hour: String,
        pub day_of_week: String,
        pub day_of_month: String,
        pub month_of_year: String,
        pub timezone: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::task_definition::Entity")]
        TaskDefinitions,
    }

    impl Related<super::task_definition::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::TaskDefinitions.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Task definitions
pub mod task_definition {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "task_definitions")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,

        #[sea_orm(unique)]
        pub name: String,

        /// Target callable name
        pub task: String,

        /// Interval trigger, stored inline
        pub interval_every: Option<i64>,
        pub interval_period: Option<String>,

        /// Crontab trigger
        pub crontab_id: Option<i64>,

        /// Routing headers as a JSON object
        pub headers: String,

        pub enabled: bool,

        pub created_at: DateTimeUtc,

        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::crontab_schedule::Entity",
            from = "Column::CrontabId",
            to = "super::crontab_schedule::Column::Id"
        )]
        CrontabSchedule,
        #[sea_orm(has_one = "super::tenant_link::Entity")]
        TenantLink,
    }

    impl Related<super::crontab_schedule::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::CrontabSchedule.def()
        }
    }

    impl Related<super::tenant_link::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::TenantLink.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Tenant links, one per task definition
pub mod tenant_link {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "tenant_links")]
    pub struct Model {
        /// Linked task definition (primary key, one link per task definition)
        #[sea_orm(primary_key, auto_increment = false)]
        pub task_definition_id: i64,

        pub tenant_schema_name: String,

        pub use_tenant_timezone: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::task_definition::Entity",
            from = "Column::TaskDefinitionId",
            to = "super::task_definition::Column::Id"
        )]
        TaskDefinition,
        #[sea_orm(
            belongs_to = "super::tenant::Entity",
            from = "Column::TenantSchemaName",
            to = "super::tenant::Column::SchemaName"
        )]
        Tenant,
    }

    impl Related<super::task_definition::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::TaskDefinition.def()
        }
    }

    impl Related<super::tenant::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Tenant.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}
