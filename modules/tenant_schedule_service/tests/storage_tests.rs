//! Integration tests against an in-memory SQLite database
//!
//! Exercise migrations, SeaORM repositories and the transactional unit of work.

use figment::{
    providers::{Format, Yaml},
    Figment,
};
use sea_orm::{
    ActiveValue::Set, ConnectOptions, Database, DatabaseConnection, EntityTrait, PaginatorTrait,
};
use sea_orm_migration::MigratorTrait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tenant_schedule_service::contract::*;
use tenant_schedule_service::infra::storage::entity::{
    crontab_schedule, task_definition, tenant, tenant_link,
};
use tenant_schedule_service::infra::storage::migrations::Migrator;
use tenant_schedule_service::{Config, TenantScheduleModule};

const CONFIG: &str = r#"
schedule:
  nightly:
    task: core.tasks.cleanup
    schedule: "0 4 * * *"
    tenancy_options:
      public: true
      all_tenants: true
      use_tenant_timezone: true
  heartbeat:
    task: core.tasks.ping
    schedule:
      every: 10
      period: minutes
    tenancy_options:
      all_tenants: true
"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn setup() -> (Arc<DatabaseConnection>, TenantScheduleModule) {
    init_tracing();

    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Arc::new(Database::connect(opts).await.unwrap());

    let config = Config::from_figment(Figment::new().merge(Yaml::string(CONFIG))).unwrap();
    let module = TenantScheduleModule::default();
    module.init(config, db.clone()).await.unwrap();

    for (schema_name, timezone) in [
        ("public", "UTC"),
        ("tenant1", "Europe/London"),
        ("tenant2", "US/Eastern"),
    ] {
        tenant::Entity::insert(tenant::ActiveModel {
            schema_name: Set(schema_name.to_string()),
            name: Set(schema_name.to_uppercase()),
            timezone: Set(timezone.to_string()),
        })
        .exec(db.as_ref())
        .await
        .unwrap();
    }

    (db, module)
}

#[tokio::test]
async fn test_sync_configured_schedule() {
    let (db, module) = setup().await;

    let synced = module.sync_configured_schedule().await.unwrap();
    assert_eq!(synced, 5);

    let client = module.client().unwrap();
    assert_eq!(client.links_for_tenant("tenant1").await.unwrap().len(), 2);
    assert_eq!(client.links_for_tenant("public").await.unwrap().len(), 5);

    let mut timezones: Vec<String> = crontab_schedule::Entity::find()
        .all(db.as_ref())
        .await
        .unwrap()
        .into_iter()
        .map(|row| row.timezone)
        .collect();
    timezones.sort();
    assert_eq!(timezones, vec!["Europe/London", "US/Eastern", "UTC"]);

    // A second sync finds everything in place
    assert_eq!(module.sync_configured_schedule().await.unwrap(), 5);
    assert_eq!(crontab_schedule::Entity::find().count(db.as_ref()).await.unwrap(), 3);
    assert_eq!(task_definition::Entity::find().count(db.as_ref()).await.unwrap(), 5);
}

#[tokio::test]
async fn test_save_moves_task_definition_between_tenants() {
    let (db, module) = setup().await;
    module.sync_configured_schedule().await.unwrap();
    let client = module.client().unwrap();

    let link = client
        .links_for_tenant("tenant1")
        .await
        .unwrap()
        .into_iter()
        .find(|l| l.use_tenant_timezone)
        .unwrap();
    let task = task_definition::Entity::find_by_id(link.task_definition_id)
        .one(db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(task.headers, r#"{"schema_name":"tenant1"}"#);

    // Re-save through the client with headers naming tenant2
    let crontab = crontab_schedule::Entity::find_by_id(task.crontab_id.unwrap())
        .one(db.as_ref())
        .await
        .unwrap()
        .unwrap();
    let definition = TaskDefinition {
        id: task.id,
        name: task.name.clone(),
        task: task.task.clone(),
        interval: None,
        crontab: Some(CrontabSchedule {
            id: crontab.id,
            fields: "0 4 * * *".parse().unwrap(),
            timezone: crontab.timezone.clone(),
        }),
        headers: r#"{"schema_name": "tenant2"}"#.to_string(),
        enabled: true,
    };
    let (saved, outcome) = client.save_task_definition(definition).await.unwrap();

    assert!(matches!(outcome, AlignOutcome::Reconciled(_)));
    assert_eq!(saved.crontab.unwrap().timezone, "US/Eastern");
    let link = client.get_link(task.id).await.unwrap().unwrap();
    assert_eq!(link.tenant.schema_name, "tenant2");
    assert!(link.use_tenant_timezone);
}

#[tokio::test]
async fn test_failed_alignment_rolls_back_sync() {
    let (db, module) = setup().await;
    let client = module.client().unwrap();

    let mut headers = Headers::new();
    headers.insert("schema_name".to_string(), serde_json::json!("ghost"));
    let mut entries = BTreeMap::new();
    entries.insert(
        "ghost: nightly".to_string(),
        ScheduleEntry {
            task: "core.tasks.cleanup".to_string(),
            schedule: Schedule::Crontab("0 4 * * *".parse().unwrap()),
            options: EntryOptions {
                headers,
                extra: BTreeMap::new(),
            },
        },
    );

    let err = client.sync_schedule(&entries).await.unwrap_err();

    assert_eq!(
        err,
        TenantScheduleError::TenantNotFound {
            schema_name: "ghost".to_string()
        }
    );
    assert_eq!(task_definition::Entity::find().count(db.as_ref()).await.unwrap(), 0);
    assert_eq!(crontab_schedule::Entity::find().count(db.as_ref()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_task_definition_removes_link() {
    let (db, module) = setup().await;
    module.sync_configured_schedule().await.unwrap();
    let client = module.client().unwrap();

    let link = client.links_for_tenant("tenant2").await.unwrap().remove(0);
    client
        .delete_task_definition(link.task_definition_id)
        .await
        .unwrap();

    assert!(client.get_link(link.task_definition_id).await.unwrap().is_none());
    assert_eq!(task_definition::Entity::find().count(db.as_ref()).await.unwrap(), 4);
}

#[tokio::test]
async fn test_direct_row_delete_cascades_to_link() {
    let (db, module) = setup().await;
    module.sync_configured_schedule().await.unwrap();
    let client = module.client().unwrap();

    let link = client.links_for_tenant("tenant1").await.unwrap().remove(0);
    task_definition::Entity::delete_by_id(link.task_definition_id)
        .exec(db.as_ref())
        .await
        .unwrap();

    assert!(client.get_link(link.task_definition_id).await.unwrap().is_none());
    assert_eq!(tenant_link::Entity::find().count(db.as_ref()).await.unwrap(), 4);
}

#[tokio::test]
async fn test_migrations_are_recorded_once() {
    let (db, _module) = setup().await;

    assert!(Migrator::get_pending_migrations(db.as_ref())
        .await
        .unwrap()
        .is_empty());
    Migrator::up(db.as_ref(), None).await.unwrap();
    assert_eq!(
        Migrator::get_applied_migrations(db.as_ref())
            .await
            .unwrap()
            .len(),
        4
    );
}
