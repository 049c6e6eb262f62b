//! Repository traits for data access
//!
//! These traits define the collaborators the domain service needs.
//! Implementations are in infra/storage/repositories.rs

use crate::contract::{CrontabFields, CrontabSchedule, TaskDefinition, Tenant, TenantLink};
use anyhow::Result;
use async_trait::async_trait;

/// Read-only view of the tenants provisioned by the tenant system
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// List tenants, optionally leaving out the public scope
    async fn list(&self, exclude_public: bool) -> Result<Vec<Tenant>>;

    /// Find a tenant by schema name
    async fn get(&self, schema_name: &str) -> Result<Option<Tenant>>;
}

/// Crontab rows with upsert-by-value semantics
#[async_trait]
pub trait CrontabStore: Send + Sync {
    /// Return the row matching `fields` and `timezone`, inserting it if absent.
    /// Existing rows are never modified.
    async fn get_or_create(&self, fields: &CrontabFields, timezone: &str)
        -> Result<CrontabSchedule>;
}

/// Task definitions (owned by the scheduler-sync and admin collaborators)
#[async_trait]
pub trait TaskDefinitionStore: Send + Sync {
    /// Find a task definition with its crontab resolved
    async fn get(&self, id: i64) -> Result<Option<TaskDefinition>>;

    /// Find a task definition by its unique name
    async fn find_by_name(&self, name: &str) -> Result<Option<TaskDefinition>>;

    /// Insert (id == 0) or update every field of a task definition
    async fn upsert(&self, task: &TaskDefinition) -> Result<TaskDefinition>;

    /// Overwrite the headers blob only
    async fn persist_metadata(&self, id: i64, headers: &str) -> Result<()>;

    /// Point the crontab trigger at another row
    async fn repoint_trigger(&self, id: i64, crontab: &CrontabSchedule) -> Result<()>;

    async fn delete(&self, id: i64) -> Result<()>;
}

/// Tenant links (owned by this module)
#[async_trait]
pub trait TenantLinkStore: Send + Sync {
    /// Find the link of a task definition
    async fn get(&self, task_definition_id: i64) -> Result<Option<TenantLink>>;

    /// Create or update the link keyed by its task definition
    async fn upsert(&self, link: &TenantLink) -> Result<TenantLink>;

    /// All links bound to a tenant
    async fn list_by_tenant(&self, schema_name: &str) -> Result<Vec<TenantLink>>;

    async fn list_all(&self) -> Result<Vec<TenantLink>>;

    async fn delete(&self, task_definition_id: i64) -> Result<()>;
}
