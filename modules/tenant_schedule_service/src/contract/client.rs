//! Native client trait for inter-module communication
//!
//! This trait defines the API that the scheduler-sync and persistence layers use.
//! NO HTTP - direct function calls.

use super::{
    error::TenantScheduleError,
    model::{AlignOutcome, ScheduleEntry, ScheduleTemplate, TaskDefinition, TenantLink},
};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Tenant schedule API
#[async_trait]
pub trait TenantScheduleApi: Send + Sync {
    /// Expand templates into per-tenant schedule entries
    async fn generate_schedule(
        &self,
        templates: &BTreeMap<String, ScheduleTemplate>,
    ) -> Result<BTreeMap<String, ScheduleEntry>, TenantScheduleError>;

    /// Persist expanded entries as task definitions
    async fn sync_schedule(
        &self,
        entries: &BTreeMap<String, ScheduleEntry>,
    ) -> Result<Vec<TaskDefinition>, TenantScheduleError>;

    /// Create or update a task definition, then align it with its tenant
    async fn save_task_definition(
        &self,
        task: TaskDefinition,
    ) -> Result<(TaskDefinition, AlignOutcome), TenantScheduleError>;

    /// Delete a task definition together with its link
    async fn delete_task_definition(&self, id: i64) -> Result<(), TenantScheduleError>;

    /// Align an already persisted task definition with its tenant
    async fn align(&self, task_definition_id: i64) -> Result<AlignOutcome, TenantScheduleError>;

    /// Save an edited link and propagate it to the task definition
    async fn update_link(&self, link: TenantLink) -> Result<TenantLink, TenantScheduleError>;

    /// Get the link of a task definition
    async fn get_link(
        &self,
        task_definition_id: i64,
    ) -> Result<Option<TenantLink>, TenantScheduleError>;

    /// Links visible to a tenant (all of them for the public scope)
    async fn links_for_tenant(
        &self,
        schema_name: &str,
    ) -> Result<Vec<TenantLink>, TenantScheduleError>;
}
