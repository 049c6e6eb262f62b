//! Native client implementation - runs domain operations in database transactions

use crate::contract::{
    AlignOutcome, ScheduleEntry, ScheduleTemplate, TaskDefinition, TenantLink, TenantScheduleApi,
    TenantScheduleError,
};
use crate::infra::storage::SeaOrmUnitOfWork;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Native client implementation for in-process calls
///
/// Every write goes through one transaction so a failed alignment aborts the
/// task definition save that triggered it.
#[derive(Clone)]
pub struct NativeClient {
    uow: Arc<SeaOrmUnitOfWork>,
}

impl NativeClient {
    /// Create a new native client
    pub fn new(uow: Arc<SeaOrmUnitOfWork>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl TenantScheduleApi for NativeClient {
    async fn generate_schedule(
        &self,
        templates: &BTreeMap<String, ScheduleTemplate>,
    ) -> Result<BTreeMap<String, ScheduleEntry>, TenantScheduleError> {
        self.uow.service().generate_schedule(templates).await
    }

    async fn sync_schedule(
        &self,
        entries: &BTreeMap<String, ScheduleEntry>,
    ) -> Result<Vec<TaskDefinition>, TenantScheduleError> {
        self.uow
            .run(|service| async move { service.sync_schedule(entries).await })
            .await
    }

    async fn save_task_definition(
        &self,
        task: TaskDefinition,
    ) -> Result<(TaskDefinition, AlignOutcome), TenantScheduleError> {
        self.uow
            .run(|service| async move { service.save_task_definition(task).await })
            .await
    }

    async fn delete_task_definition(&self, id: i64) -> Result<(), TenantScheduleError> {
        self.uow
            .run(|service| async move { service.delete_task_definition(id).await })
            .await
    }

    async fn align(&self, task_definition_id: i64) -> Result<AlignOutcome, TenantScheduleError> {
        self.uow
            .run(|service| async move { service.align(task_definition_id).await })
            .await
    }

    async fn update_link(&self, link: TenantLink) -> Result<TenantLink, TenantScheduleError> {
        self.uow
            .run(|service| async move { service.update_link(link).await })
            .await
    }

    async fn get_link(
        &self,
        task_definition_id: i64,
    ) -> Result<Option<TenantLink>, TenantScheduleError> {
        self.uow.service().get_link(task_definition_id).await
    }

    async fn links_for_tenant(
        &self,
        schema_name: &str,
    ) -> Result<Vec<TenantLink>, TenantScheduleError> {
        self.uow.service().links_for_tenant(schema_name).await
    }
}
