//! Domain service - schedule expansion and tenant link consistency

use super::expander::expand;
use super::headers::{headers_to_blob, RoutingHeaders};
use super::repository::{CrontabStore, TaskDefinitionStore, TenantDirectory, TenantLinkStore};
use super::validation::validate_timezone;
use crate::contract::{
    AlignOutcome, CrontabSchedule, Schedule, ScheduleEntry, ScheduleTemplate, TaskDefinition,
    Tenant, TenantLink, TenantScheduleError, Trigger, UTC,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Domain service for tenant-aware task definitions
///
/// Keeps every task definition linked to exactly one tenant, keeps the
/// `schema_name` header equal to the linked tenant and keeps crontab triggers in the
/// timezone the link asks for. All writes of one call are expected to share a
/// transaction provided by the caller (see `infra::storage::unit_of_work`).
pub struct Service {
    directory: Arc<dyn TenantDirectory>,
    crontabs: Arc<dyn CrontabStore>,
    tasks: Arc<dyn TaskDefinitionStore>,
    links: Arc<dyn TenantLinkStore>,
    public_schema_name: String,
}

impl Service {
    /// Create a new service instance
    pub fn new(
        directory: Arc<dyn TenantDirectory>,
        crontabs: Arc<dyn CrontabStore>,
        tasks: Arc<dyn TaskDefinitionStore>,
        links: Arc<dyn TenantLinkStore>,
        public_schema_name: impl Into<String>,
    ) -> Self {
        Self {
            directory,
            crontabs,
            tasks,
            links,
            public_schema_name: public_schema_name.into(),
        }
    }

    // ===== Schedule Operations =====

    /// Expand templates against the current tenant directory
    pub async fn generate_schedule(
        &self,
        templates: &BTreeMap<String, ScheduleTemplate>,
    ) -> Result<BTreeMap<String, ScheduleEntry>, TenantScheduleError> {
        let tenants = self.directory.list(true).await.map_err(internal)?;
        Ok(expand(templates, &tenants, &self.public_schema_name))
    }

    /// Persist expanded entries as task definitions, keyed by entry name
    ///
    /// New crontab triggers start in UTC; `align` moves them to the tenant's
    /// timezone when the entry asks for it. An existing trigger with the same fields
    /// is kept as is, whatever its timezone.
    pub async fn sync_schedule(
        &self,
        entries: &BTreeMap<String, ScheduleEntry>,
    ) -> Result<Vec<TaskDefinition>, TenantScheduleError> {
        let mut synced = Vec::with_capacity(entries.len());

        for (name, entry) in entries {
            let mut task = self
                .tasks
                .find_by_name(name)
                .await
                .map_err(internal)?
                .unwrap_or_else(|| TaskDefinition::new(name.clone(), entry.task.clone()));

            task.task = entry.task.clone();
            task = match &entry.schedule {
                Schedule::Crontab(fields) => match task.crontab.take() {
                    Some(current) if &current.fields == fields => task.with_crontab(current),
                    _ => {
                        let crontab = self
                            .crontabs
                            .get_or_create(fields, UTC)
                            .await
                            .map_err(internal)?;
                        task.with_crontab(crontab)
                    }
                },
                Schedule::Interval(interval) => task.with_interval(*interval),
            };
            task.headers = headers_to_blob(&entry.options.headers);

            let (saved, _) = self.save_task_definition(task).await?;
            synced.push(saved);
        }

        tracing::info!(entries = synced.len(), "Synced tenant schedule");
        Ok(synced)
    }

    // ===== Task Definition Operations =====

    /// Create or update a task definition, then align it with its tenant
    pub async fn save_task_definition(
        &self,
        task: TaskDefinition,
    ) -> Result<(TaskDefinition, AlignOutcome), TenantScheduleError> {
        let saved = self.tasks.upsert(&task).await.map_err(internal)?;
        let outcome = self.align(saved.id).await?;

        // align may have rewritten headers and trigger
        let current = self.load_task(saved.id).await?;
        Ok((current, outcome))
    }

    /// Delete a task definition and its link
    pub async fn delete_task_definition(&self, id: i64) -> Result<(), TenantScheduleError> {
        self.load_task(id).await?;
        self.links.delete(id).await.map_err(internal)?;
        self.tasks.delete(id).await.map_err(internal)?;
        tracing::info!(task_definition_id = id, "Deleted task definition");
        Ok(())
    }

    // ===== Link Operations =====

    /// Ensure a task definition is linked to the tenant its headers name
    ///
    /// Without a link, one is created from the headers (public scope when
    /// `schema_name` is missing). With a link, nothing happens unless the headers
    /// carry `use_tenant_timezone` or a `schema_name` different from the link.
    pub async fn align(&self, task_definition_id: i64) -> Result<AlignOutcome, TenantScheduleError> {
        let task = self.load_task(task_definition_id).await?;
        let headers = RoutingHeaders::parse(task.id, &task.headers)?;
        let schema_name = headers.schema_name()?.map(str::to_owned);

        match self.links.get(task.id).await.map_err(internal)? {
            Some(mut link) => {
                let in_sync = schema_name.as_deref() == Some(link.tenant.schema_name.as_str());
                if in_sync && !headers.has_use_tenant_timezone() {
                    tracing::debug!(task_definition_id = task.id, "Task definition already aligned");
                    return Ok(AlignOutcome::AlreadyAligned);
                }

                // A missing header is restored from the link; a different one moves it
                if let Some(schema_name) = schema_name.filter(|s| *s != link.tenant.schema_name) {
                    link.tenant = self.resolve_tenant(&schema_name).await?;
                }

                let link = self.reconcile(task, headers, link).await?;
                Ok(AlignOutcome::Reconciled(link))
            }
            None => {
                let schema_name = schema_name.unwrap_or_else(|| self.public_schema_name.clone());
                let use_tenant_timezone = headers.use_tenant_timezone()?.unwrap_or(false);
                let tenant = self.resolve_tenant(&schema_name).await?;

                tracing::info!(
                    task_definition_id = task.id,
                    schema_name = %tenant.schema_name,
                    use_tenant_timezone,
                    "Linking task definition to tenant"
                );

                let link = TenantLink {
                    task_definition_id: task.id,
                    tenant,
                    use_tenant_timezone,
                };
                let link = self.reconcile(task, headers, link).await?;
                Ok(AlignOutcome::Linked(link))
            }
        }
    }

    /// Save an edited link (tenant or timezone flag) and propagate it
    pub async fn update_link(&self, mut link: TenantLink) -> Result<TenantLink, TenantScheduleError> {
        let task = self.load_task(link.task_definition_id).await?;
        let headers = RoutingHeaders::parse(task.id, &task.headers)?;
        link.tenant = self.resolve_tenant(&link.tenant.schema_name).await?;
        self.reconcile(task, headers, link).await
    }

    pub async fn get_link(
        &self,
        task_definition_id: i64,
    ) -> Result<Option<TenantLink>, TenantScheduleError> {
        self.links.get(task_definition_id).await.map_err(internal)
    }

    /// Links visible to a tenant; the public scope sees every link
    pub async fn links_for_tenant(
        &self,
        schema_name: &str,
    ) -> Result<Vec<TenantLink>, TenantScheduleError> {
        if schema_name == self.public_schema_name {
            return self.links.list_all().await.map_err(internal);
        }
        self.links.list_by_tenant(schema_name).await.map_err(internal)
    }

    // ===== Helper Methods =====

    /// Re-derive headers and trigger from the link, then persist the link
    ///
    /// Writes the headers once, repoints a crontab trigger at most once and writes
    /// the link once.
    async fn reconcile(
        &self,
        task: TaskDefinition,
        mut headers: RoutingHeaders,
        mut link: TenantLink,
    ) -> Result<TenantLink, TenantScheduleError> {
        headers.set_schema_name(&link.tenant.schema_name);
        if let Some(use_tenant_timezone) = headers.take_use_tenant_timezone()? {
            link.use_tenant_timezone = use_tenant_timezone;
        }

        self.tasks
            .persist_metadata(task.id, &headers.to_blob())
            .await
            .map_err(internal)?;

        match task.trigger() {
            Some(Trigger::Crontab(crontab)) => {
                self.align_crontab_timezone(task.id, crontab, &link).await?
            }
            Some(Trigger::Interval(_)) => {}
            None => {
                let err = TenantScheduleError::AmbiguousTrigger {
                    task_definition_id: task.id,
                };
                tracing::debug!(error = %err, "Skipping timezone alignment");
            }
        }

        self.links.upsert(&link).await.map_err(internal)
    }

    async fn align_crontab_timezone(
        &self,
        task_definition_id: i64,
        crontab: &CrontabSchedule,
        link: &TenantLink,
    ) -> Result<(), TenantScheduleError> {
        let timezone = if link.use_tenant_timezone {
            link.tenant.timezone.as_str()
        } else {
            UTC
        };
        if crontab.timezone == timezone {
            return Ok(());
        }
        validate_timezone(timezone)?;

        // Rows may be shared with other task definitions, never edit them in place
        let replacement = self
            .crontabs
            .get_or_create(&crontab.fields, timezone)
            .await
            .map_err(internal)?;
        self.tasks
            .repoint_trigger(task_definition_id, &replacement)
            .await
            .map_err(internal)?;

        tracing::info!(
            task_definition_id,
            from = %crontab.timezone,
            to = %timezone,
            crontab_id = replacement.id,
            "Repointed crontab trigger"
        );
        Ok(())
    }

    async fn load_task(&self, id: i64) -> Result<TaskDefinition, TenantScheduleError> {
        self.tasks
            .get(id)
            .await
            .map_err(internal)?
            .ok_or(TenantScheduleError::TaskDefinitionNotFound { id })
    }

    async fn resolve_tenant(&self, schema_name: &str) -> Result<Tenant, TenantScheduleError> {
        self.directory
            .get(schema_name)
            .await
            .map_err(internal)?
            .ok_or_else(|| TenantScheduleError::TenantNotFound {
                schema_name: schema_name.to_string(),
            })
    }
}

fn internal(err: anyhow::Error) -> TenantScheduleError {
    tracing::error!(error = ?err, "Tenant schedule storage failure");
    TenantScheduleError::Internal
}
