//! SeaORM repository implementations
//!
//! Repositories are generic over the connection so the same code runs on a pooled
//! `DatabaseConnection` or inside a `DatabaseTransaction`.

use crate::contract::{CrontabFields, CrontabSchedule, TaskDefinition, Tenant, TenantLink};
use crate::domain::repository::{
    CrontabStore, TaskDefinitionStore, TenantDirectory, TenantLinkStore,
};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use sea_orm::{
    prelude::Expr, sea_query::OnConflict, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder,
};
use std::sync::Arc;

use super::entity::{crontab_schedule, task_definition, tenant, tenant_link};
use super::mapper::{new_crontab, TaskDefinitionRow};

// ===== Tenant Directory =====

pub struct SeaOrmTenantDirectory<C> {
    db: Arc<C>,
    public_schema_name: String,
}

impl<C> SeaOrmTenantDirectory<C> {
    pub fn new(db: Arc<C>, public_schema_name: impl Into<String>) -> Self {
        Self {
            db,
            public_schema_name: public_schema_name.into(),
        }
    }
}

#[async_trait]
impl<C> TenantDirectory for SeaOrmTenantDirectory<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn list(&self, exclude_public: bool) -> Result<Vec<Tenant>> {
        let mut query = tenant::Entity::find();
        if exclude_public {
            query = query.filter(tenant::Column::SchemaName.ne(self.public_schema_name.as_str()));
        }

        let results = query
            .order_by_asc(tenant::Column::SchemaName)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn get(&self, schema_name: &str) -> Result<Option<Tenant>> {
        let result = tenant::Entity::find_by_id(schema_name.to_string())
            .one(&*self.db)
            .await?;

        Ok(result.map(Into::into))
    }
}

// ===== Crontab Store =====

pub struct SeaOrmCrontabStore<C> {
    db: Arc<C>,
}

impl<C> SeaOrmCrontabStore<C> {
    pub fn new(db: Arc<C>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<C> CrontabStore for SeaOrmCrontabStore<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn get_or_create(
        &self,
        fields: &CrontabFields,
        timezone: &str,
    ) -> Result<CrontabSchedule> {
        let existing = crontab_schedule::Entity::find()
            .filter(crontab_schedule::Column::Minute.eq(fields.minute.as_str()))
            .filter(crontab_schedule::Column::Hour.eq(fields.hour.as_str()))
            .filter(crontab_schedule::Column::DayOfWeek.eq(fields.day_of_week.as_str()))
            .filter(crontab_schedule::Column::DayOfMonth.eq(fields.day_of_month.as_str()))
            .filter(crontab_schedule::Column::MonthOfYear.eq(fields.month_of_year.as_str()))
            .filter(crontab_schedule::Column::Timezone.eq(timezone))
            .one(&*self.db)
            .await?;

        if let Some(row) = existing {
            return Ok(row.into());
        }

        let row = crontab_schedule::Entity::insert(new_crontab(fields, timezone))
            .exec_with_returning(&*self.db)
            .await?;

        tracing::debug!(crontab_id = row.id, %timezone, "Created crontab schedule");
        Ok(row.into())
    }
}

// ===== Task Definition Store =====

pub struct SeaOrmTaskDefinitionStore<C> {
    db: Arc<C>,
}

impl<C> SeaOrmTaskDefinitionStore<C> {
    pub fn new(db: Arc<C>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<C> TaskDefinitionStore for SeaOrmTaskDefinitionStore<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn get(&self, id: i64) -> Result<Option<TaskDefinition>> {
        let result = task_definition::Entity::find_by_id(id)
            .find_also_related(crontab_schedule::Entity)
            .one(&*self.db)
            .await?;

        result
            .map(|(task, crontab)| TaskDefinitionRow(task, crontab).try_into())
            .transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<TaskDefinition>> {
        let result = task_definition::Entity::find()
            .filter(task_definition::Column::Name.eq(name))
            .find_also_related(crontab_schedule::Entity)
            .one(&*self.db)
            .await?;

        result
            .map(|(task, crontab)| TaskDefinitionRow(task, crontab).try_into())
            .transpose()
    }

    async fn upsert(&self, task: &TaskDefinition) -> Result<TaskDefinition> {
        let active: task_definition::ActiveModel = task.into();

        let id = if task.id == 0 {
            task_definition::Entity::insert(active)
                .exec_with_returning(&*self.db)
                .await?
                .id
        } else {
            task_definition::Entity::update(active)
                .exec(&*self.db)
                .await?
                .id
        };

        self.get(id)
            .await?
            .ok_or_else(|| anyhow!("task definition {} vanished after write", id))
    }

    async fn persist_metadata(&self, id: i64, headers: &str) -> Result<()> {
        let result = task_definition::Entity::update_many()
            .col_expr(task_definition::Column::Headers, Expr::value(headers))
            .col_expr(
                task_definition::Column::UpdatedAt,
                Expr::value(chrono::Utc::now()),
            )
            .filter(task_definition::Column::Id.eq(id))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            bail!("task definition {} not found", id);
        }
        Ok(())
    }

    async fn repoint_trigger(&self, id: i64, crontab: &CrontabSchedule) -> Result<()> {
        let result = task_definition::Entity::update_many()
            .col_expr(task_definition::Column::CrontabId, Expr::value(crontab.id))
            .col_expr(
                task_definition::Column::UpdatedAt,
                Expr::value(chrono::Utc::now()),
            )
            .filter(task_definition::Column::Id.eq(id))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            bail!("task definition {} not found", id);
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        task_definition::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await?;

        Ok(())
    }
}

// ===== Tenant Link Store =====

pub struct SeaOrmTenantLinkStore<C> {
    db: Arc<C>,
}

impl<C> SeaOrmTenantLinkStore<C> {
    pub fn new(db: Arc<C>) -> Self {
        Self { db }
    }
}

fn hydrate((link, tenant): (tenant_link::Model, Option<tenant::Model>)) -> Result<TenantLink> {
    let tenant = tenant.ok_or_else(|| {
        anyhow!(
            "tenant '{}' of task definition {} does not exist",
            link.tenant_schema_name,
            link.task_definition_id
        )
    })?;
    Ok((link, tenant).into())
}

#[async_trait]
impl<C> TenantLinkStore for SeaOrmTenantLinkStore<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn get(&self, task_definition_id: i64) -> Result<Option<TenantLink>> {
        let result = tenant_link::Entity::find_by_id(task_definition_id)
            .find_also_related(tenant::Entity)
            .one(&*self.db)
            .await?;

        result.map(hydrate).transpose()
    }

    async fn upsert(&self, link: &TenantLink) -> Result<TenantLink> {
        let active: tenant_link::ActiveModel = link.into();

        tenant_link::Entity::insert(active)
            .on_conflict(
                OnConflict::column(tenant_link::Column::TaskDefinitionId)
                    .update_columns([
                        tenant_link::Column::TenantSchemaName,
                        tenant_link::Column::UseTenantTimezone,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&*self.db)
            .await?;

        Ok(link.clone())
    }

    async fn list_by_tenant(&self, schema_name: &str) -> Result<Vec<TenantLink>> {
        let results = tenant_link::Entity::find()
            .filter(tenant_link::Column::TenantSchemaName.eq(schema_name))
            .find_also_related(tenant::Entity)
            .order_by_asc(tenant_link::Column::TaskDefinitionId)
            .all(&*self.db)
            .await?;

        results.into_iter().map(hydrate).collect()
    }

    async fn list_all(&self) -> Result<Vec<TenantLink>> {
        let results = tenant_link::Entity::find()
            .find_also_related(tenant::Entity)
            .order_by_asc(tenant_link::Column::TaskDefinitionId)
            .all(&*self.db)
            .await?;

        results.into_iter().map(hydrate).collect()
    }

    async fn delete(&self, task_definition_id: i64) -> Result<()> {
        tenant_link::Entity::delete_by_id(task_definition_id)
            .exec(&*self.db)
            .await?;

        Ok(())
    }
}
