//! Entity to model mappers
//!
//! Conversions between SeaORM entities and contract models

use super::entity::{crontab_schedule, task_definition, tenant, tenant_link};
use crate::contract::{
    CrontabFields, CrontabSchedule, IntervalPeriod, IntervalSchedule, TaskDefinition, Tenant,
    TenantLink,
};

// ===== Tenant Conversions =====

impl From<tenant::Model> for Tenant {
    fn from(entity: tenant::Model) -> Self {
        Self {
            schema_name: entity.schema_name,
            name: entity.name,
            timezone: entity.timezone,
        }
    }
}

// ===== Crontab Conversions =====

impl From<crontab_schedule::Model> for CrontabSchedule {
    fn from(entity: crontab_schedule::Model) -> Self {
        Self {
            id: entity.id,
            fields: CrontabFields {
                minute: entity.minute,
                hour: entity.hour,
                day_of_week: entity.day_of_week,
                day_of_month: entity.day_of_month,
                month_of_year: entity.month_of_year,
            },
            timezone: entity.timezone,
        }
    }
}

/// New crontab row for `fields` in `timezone`
pub fn new_crontab(fields: &CrontabFields, timezone: &str) -> crontab_schedule::ActiveModel {
    use sea_orm::ActiveValue::*;

    crontab_schedule::ActiveModel {
        id: NotSet,
        minute: Set(fields.minute.clone()),
        hour: Set(fields.hour.clone()),
        day_of_week: Set(fields.day_of_week.clone()),
        day_of_month: Set(fields.day_of_month.clone()),
        month_of_year: Set(fields.month_of_year.clone()),
        timezone: Set(timezone.to_string()),
    }
}

// ===== Task Definition Conversions =====

/// Task definition row together with its crontab row, if any
pub struct TaskDefinitionRow(pub task_definition::Model, pub Option<crontab_schedule::Model>);

impl TryFrom<TaskDefinitionRow> for TaskDefinition {
    type Error = anyhow::Error;

    fn try_from(row: TaskDefinitionRow) -> Result<Self, Self::Error> {
        let TaskDefinitionRow(entity, crontab) = row;

        let interval = match (entity.interval_every, entity.interval_period.as_deref()) {
            (Some(every), Some(period)) => Some(IntervalSchedule {
                every,
                period: IntervalPeriod::parse(period).ok_or_else(|| {
                    anyhow::anyhow!(
                        "unknown interval period '{}' on task definition {}",
                        period,
                        entity.id
                    )
                })?,
            }),
            _ => None,
        };

        Ok(Self {
            id: entity.id,
            name: entity.name,
            task: entity.task,
            interval,
            crontab: crontab.map(Into::into),
            headers: entity.headers,
            enabled: entity.enabled,
        })
    }
}

impl From<&TaskDefinition> for task_definition::ActiveModel {
    fn from(model: &TaskDefinition) -> Self {
        use sea_orm::ActiveValue::*;

        let now = chrono::Utc::now();
        Self {
            id: if model.id == 0 { NotSet } else { Unchanged(model.id) },
            name: Set(model.name.clone()),
            task: Set(model.task.clone()),
            interval_every: Set(model.interval.map(|i| i.every)),
            interval_period: Set(model.interval.map(|i| i.period.as_str().to_string())),
            crontab_id: Set(model.crontab.as_ref().map(|c| c.id)),
            headers: Set(model.headers.clone()),
            enabled: Set(model.enabled),
            created_at: if model.id == 0 { Set(now) } else { NotSet },
            updated_at: Set(now),
        }
    }
}

// ===== Tenant Link Conversions =====

impl From<(tenant_link::Model, tenant::Model)> for TenantLink {
    fn from((link, tenant): (tenant_link::Model, tenant::Model)) -> Self {
        Self {
            task_definition_id: link.task_definition_id,
            tenant: tenant.into(),
            use_tenant_timezone: link.use_tenant_timezone,
        }
    }
}

impl From<&TenantLink> for tenant_link::ActiveModel {
    fn from(model: &TenantLink) -> Self {
        use sea_orm::ActiveValue::*;

        Self {
            task_definition_id: Set(model.task_definition_id),
            tenant_schema_name: Set(model.tenant.schema_name.clone()),
            use_tenant_timezone: Set(model.use_tenant_timezone),
        }
    }
}
