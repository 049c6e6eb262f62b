//! Tenant-aware schedule expansion
//!
//! A template without tenancy options is never scheduled. A template may run on the
//! public scope (keyed by its own name), on every tenant (keyed
//! `"{schema_name}: {name}"`), or both. Every emitted entry owns its own copy of the
//! template's task, schedule and options.

use crate::contract::{
    ScheduleEntry, ScheduleTemplate, Tenant, SCHEMA_NAME_HEADER, USE_TENANT_TIMEZONE_HEADER,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// Expand templates into concrete per-scope schedule entries
///
/// Tenants whose schema name equals `public_schema_name` are ignored for the
/// all-tenants fan-out. Colliding keys are not de-duplicated: the entry written last
/// wins. Templates are visited in ascending name order, so on a collision the
/// template whose name sorts last wins (a public entry named `"tenant1: x"` overwrites
/// the fan-out of template `"x"` for `tenant1`). Within one template the public entry
/// is written before the tenant entries.
pub fn expand(
    templates: &BTreeMap<String, ScheduleTemplate>,
    tenants: &[Tenant],
    public_schema_name: &str,
) -> BTreeMap<String, ScheduleEntry> {
    let mut entries = BTreeMap::new();

    for (name, template) in templates {
        let Some(tenancy) = template.tenancy_options else {
            tracing::debug!(template = %name, "Template has no tenancy options, skipping");
            continue;
        };

        if tenancy.public {
            entries.insert(
                name.clone(),
                routed_entry(template, public_schema_name, false),
            );
        }

        if tenancy.all_tenants {
            for tenant in tenants
                .iter()
                .filter(|t| t.schema_name != public_schema_name)
            {
                entries.insert(
                    format!("{}: {}", tenant.schema_name, name),
                    routed_entry(template, &tenant.schema_name, tenancy.use_tenant_timezone),
                );
            }
        }
    }

    tracing::debug!(
        templates = templates.len(),
        tenants = tenants.len(),
        entries = entries.len(),
        "Expanded tenant schedule"
    );
    entries
}

fn routed_entry(
    template: &ScheduleTemplate,
    schema_name: &str,
    use_tenant_timezone: bool,
) -> ScheduleEntry {
    let mut options = template.options.clone();
    options.headers.insert(
        SCHEMA_NAME_HEADER.to_string(),
        Value::String(schema_name.to_string()),
    );
    options.headers.insert(
        USE_TENANT_TIMEZONE_HEADER.to_string(),
        Value::Bool(use_tenant_timezone),
    );

    ScheduleEntry {
        task: template.task.clone(),
        schedule: template.schedule.clone(),
        options,
    }
}
