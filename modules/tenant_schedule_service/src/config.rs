//! Configuration for tenant schedule service module

use crate::contract::{
    EntryOptions, Headers, Schedule, ScheduleTemplate, TenancyOptions, TenantScheduleError,
};
use crate::domain::validation::{validate_interval, validate_schema_name};
use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Environment variable prefix, nested keys are separated by `__`
pub const ENV_PREFIX: &str = "TENANT_SCHEDULE__";

/// Tenant schedule service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Schema name of the shared, non-tenant scope
    #[serde(default = "default_public_schema_name")]
    pub public_schema_name: String,

    /// Declarative schedule templates, keyed by entry name
    ///
    /// Kept in name order, not file order; expansion follows the same order.
    #[serde(default)]
    pub schedule: BTreeMap<String, TemplateConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            public_schema_name: default_public_schema_name(),
            schedule: BTreeMap::new(),
        }
    }
}

/// One schedule template as written in configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateConfig {
    /// Target callable name
    pub task: String,

    /// Crontab string ("0 4 * * *") or `{ every, period }`
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub options: OptionsConfig,

    /// Missing tenancy options mean the template is never scheduled
    #[serde(default)]
    pub tenancy_options: Option<TenancyOptionsConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScheduleConfig {
    Crontab(String),
    Interval { every: i64, period: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionsConfig {
    #[serde(default)]
    pub headers: Headers,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TenancyOptionsConfig {
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub all_tenants: bool,
    #[serde(default)]
    pub use_tenant_timezone: bool,
}

impl Config {
    /// Load defaults, then an optional YAML file, then `TENANT_SCHEDULE__*` variables
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::from_figment(figment)
    }

    pub fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        let config: Self = figment.extract()?;
        config.validate()?;
        tracing::debug!(
            public_schema_name = %config.public_schema_name,
            templates = config.schedule.len(),
            "Loaded tenant schedule configuration"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TenantScheduleError> {
        validate_schema_name(&self.public_schema_name)?;
        self.templates().map(|_| ())
    }

    /// Schedule templates as contract models
    pub fn templates(&self) -> Result<BTreeMap<String, ScheduleTemplate>, TenantScheduleError> {
        self.schedule
            .iter()
            .map(|(name, template)| Ok((name.clone(), template.to_template()?)))
            .collect()
    }
}

impl TemplateConfig {
    fn to_template(&self) -> Result<ScheduleTemplate, TenantScheduleError> {
        let schedule = match &self.schedule {
            ScheduleConfig::Crontab(expression) => Schedule::Crontab(expression.parse()?),
            ScheduleConfig::Interval { every, period } => {
                Schedule::Interval(validate_interval(*every, period)?)
            }
        };

        Ok(ScheduleTemplate {
            task: self.task.clone(),
            schedule,
            options: EntryOptions {
                headers: self.options.headers.clone(),
                extra: self.options.extra.clone(),
            },
            tenancy_options: self.tenancy_options.map(|t| TenancyOptions {
                public: t.public,
                all_tenants: t.all_tenants,
                use_tenant_timezone: t.use_tenant_timezone,
            }),
        })
    }
}

fn default_public_schema_name() -> String {
    "public".to_string()
}
