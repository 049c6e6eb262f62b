//! Tenant Schedule Service Module
//!
//! Tenant-aware periodic task scheduling. Schedule templates are fanned out into
//! one entry per tenant, and each task definition is kept consistent with the
//! tenant link that records which tenant it runs for and whether its crontab is
//! evaluated in that tenant's timezone.

// Public exports
pub mod contract;
pub use contract::{
    client::TenantScheduleApi, error::TenantScheduleError, AlignOutcome, CrontabFields,
    CrontabSchedule, ScheduleEntry, ScheduleTemplate, TaskDefinition, Tenant, TenantLink,
};

pub mod module;
pub use module::TenantScheduleModule;

pub mod config;
pub use config::Config;

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
