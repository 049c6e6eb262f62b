//! Contract layer - public API for inter-module communication
//!
//! This layer contains transport-agnostic models and the native client trait.

pub mod client;
pub mod error;
pub mod model;

pub use client::TenantScheduleApi;
pub use error::TenantScheduleError;
pub use model::{
    AlignOutcome, CrontabFields, CrontabSchedule, EntryOptions, Headers, IntervalPeriod,
    IntervalSchedule, Schedule, ScheduleEntry, ScheduleTemplate, TaskDefinition, TenancyOptions,
    Tenant, TenantLink, Trigger, SCHEMA_NAME_HEADER, USE_TENANT_TIMEZONE_HEADER, UTC,
};
