//! Contract error types for tenant schedule service
//!
//! These errors are transport-agnostic and used for inter-module communication.

/// Tenant schedule service domain errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TenantScheduleError {
    /// Headers name a tenant that the directory does not know
    #[error("Tenant not found: {schema_name}")]
    TenantNotFound { schema_name: String },

    /// Task definition headers are not a JSON object
    #[error("Malformed headers on task definition {task_definition_id}: {details}")]
    MetadataFormat {
        task_definition_id: i64,
        details: String,
    },

    /// Neither or both of interval/crontab are set
    #[error("Task definition {task_definition_id} has no unambiguous trigger")]
    AmbiguousTrigger { task_definition_id: i64 },

    #[error("Task definition not found: {id}")]
    TaskDefinitionNotFound { id: i64 },

    #[error("Invalid crontab '{expression}': {details}")]
    InvalidCrontab { expression: String, details: String },

    #[error("Invalid interval 'every {every} {period}': {details}")]
    InvalidInterval {
        every: i64,
        period: String,
        details: String,
    },

    #[error("Unknown timezone: {timezone}")]
    InvalidTimezone { timezone: String },

    #[error("Invalid schema name: {schema_name}")]
    InvalidSchemaName { schema_name: String },

    /// Collaborator failure; details are logged where it happens
    #[error("Internal error")]
    Internal,
}
