//! Domain layer - business logic and services

pub mod crontab;
pub mod expander;
pub mod headers;
pub mod repository;
pub mod service;
pub mod validation;

pub use expander::expand;
pub use headers::RoutingHeaders;
pub use repository::{CrontabStore, TaskDefinitionStore, TenantDirectory, TenantLinkStore};
pub use service::Service;
