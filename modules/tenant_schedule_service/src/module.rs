//! Module wiring and lifecycle

use crate::api::native::NativeClient;
use crate::config::Config;
use crate::contract::{ScheduleTemplate, TenantScheduleApi};
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::SeaOrmUnitOfWork;
use anyhow::Result;
use parking_lot::RwLock;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Tenant schedule service module
pub struct TenantScheduleModule {
    config: RwLock<Config>,
    client: RwLock<Option<Arc<NativeClient>>>,
}

impl Default for TenantScheduleModule {
    fn default() -> Self {
        Self {
            config: RwLock::new(Config::default()),
            client: RwLock::new(None),
        }
    }
}

impl TenantScheduleModule {
    /// Run migrations and build the native client over `db`
    pub async fn init(&self, cfg: Config, db: Arc<DatabaseConnection>) -> Result<()> {
        cfg.validate()?;

        Migrator::up(db.as_ref(), None).await?;
        tracing::info!("Tenant schedule migrations completed");

        let uow = Arc::new(SeaOrmUnitOfWork::new(db, cfg.public_schema_name.clone()));
        *self.client.write() = Some(Arc::new(NativeClient::new(uow)));
        *self.config.write() = cfg;

        tracing::info!("Tenant schedule service initialized");
        Ok(())
    }

    /// Client for in-process calls
    pub fn client(&self) -> Result<Arc<dyn TenantScheduleApi>> {
        let client = self
            .client
            .read()
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Tenant schedule service not initialized"))?
            .clone();
        Ok(client)
    }

    /// Schedule templates from the loaded configuration
    pub fn templates(&self) -> Result<BTreeMap<String, ScheduleTemplate>> {
        Ok(self.config.read().templates()?)
    }

    /// Expand configured templates across tenants and persist the result
    pub async fn sync_configured_schedule(&self) -> Result<usize> {
        let client = self.client()?;
        let entries = client.generate_schedule(&self.templates()?).await?;
        let synced = client.sync_schedule(&entries).await?;

        tracing::info!(entries = synced.len(), "Synchronized configured schedule");
        Ok(synced.len())
    }
}
