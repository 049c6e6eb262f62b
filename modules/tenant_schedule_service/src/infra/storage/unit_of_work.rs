//! Transaction scope for task definition writes
//!
//! A task definition write and the alignment it triggers (headers rewrite, crontab
//! upsert, trigger repoint, link upsert) commit together or not at all.

use super::repositories::{
    SeaOrmCrontabStore, SeaOrmTaskDefinitionStore, SeaOrmTenantDirectory, SeaOrmTenantLinkStore,
};
use crate::contract::TenantScheduleError;
use crate::domain::Service;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, TransactionTrait};
use std::future::Future;
use std::sync::Arc;

pub struct SeaOrmUnitOfWork {
    db: Arc<DatabaseConnection>,
    public_schema_name: String,
}

impl SeaOrmUnitOfWork {
    pub fn new(db: Arc<DatabaseConnection>, public_schema_name: impl Into<String>) -> Self {
        Self {
            db,
            public_schema_name: public_schema_name.into(),
        }
    }

    /// Service over the pooled connection, for reads
    pub fn service(&self) -> Service {
        self.service_over(self.db.clone())
    }

    /// Run `op` with a service bound to a fresh transaction
    ///
    /// Commits when `op` succeeds, rolls back when it fails.
    pub async fn run<T, F, Fut>(&self, op: F) -> Result<T, TenantScheduleError>
    where
        F: FnOnce(Service) -> Fut,
        Fut: Future<Output = Result<T, TenantScheduleError>>,
    {
        let txn = Arc::new(self.db.begin().await.map_err(db_failure)?);
        let result = op(self.service_over(txn.clone())).await;

        let txn = Arc::try_unwrap(txn).map_err(|_| {
            tracing::error!("Transaction still referenced after the operation finished");
            TenantScheduleError::Internal
        })?;

        match result {
            Ok(value) => {
                txn.commit().await.map_err(db_failure)?;
                Ok(value)
            }
            Err(err) => {
                tracing::debug!(error = %err, "Rolling back tenant schedule transaction");
                txn.rollback().await.map_err(db_failure)?;
                Err(err)
            }
        }
    }

    fn service_over<C>(&self, db: Arc<C>) -> Service
    where
        C: ConnectionTrait + Send + Sync + 'static,
    {
        Service::new(
            Arc::new(SeaOrmTenantDirectory::new(
                db.clone(),
                self.public_schema_name.clone(),
            )),
            Arc::new(SeaOrmCrontabStore::new(db.clone())),
            Arc::new(SeaOrmTaskDefinitionStore::new(db.clone())),
            Arc::new(SeaOrmTenantLinkStore::new(db)),
            self.public_schema_name.clone(),
        )
    }
}

fn db_failure(err: DbErr) -> TenantScheduleError {
    tracing::error!(error = %err, "Tenant schedule transaction failure");
    TenantScheduleError::Internal
}
