//! Common test utilities: in-memory repositories and a tenant fixture
//!
//! Tenants: public (UTC), tenant1 (Europe/London), tenant2 (US/Eastern)

#![allow(dead_code)]

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use tenant_schedule_service::contract::*;
use tenant_schedule_service::domain::repository::{
    CrontabStore, TaskDefinitionStore, TenantDirectory, TenantLinkStore,
};
use tenant_schedule_service::domain::Service;

pub const PUBLIC: &str = "public";

// ===== Tenant Directory =====

pub struct MockTenantDirectory {
    tenants: RwLock<BTreeMap<String, Tenant>>,
    public_schema_name: String,
    failing: AtomicBool,
}

impl MockTenantDirectory {
    pub fn new(public_schema_name: &str) -> Self {
        Self {
            tenants: RwLock::new(BTreeMap::new()),
            public_schema_name: public_schema_name.to_string(),
            failing: AtomicBool::new(false),
        }
    }

    pub fn add(&self, tenant: Tenant) {
        self.tenants
            .write()
            .insert(tenant.schema_name.clone(), tenant);
    }

    /// Make every subsequent call fail
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("tenant directory unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl TenantDirectory for MockTenantDirectory {
    async fn list(&self, exclude_public: bool) -> anyhow::Result<Vec<Tenant>> {
        self.check()?;
        Ok(self
            .tenants
            .read()
            .values()
            .filter(|t| !exclude_public || t.schema_name != self.public_schema_name)
            .cloned()
            .collect())
    }

    async fn get(&self, schema_name: &str) -> anyhow::Result<Option<Tenant>> {
        self.check()?;
        Ok(self.tenants.read().get(schema_name).cloned())
    }
}

// ===== Crontab Store =====

#[derive(Default)]
pub struct MockCrontabStore {
    rows: RwLock<Vec<CrontabSchedule>>,
    next_id: AtomicI64,
    calls: AtomicUsize,
}

impl MockCrontabStore {
    /// Insert a row directly, bypassing call counting
    pub fn seed(&self, expression: &str, timezone: &str) -> CrontabSchedule {
        let fields: CrontabFields = expression.parse().unwrap();
        self.find_or_insert(&fields, timezone)
    }

    pub fn rows(&self) -> Vec<CrontabSchedule> {
        self.rows.read().clone()
    }

    pub fn count(&self) -> usize {
        self.rows.read().len()
    }

    /// Number of get_or_create calls
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn find_or_insert(&self, fields: &CrontabFields, timezone: &str) -> CrontabSchedule {
        let mut rows = self.rows.write();
        if let Some(row) = rows
            .iter()
            .find(|r| &r.fields == fields && r.timezone == timezone)
        {
            return row.clone();
        }

        let row = CrontabSchedule {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            fields: fields.clone(),
            timezone: timezone.to_string(),
        };
        rows.push(row.clone());
        row
    }
}

#[async_trait]
impl CrontabStore for MockCrontabStore {
    async fn get_or_create(
        &self,
        fields: &CrontabFields,
        timezone: &str,
    ) -> anyhow::Result<CrontabSchedule> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.find_or_insert(fields, timezone))
    }
}

// ===== Task Definition Store =====

#[derive(Default)]
pub struct MockTaskDefinitionStore {
    tasks: RwLock<BTreeMap<i64, TaskDefinition>>,
    next_id: AtomicI64,
    metadata_writes: AtomicUsize,
    repoints: AtomicUsize,
}

impl MockTaskDefinitionStore {
    /// Insert a task definition without running the post-save hook
    pub fn insert(&self, mut task: TaskDefinition) -> TaskDefinition {
        task.id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.tasks.write().insert(task.id, task.clone());
        task
    }

    /// Overwrite the headers blob without running the post-save hook
    pub fn set_headers(&self, id: i64, headers: &str) {
        if let Some(task) = self.tasks.write().get_mut(&id) {
            task.headers = headers.to_string();
        }
    }

    pub fn task(&self, id: i64) -> TaskDefinition {
        self.tasks.read().get(&id).cloned().unwrap()
    }

    pub fn headers(&self, id: i64) -> serde_json::Value {
        serde_json::from_str(&self.task(id).headers).unwrap()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.tasks.read().contains_key(&id)
    }

    pub fn metadata_writes(&self) -> usize {
        self.metadata_writes.load(Ordering::SeqCst)
    }

    pub fn repoints(&self) -> usize {
        self.repoints.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskDefinitionStore for MockTaskDefinitionStore {
    async fn get(&self, id: i64) -> anyhow::Result<Option<TaskDefinition>> {
        Ok(self.tasks.read().get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<TaskDefinition>> {
        Ok(self
            .tasks
            .read()
            .values()
            .find(|t| t.name == name)
            .cloned())
    }

    async fn upsert(&self, task: &TaskDefinition) -> anyhow::Result<TaskDefinition> {
        if task.id == 0 {
            return Ok(self.insert(task.clone()));
        }
        let mut tasks = self.tasks.write();
        if !tasks.contains_key(&task.id) {
            bail!("task definition {} not found", task.id);
        }
        tasks.insert(task.id, task.clone());
        Ok(task.clone())
    }

    async fn persist_metadata(&self, id: i64, headers: &str) -> anyhow::Result<()> {
        let mut tasks = self.tasks.write();
        let task = tasks
            .get_mut(&id)
            .ok_or_else(|| anyhow!("task definition {} not found", id))?;
        task.headers = headers.to_string();
        self.metadata_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn repoint_trigger(&self, id: i64, crontab: &CrontabSchedule) -> anyhow::Result<()> {
        let mut tasks = self.tasks.write();
        let task = tasks
            .get_mut(&id)
            .ok_or_else(|| anyhow!("task definition {} not found", id))?;
        task.crontab = Some(crontab.clone());
        self.repoints.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, id: i64) -> anyhow::Result<()> {
        self.tasks.write().remove(&id);
        Ok(())
    }
}

// ===== Tenant Link Store =====

#[derive(Default)]
pub struct MockTenantLinkStore {
    links: RwLock<BTreeMap<i64, TenantLink>>,
    upserts: AtomicUsize,
}

impl MockTenantLinkStore {
    pub fn link(&self, task_definition_id: i64) -> Option<TenantLink> {
        self.links.read().get(&task_definition_id).cloned()
    }

    pub fn count(&self) -> usize {
        self.links.read().len()
    }

    pub fn upserts(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TenantLinkStore for MockTenantLinkStore {
    async fn get(&self, task_definition_id: i64) -> anyhow::Result<Option<TenantLink>> {
        Ok(self.link(task_definition_id))
    }

    async fn upsert(&self, link: &TenantLink) -> anyhow::Result<TenantLink> {
        self.links
            .write()
            .insert(link.task_definition_id, link.clone());
        self.upserts.fetch_add(1, Ordering::SeqCst);
        Ok(link.clone())
    }

    async fn list_by_tenant(&self, schema_name: &str) -> anyhow::Result<Vec<TenantLink>> {
        Ok(self
            .links
            .read()
            .values()
            .filter(|l| l.tenant.schema_name == schema_name)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> anyhow::Result<Vec<TenantLink>> {
        Ok(self.links.read().values().cloned().collect())
    }

    async fn delete(&self, task_definition_id: i64) -> anyhow::Result<()> {
        self.links.write().remove(&task_definition_id);
        Ok(())
    }
}

// ===== Fixture =====

/// Service over in-memory repositories, with handles to inspect them
pub struct Harness {
    pub directory: Arc<MockTenantDirectory>,
    pub crontabs: Arc<MockCrontabStore>,
    pub tasks: Arc<MockTaskDefinitionStore>,
    pub links: Arc<MockTenantLinkStore>,
    pub service: Service,
}

impl Harness {
    pub fn new() -> Self {
        let directory = Arc::new(MockTenantDirectory::new(PUBLIC));
        directory.add(Tenant::new(PUBLIC, "Public"));
        directory.add(Tenant::new("tenant1", "Tenant One").with_timezone("Europe/London"));
        directory.add(Tenant::new("tenant2", "Tenant Two").with_timezone("US/Eastern"));

        let crontabs = Arc::new(MockCrontabStore::default());
        let tasks = Arc::new(MockTaskDefinitionStore::default());
        let links = Arc::new(MockTenantLinkStore::default());

        let service = Service::new(
            directory.clone(),
            crontabs.clone(),
            tasks.clone(),
            links.clone(),
            PUBLIC,
        );

        Self {
            directory,
            crontabs,
            tasks,
            links,
            service,
        }
    }

    /// Store a crontab-triggered task definition (trigger in UTC) with `headers`
    pub fn crontab_task(&self, name: &str, expression: &str, headers: &str) -> TaskDefinition {
        let crontab = self.crontabs.seed(expression, UTC);
        self.tasks.insert(
            TaskDefinition::new(name, "core.tasks.run")
                .with_crontab(crontab)
                .with_headers(headers),
        )
    }

    /// Every write this fixture counts
    pub fn writes(&self) -> usize {
        self.crontabs.calls()
            + self.tasks.metadata_writes()
            + self.tasks.repoints()
            + self.links.upserts()
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
