//! Contract models for tenant schedule service
//!
//! These models are transport-agnostic and used for inter-module communication.
//! NO serde derives - these are pure domain models. Header maps are kept as
//! `serde_json` maps because they are opaque routing metadata.

use std::collections::BTreeMap;
use std::fmt;

/// Opaque routing metadata attached to a task definition or schedule entry
pub type Headers = serde_json::Map<String, serde_json::Value>;

/// Header carrying the tenant (or public scope) identifier
pub const SCHEMA_NAME_HEADER: &str = "schema_name";

/// Write-once header consumed by link reconciliation, never persisted
pub const USE_TENANT_TIMEZONE_HEADER: &str = "use_tenant_timezone";

/// Timezone used by every crontab that does not follow its tenant
pub const UTC: &str = "UTC";

/// Tenant as seen by the scheduler (owned by the provisioning system)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant {
    /// Unique schema identifier
    pub schema_name: String,
    /// Display name
    pub name: String,
    /// IANA timezone name
    pub timezone: String,
}

impl Tenant {
    pub fn new(schema_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema_name: schema_name.into(),
            name: name.into(),
            timezone: UTC.to_string(),
        }
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }
}

/// The five crontab fields, each in crontab field syntax
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CrontabFields {
    pub minute: String,
    pub hour: String,
    pub day_of_week: String,
    pub day_of_month: String,
    pub month_of_year: String,
}

impl Default for CrontabFields {
    fn default() -> Self {
        Self {
            minute: "*".to_string(),
            hour: "*".to_string(),
            day_of_week: "*".to_string(),
            day_of_month: "*".to_string(),
            month_of_year: "*".to_string(),
        }
    }
}

impl fmt::Display for CrontabFields {
    /// Standard 5-field order: MIN HOUR DOM MON DOW
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.minute, self.hour, self.day_of_month, self.month_of_year, self.day_of_week
        )
    }
}

/// Persisted crontab schedule row (value object, unique over fields + timezone)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrontabSchedule {
    pub id: i64,
    pub fields: CrontabFields,
    pub timezone: String,
}

/// Interval period unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalPeriod {
    Days,
    Hours,
    Minutes,
    Seconds,
    Microseconds,
}

impl IntervalPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Hours => "hours",
            Self::Minutes => "minutes",
            Self::Seconds => "seconds",
            Self::Microseconds => "microseconds",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "days" => Some(Self::Days),
            "hours" => Some(Self::Hours),
            "minutes" => Some(Self::Minutes),
            "seconds" => Some(Self::Seconds),
            "microseconds" => Some(Self::Microseconds),
            _ => None,
        }
    }
}

/// Fixed interval trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntervalSchedule {
    pub every: i64,
    pub period: IntervalPeriod,
}

/// Persisted recurring job description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDefinition {
    /// Row identifier (0 before the first save)
    pub id: i64,
    /// Unique entry name
    pub name: String,
    /// Target callable name
    pub task: String,
    /// Interval trigger (mutually exclusive with `crontab`)
    pub interval: Option<IntervalSchedule>,
    /// Crontab trigger (mutually exclusive with `interval`)
    pub crontab: Option<CrontabSchedule>,
    /// Serialized routing headers
    pub headers: String,
    pub enabled: bool,
}

impl TaskDefinition {
    /// New, unsaved task definition with empty headers
    pub fn new(name: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            task: task.into(),
            interval: None,
            crontab: None,
            headers: "{}".to_string(),
            enabled: true,
        }
    }

    pub fn with_crontab(mut self, crontab: CrontabSchedule) -> Self {
        self.interval = None;
        self.crontab = Some(crontab);
        self
    }

    pub fn with_interval(mut self, interval: IntervalSchedule) -> Self {
        self.crontab = None;
        self.interval = Some(interval);
        self
    }

    pub fn with_headers(mut self, headers: impl Into<String>) -> Self {
        self.headers = headers.into();
        self
    }

    /// The trigger, provided exactly one of interval/crontab is set
    pub fn trigger(&self) -> Option<Trigger<'_>> {
        match (&self.interval, &self.crontab) {
            (Some(interval), None) => Some(Trigger::Interval(interval)),
            (None, Some(crontab)) => Some(Trigger::Crontab(crontab)),
            _ => None,
        }
    }
}

/// Borrowed view of a task definition's trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger<'a> {
    Interval(&'a IntervalSchedule),
    Crontab(&'a CrontabSchedule),
}

/// Join record binding a task definition to exactly one tenant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantLink {
    pub task_definition_id: i64,
    pub tenant: Tenant,
    pub use_tenant_timezone: bool,
}

/// Schedule of a declarative entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    Crontab(CrontabFields),
    Interval(IntervalSchedule),
}

/// Options forwarded to the scheduler with every run of an entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryOptions {
    /// Routing headers
    pub headers: Headers,
    /// Any other option (queue, expires, ...), passed through untouched
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Tenancy directives of a schedule template
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TenancyOptions {
    /// Run on the public scope
    pub public: bool,
    /// Run on every tenant
    pub all_tenants: bool,
    /// Tenant entries follow their tenant's timezone
    pub use_tenant_timezone: bool,
}

/// Declarative, pre-expansion schedule entry
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleTemplate {
    pub task: String,
    pub schedule: Schedule,
    pub options: EntryOptions,
    /// `None` means the template is never scheduled
    pub tenancy_options: Option<TenancyOptions>,
}

/// Concrete schedule entry produced by expansion
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry {
    pub task: String,
    pub schedule: Schedule,
    pub options: EntryOptions,
}

/// Result of aligning a task definition with its tenant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlignOutcome {
    /// Link and headers already consistent, nothing written
    AlreadyAligned,
    /// A new link was created
    Linked(TenantLink),
    /// An existing link was re-derived and persisted
    Reconciled(TenantLink),
}

impl AlignOutcome {
    pub fn link(&self) -> Option<&TenantLink> {
        match self {
            Self::AlreadyAligned => None,
            Self::Linked(link) | Self::Reconciled(link) => Some(link),
        }
    }
}
