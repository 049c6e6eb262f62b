//! Validation of tenant identifiers, timezones and crontabs

use crate::contract::{CrontabFields, IntervalPeriod, IntervalSchedule, TenantScheduleError};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

static SCHEMA_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^[_a-zA-Z][_a-zA-Z0-9]{0,62}$").unwrap()
});

/// Validate a tenant schema name
///
/// Accepts PostgreSQL identifiers of at most 63 characters that do not use the
/// reserved `pg_` prefix.
pub fn validate_schema_name(schema_name: &str) -> Result<(), TenantScheduleError> {
    if !SCHEMA_NAME_RE.is_match(schema_name) || schema_name.starts_with("pg_") {
        return Err(TenantScheduleError::InvalidSchemaName {
            schema_name: schema_name.to_string(),
        });
    }
    Ok(())
}

/// Resolve an IANA timezone name
pub fn parse_timezone(timezone: &str) -> Result<Tz, TenantScheduleError> {
    timezone
        .parse::<Tz>()
        .map_err(|_| TenantScheduleError::InvalidTimezone {
            timezone: timezone.to_string(),
        })
}

pub fn validate_timezone(timezone: &str) -> Result<(), TenantScheduleError> {
    parse_timezone(timezone).map(|_| ())
}

/// Validate that crontab fields compile to a schedule
pub fn validate_crontab(fields: &CrontabFields) -> Result<(), TenantScheduleError> {
    super::crontab::compile(fields).map(|_| ())
}

/// Build an interval trigger from a positive count and a period name
pub fn validate_interval(
    every: i64,
    period: &str,
) -> Result<IntervalSchedule, TenantScheduleError> {
    let invalid = |details: &str| TenantScheduleError::InvalidInterval {
        every,
        period: period.to_string(),
        details: details.to_string(),
    };

    let parsed = IntervalPeriod::parse(period).ok_or_else(|| invalid("unknown period"))?;
    if every <= 0 {
        return Err(invalid("must be positive"));
    }
    Ok(IntervalSchedule {
        every,
        period: parsed,
    })
}
