//! Crontab parsing and evaluation
//!
//! Crontab fields use the classic 5-field syntax with Sunday as day 0. They are
//! compiled to `cron::Schedule` (seconds-first, Sunday as day 1) by pinning seconds to
//! zero and spelling numeric days of week as names.

use super::validation::{parse_timezone, validate_crontab};
use crate::contract::{CrontabFields, CrontabSchedule, TenantScheduleError};
use chrono::{DateTime, Utc};
use cron::Schedule;
use std::str::FromStr;

const DAY_NAMES: [&str; 8] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

impl FromStr for CrontabFields {
    type Err = TenantScheduleError;

    /// Parse "MIN HOUR DOM MON DOW"
    fn from_str(expression: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = expression.split_whitespace().collect();
        if parts.len() != 5 {
            return Err(TenantScheduleError::InvalidCrontab {
                expression: expression.to_string(),
                details: format!("expected 5 fields, got {}", parts.len()),
            });
        }

        let fields = Self {
            minute: parts[0].to_string(),
            hour: parts[1].to_string(),
            day_of_month: parts[2].to_string(),
            month_of_year: parts[3].to_string(),
            day_of_week: parts[4].to_string(),
        };
        validate_crontab(&fields)?;
        Ok(fields)
    }
}

/// Build the seconds-first expression understood by the `cron` crate
pub fn to_cron_expression(fields: &CrontabFields) -> String {
    format!(
        "0 {} {} {} {} {}",
        fields.minute,
        fields.hour,
        fields.day_of_month,
        fields.month_of_year,
        day_of_week_names(&fields.day_of_week)
    )
}

/// Compile crontab fields into an evaluable schedule
pub fn compile(fields: &CrontabFields) -> Result<Schedule, TenantScheduleError> {
    Schedule::from_str(&to_cron_expression(fields)).map_err(|e| {
        TenantScheduleError::InvalidCrontab {
            expression: fields.to_string(),
            details: e.to_string(),
        }
    })
}

impl CrontabSchedule {
    /// Next firing instant strictly after `after`, evaluated in the row's timezone
    pub fn next_run_after(
        &self,
        after: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, TenantScheduleError> {
        let tz = parse_timezone(&self.timezone)?;
        let schedule = compile(&self.fields)?;
        let local = after.with_timezone(&tz);
        Ok(schedule
            .after(&local)
            .next()
            .map(|next| next.with_timezone(&Utc)))
    }
}

fn day_of_week_names(field: &str) -> String {
    field
        .split(',')
        .map(day_of_week_item)
        .collect::<Vec<_>>()
        .join(",")
}

fn day_of_week_item(item: &str) -> String {
    let (base, step) = match item.split_once('/') {
        Some((base, step)) => (base, Some(step)),
        None => (item, None),
    };
    let with_step = |base: String| match step {
        Some(step) => format!("{}/{}", base, step),
        None => base,
    };

    let Some((from, to)) = base.split_once('-') else {
        return with_step(day_name(base).to_string());
    };

    // Named ranges cannot run past Saturday, so a range ending at 7 is split
    match (from.parse::<usize>(), to) {
        (Ok(0), "7") => with_step("Sun-Sat".to_string()),
        (Ok(start @ 1..=6), "7") => {
            let head = if start == 6 {
                "Sat".to_string()
            } else {
                with_step(format!("{}-Sat", DAY_NAMES[start]))
            };
            let stride = step
                .and_then(|s| s.parse::<usize>().ok())
                .filter(|s| *s > 0)
                .unwrap_or(1);
            if (7 - start) % stride == 0 {
                format!("{},Sun", head)
            } else {
                head
            }
        }
        _ => with_step(format!("{}-{}", day_name(from), day_name(to))),
    }
}

fn day_name(token: &str) -> &str {
    match token.parse::<usize>() {
        Ok(n) if n < DAY_NAMES.len() => DAY_NAMES[n],
        _ => token,
    }
}
