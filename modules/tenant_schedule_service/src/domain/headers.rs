//! Routing headers codec
//!
//! Headers are stored on a task definition as a JSON object blob. Two keys are
//! reserved: `schema_name` is a persisted routing fact, `use_tenant_timezone` is a
//! write-once input that reconciliation consumes and removes. Every other key is
//! carried through untouched.

use crate::contract::{Headers, TenantScheduleError, SCHEMA_NAME_HEADER, USE_TENANT_TIMEZONE_HEADER};
use serde_json::Value;

/// Parsed headers of one task definition
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingHeaders {
    task_definition_id: i64,
    map: Headers,
}

impl RoutingHeaders {
    /// Parse a headers blob. Blank and `null` blobs are empty maps.
    pub fn parse(task_definition_id: i64, blob: &str) -> Result<Self, TenantScheduleError> {
        if blob.trim().is_empty() {
            return Ok(Self {
                task_definition_id,
                map: Headers::new(),
            });
        }

        let value: Value =
            serde_json::from_str(blob).map_err(|e| TenantScheduleError::MetadataFormat {
                task_definition_id,
                details: e.to_string(),
            })?;

        let map = match value {
            Value::Object(map) => map,
            Value::Null => Headers::new(),
            other => {
                return Err(TenantScheduleError::MetadataFormat {
                    task_definition_id,
                    details: format!("expected a JSON object, got {}", kind(&other)),
                })
            }
        };

        Ok(Self {
            task_definition_id,
            map,
        })
    }

    pub fn schema_name(&self) -> Result<Option<&str>, TenantScheduleError> {
        match self.map.get(SCHEMA_NAME_HEADER) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(self.wrong_type(SCHEMA_NAME_HEADER, "a string", other)),
        }
    }

    pub fn set_schema_name(&mut self, schema_name: &str) {
        self.map.insert(
            SCHEMA_NAME_HEADER.to_string(),
            Value::String(schema_name.to_string()),
        );
    }

    pub fn has_use_tenant_timezone(&self) -> bool {
        self.map.contains_key(USE_TENANT_TIMEZONE_HEADER)
    }

    pub fn use_tenant_timezone(&self) -> Result<Option<bool>, TenantScheduleError> {
        match self.map.get(USE_TENANT_TIMEZONE_HEADER) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.wrong_type(USE_TENANT_TIMEZONE_HEADER, "a boolean", other)),
        }
    }

    /// Remove the write-once flag and return its value
    pub fn take_use_tenant_timezone(&mut self) -> Result<Option<bool>, TenantScheduleError> {
        let value = self.use_tenant_timezone()?;
        self.map.remove(USE_TENANT_TIMEZONE_HEADER);
        Ok(value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    /// Serialize back to the blob stored on the task definition
    pub fn to_blob(&self) -> String {
        headers_to_blob(&self.map)
    }

    fn wrong_type(&self, key: &str, expected: &str, found: &Value) -> TenantScheduleError {
        TenantScheduleError::MetadataFormat {
            task_definition_id: self.task_definition_id,
            details: format!("'{}' must be {}, got {}", key, expected, kind(found)),
        }
    }
}

/// Serialize a header map to a blob
pub fn headers_to_blob(headers: &Headers) -> String {
    Value::Object(headers.clone()).to_string()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
