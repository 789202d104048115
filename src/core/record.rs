//! Log record structure
//!
//! A `LogRecord` is the fully built map for one emission: inherited fields,
//! call fields, `level`, `msg`, `time`, `v` and optionally `src`. Raw
//! destinations receive it as is (shared behind an `Arc`); text destinations
//! receive its JSON line.
//!
//! A [`Record`] is the lighter value that exists before that: the pieces of
//! one log call, packaged without copying the logger's fields.

use super::error::Result;
use super::log_level::Level;
use super::render::{fields_to_json, to_json_lossy};
use super::timestamp::parse_iso8601;
use super::value::{FieldValue, Fields};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Record schema version written as `v`
pub const LOG_VERSION: i64 = 0;

/// Where a log call was made, written as `src`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
    pub func: Option<&'static str>,
}

impl SourceLocation {
    pub const fn new(file: &'static str, line: u32, func: Option<&'static str>) -> Self {
        Self { file, line, func }
    }

    /// Location of the caller of the `#[track_caller]` chain this is called from
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(location.file(), location.line(), None)
    }

    /// `{file, line, func?}`
    pub fn to_value(&self) -> FieldValue {
        let mut fields = Fields::new()
            .with_field("file", self.file)
            .with_field("line", self.line);
        if let Some(func) = self.func {
            fields.insert("func", func);
        }
        FieldValue::object(fields)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One log call, packaged for emission
///
/// Holds a reference to the logger's fields rather than a copy; the call
/// fields are owned, so later changes by the caller cannot reach it.
#[derive(Debug, Clone)]
pub struct Record {
    pub(crate) base: Arc<Fields>,
    pub(crate) fields: Option<Fields>,
    pub(crate) level: Level,
    pub(crate) args: Vec<FieldValue>,
    pub(crate) location: SourceLocation,
}

impl Record {
    pub fn level(&self) -> Level {
        self.level
    }

    pub fn call_fields(&self) -> Option<&Fields> {
        self.fields.as_ref()
    }

    pub fn args(&self) -> &[FieldValue] {
        &self.args
    }

    pub fn location(&self) -> SourceLocation {
        self.location
    }
}

#[derive(Clone, PartialEq)]
pub struct LogRecord {
    fields: Fields,
}

impl LogRecord {
    pub fn from_fields(fields: Fields) -> Self {
        Self { fields }
    }

    pub fn level(&self) -> Level {
        self.fields
            .get("level")
            .and_then(FieldValue::as_i64)
            .and_then(|n| u32::try_from(n).ok())
            .map(Level::new)
            .unwrap_or_default()
    }

    pub fn msg(&self) -> &str {
        self.fields.get("msg").and_then(FieldValue::as_str).unwrap_or("")
    }

    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(FieldValue::as_str)
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        match self.fields.get("time")? {
            FieldValue::Time(t) => Some(*t),
            FieldValue::String(s) => parse_iso8601(s),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn into_fields(self) -> Fields {
        self.fields
    }

    /// Cycle-safe JSON object for this record
    pub fn to_json(&self) -> Result<Value> {
        Ok(Value::Object(fields_to_json(&self.fields)?))
    }

    /// Newline-terminated single-line JSON
    pub fn to_json_line(&self) -> Result<String> {
        let mut line = serde_json::to_string(&self.to_json()?)?;
        line.push('\n');
        Ok(line)
    }

    /// Replacement line used when a record cannot be encoded
    ///
    /// Built from the logger's own fields plus the message, time and
    /// version, with `bunyanMsg` describing the failure. If even the logger
    /// fields cannot be encoded the line holds only `bunyanMsg`.
    pub fn fallback_line(base: &Fields, msg: &str, time: &FieldValue, problem: &str) -> String {
        let mut line = match fields_to_json(base) {
            Ok(mut map) => {
                map.insert("bunyanMsg".to_string(), Value::String(problem.to_string()));
                map.insert("msg".to_string(), Value::String(msg.to_string()));
                map.insert("time".to_string(), to_json_lossy(time));
                map.insert("v".to_string(), Value::from(LOG_VERSION));
                Value::Object(map).to_string()
            }
            Err(_) => {
                let mut minimal = Map::new();
                minimal.insert("bunyanMsg".to_string(), Value::String(problem.to_string()));
                Value::Object(minimal).to_string()
            }
        };
        line.push('\n');
        line
    }
}

impl Serialize for LogRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let json = fields_to_json(&self.fields).map_err(serde::ser::Error::custom)?;
        json.serialize(serializer)
    }
}

impl fmt::Debug for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogRecord {:?}", self.fields)
    }
}
