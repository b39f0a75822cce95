// SPDX-License-Identifier: MIT OR Apache-2.0

//! Log record type for the fanlog logging system.
//!
//! This module defines [`LogRecord`], the canonical structured form of one log event, and the
//! builder that assembles it.  The field names are the wire format every downstream consumer
//! reads, so they are fixed:
//!
//! | field             | contents                                                  |
//! |-------------------|-----------------------------------------------------------|
//! | `time`            | ISO-8601 string, or epoch milliseconds in fast-time mode  |
//! | `name`            | logger name, `parent:child` for children                  |
//! | `level`           | `debug`, `info`, `warn` or `error`                        |
//! | `functionName`    | deployment function, when deployed as one                 |
//! | `functionVersion` | deployment function version (may be `null`)               |
//! | `message`         | formatted message, omitted when empty                     |
//! | `err`             | `name`, `message`, `code`, `stack`                        |
//! | `req`             | `method`, `url`, `headers`, `remoteAddress`, `remotePort` |
//! | anything else     | caller fields                                             |
//!
//! # Merge order
//!
//! Fields are written in a fixed order and later writes win: `time` and `name`, then the level
//! defaults (`level` and the deployment fields), then `message`, then the classified fields
//! (`err`/`req`) or the caller's object.  A caller field named `level` therefore replaces the
//! real level.  This is permissive on purpose; nothing is protected.
//!
//! # Example
//!
//! ```rust
//! use fanlog::{Level, LogRecord, Deployment, TimeFormat};
//! use serde_json::json;
//!
//! let record = LogRecord::build(
//!     Level::Info,
//!     "db",
//!     TimeFormat::EpochMillis,
//!     &Deployment::none(),
//!     Some("connected"),
//!     json!({"pool": 4}).as_object().unwrap().clone(),
//! );
//! assert_eq!(record.name(), Some("db"));
//! assert_eq!(record.message(), Some("connected"));
//! assert_eq!(record["pool"], 4);
//! ```

use crate::Level;
use crate::deployment::Deployment;
use crate::input::{Fields, UNSERIALIZABLE};
use chrono::{DateTime, SecondsFormat};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt::{Debug, Display};
use std::ops::Index;

/// How the `time` field is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeFormat {
    /// `2024-05-01T12:00:00.123Z`: UTC, millisecond precision.
    #[default]
    Iso8601,
    /// Integer milliseconds since the Unix epoch.  Cheaper to produce.
    EpochMillis,
}

impl TimeFormat {
    fn now(self) -> Value {
        let millis = crate::sys::now_millis();
        match self {
            TimeFormat::EpochMillis => Value::from(millis),
            TimeFormat::Iso8601 => Value::String(iso8601(millis)),
        }
    }
}

fn iso8601(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/**
One log event in structured form.

A record is an ordered map from field name to JSON value.  It is built once per log call and
shared by every sink that receives the call; sinks that want text get [LogRecord::to_line].
*/
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    fields: Fields,
}

impl LogRecord {
    /**
    Assembles a record.

    `fields` are merged last and may overwrite any conventional field.
    */
    pub fn build(
        level: Level,
        name: &str,
        time: TimeFormat,
        deployment: &Deployment,
        message: Option<&str>,
        fields: Fields,
    ) -> Self {
        let mut record = Fields::new();
        record.insert("time".into(), time.now());
        record.insert("name".into(), Value::String(name.to_string()));
        record.insert("level".into(), Value::String(level.as_str().to_string()));
        if let Some(function) = deployment.fields() {
            for (key, value) in function {
                record.insert(key.into(), value);
            }
        }
        if let Some(message) = message {
            record.insert("message".into(), Value::String(message.to_string()));
        }
        for (key, value) in fields {
            record.insert(key, value);
        }
        LogRecord { fields: record }
    }

    /// Wraps fields that are already in record form, e.g. a line parsed back from a sink.
    pub fn from_fields(fields: Fields) -> Self {
        LogRecord { fields }
    }

    /// Parses one serialized line.  Returns `None` for anything that is not a JSON object.
    pub fn parse_line(line: &[u8]) -> Option<Self> {
        match serde_json::from_slice(line).ok()? {
            Value::Object(fields) => Some(LogRecord { fields }),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn into_fields(self) -> Fields {
        self.fields
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    /// The record's level.  `None` if a caller field replaced it with something else.
    pub fn level(&self) -> Option<Level> {
        self.get("level")?.as_str()?.parse().ok()
    }

    pub fn message(&self) -> Option<&str> {
        self.get("message").and_then(Value::as_str)
    }

    pub fn time(&self) -> Option<&Value> {
        self.get("time")
    }

    /**
    Serializes the record as one newline-terminated JSON line.

    Never fails.  If serialization does, a minimal record with the same `time`, `name` and
    `level` and a placeholder message is written instead.
    */
    pub fn to_line(&self) -> Vec<u8> {
        let mut line = serde_json::to_vec(&self.fields).unwrap_or_else(|_| self.fallback_line());
        line.push(b'\n');
        line
    }

    fn fallback_line(&self) -> Vec<u8> {
        let mut minimal = Fields::new();
        for key in ["time", "name", "level"] {
            if let Some(value) = self.fields.get(key) {
                minimal.insert(key.into(), value.clone());
            }
        }
        minimal.insert("message".into(), Value::String(UNSERIALIZABLE.into()));
        Value::Object(minimal).to_string().into_bytes()
    }
}

impl Index<&str> for LogRecord {
    type Output = Value;

    /// Missing fields index as `null`, like `serde_json::Value`.
    fn index(&self, key: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.fields.get(key).unwrap_or(&NULL)
    }
}

impl Serialize for LogRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl Display for LogRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&Value::Object(self.fields.clone()), f)
    }
}

impl From<LogRecord> for Value {
    fn from(record: LogRecord) -> Self {
        Value::Object(record.fields)
    }
}

/*
Boilerplate notes for LogRecord:

IMPLEMENTED:
- Debug, Clone, PartialEq: derived.  Records compare field by field, in order-insensitive fashion
  (that is how serde_json maps compare).
- Serialize: transparent, the record is its map.
- Display: the JSON line without its newline.
- Index<&str>: reads like a serde_json::Value.

NOT IMPLEMENTED:
- Default: a record without time/name/level is not a record.
- Eq/Hash: JSON numbers include floats.
- Deserialize: use parse_line/from_fields, which keep the map as-is.
*/
