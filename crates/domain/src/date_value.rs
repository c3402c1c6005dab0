// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Dates as they appear in stored documents.
//!
//! Older documents hold dates as ISO strings, as raw epoch seconds, or as
//! timestamp objects (`{ "seconds": .., "nanoseconds": .. }`). `DateValue`
//! names each accepted shape; anything else is rejected when the document
//! is read.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

/// A date in one of the shapes documents are allowed to carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum DateValue {
    /// An already-typed calendar date.
    Native(Date),
    /// Seconds since the Unix epoch.
    EpochSeconds(i64),
    /// `YYYY-MM-DD` or an RFC 3339 timestamp.
    IsoString(String),
}

impl DateValue {
    /// Interprets a JSON value as a date.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnrecognizedDateShape` for `null`, booleans,
    /// arrays, non-finite numbers and objects without a numeric `seconds`
    /// (or `_seconds`) field.
    pub fn from_json(value: &Value) -> Result<Self, DomainError> {
        match value {
            Value::String(s) => Ok(Self::IsoString(s.clone())),
            Value::Number(n) => epoch_seconds(n).map(Self::EpochSeconds),
            Value::Object(map) => timestamp_seconds(map).map(Self::EpochSeconds),
            Value::Null => Err(unrecognized("null")),
            Value::Bool(_) => Err(unrecognized("boolean")),
            Value::Array(_) => Err(unrecognized("array")),
        }
    }

    /// Converts this value to a calendar date.
    ///
    /// Epoch seconds and RFC 3339 timestamps are placed on the calendar of
    /// `offset`; plain `YYYY-MM-DD` strings are taken as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if the string cannot be parsed or the timestamp is
    /// out of range.
    pub fn to_date(&self, offset: UtcOffset) -> Result<Date, DomainError> {
        match self {
            Self::Native(date) => Ok(*date),
            Self::EpochSeconds(seconds) => OffsetDateTime::from_unix_timestamp(*seconds)
                .map(|at| at.to_offset(offset).date())
                .map_err(|_| DomainError::TimestampOutOfRange { seconds: *seconds }),
            Self::IsoString(s) => parse_iso(s.trim(), offset),
        }
    }

    /// Converts this value to the canonical `YYYY-MM-DD` form.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be converted to a date.
    pub fn to_canonical_string(&self, offset: UtcOffset) -> Result<String, DomainError> {
        self.to_date(offset).map(canonical_date_string)
    }
}

impl TryFrom<Value> for DateValue {
    type Error = DomainError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json(&value)
    }
}

impl From<DateValue> for Value {
    fn from(value: DateValue) -> Self {
        match value {
            DateValue::Native(date) => Self::String(canonical_date_string(date)),
            DateValue::EpochSeconds(seconds) => {
                let mut map = Map::new();
                map.insert("seconds".to_string(), Self::from(seconds));
                map.insert("nanoseconds".to_string(), Self::from(0));
                Self::Object(map)
            }
            DateValue::IsoString(s) => Self::String(s),
        }
    }
}

impl From<Date> for DateValue {
    fn from(date: Date) -> Self {
        Self::Native(date)
    }
}

/// Formats a date as `YYYY-MM-DD`.
#[must_use]
pub fn canonical_date_string(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Parses a canonical `YYYY-MM-DD` string.
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if the string is not a valid date.
pub fn parse_canonical_date(s: &str) -> Result<Date, DomainError> {
    Date::parse(s, format_description!("[year]-[month]-[day]")).map_err(|e| {
        DomainError::DateParseError {
            date_string: s.to_string(),
            error: e.to_string(),
        }
    })
}

fn parse_iso(s: &str, offset: UtcOffset) -> Result<Date, DomainError> {
    if let Ok(date) = parse_canonical_date(s) {
        return Ok(date);
    }
    OffsetDateTime::parse(s, &Rfc3339)
        .map(|at| at.to_offset(offset).date())
        .map_err(|e| DomainError::DateParseError {
            date_string: s.to_string(),
            error: e.to_string(),
        })
}

fn epoch_seconds(n: &serde_json::Number) -> Result<i64, DomainError> {
    if let Some(seconds) = n.as_i64() {
        return Ok(seconds);
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.abs() < 9.0e15 => Ok(truncate_seconds(f)),
        _ => Err(unrecognized("non-integral number")),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn truncate_seconds(f: f64) -> i64 {
    f.floor() as i64
}

fn timestamp_seconds(map: &Map<String, Value>) -> Result<i64, DomainError> {
    match map.get("seconds").or_else(|| map.get("_seconds")) {
        Some(Value::Number(n)) => epoch_seconds(n),
        Some(_) => Err(unrecognized("timestamp object with non-numeric seconds")),
        None => Err(unrecognized("object")),
    }
}

fn unrecognized(shape: &str) -> DomainError {
    DomainError::UnrecognizedDateShape {
        shape: shape.to_string(),
    }
}
