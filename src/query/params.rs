//! Typed SQL parameters and their wire encoding.
//!
//! Druid's SQL endpoint takes parameters as `{type, value}` pairs matched
//! positionally against `?` placeholders in the statement. Each
//! [`SqlParameter`] variant has a fixed wire type; conversions from plain
//! Rust values land on the most specific variant, with strings (and
//! anything rendered as one) falling back to `VARCHAR`.

use crate::error::{DruidLinkError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

/// Timestamp wire format: UTC date-time with nanosecond precision and a
/// numeric offset, e.g. `2000-01-01 00:00:00.123456789+0000`.
const SQL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S.%f%z";

/// A typed value bound to one placeholder of a SQL statement.
///
/// Parameters are positional; the count is not validated against the number
/// of placeholders in the statement — the server reports that mismatch.
///
/// # Examples
///
/// ```rust
/// use druid_link::SqlParameter;
///
/// let params: Vec<SqlParameter> = vec![
///     42i64.into(),
///     "waffle".into(),
///     true.into(),
/// ];
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParameter {
    /// Exact-precision decimal, sent as a fixed-point string.
    Decimal(Decimal),

    /// Calendar date without a time component.
    Date(NaiveDate),

    /// Date and time in any zone; normalized to UTC on the wire.
    Timestamp(DateTime<FixedOffset>),

    /// 64-bit binary float.
    Double(f64),

    /// 64-bit signed integer.
    Integer(i64),

    /// Boolean.
    Boolean(bool),

    /// Text; the fallback for anything without a more specific type.
    Varchar(String),
}

/// One `{type, value}` pair as it appears in the query payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireParameter {
    /// Druid SQL type name.
    #[serde(rename = "type")]
    pub kind: &'static str,

    /// The encoded value. Strings for DECIMAL/DATE/TIMESTAMP/VARCHAR,
    /// JSON numbers for DOUBLE/INTEGER, a JSON boolean for BOOLEAN.
    pub value: Value,
}

impl SqlParameter {
    /// Encode this parameter for the wire.
    ///
    /// Fails only for a non-finite `Double`: serde_json would serialize
    /// NaN or infinity as `null`, so the error surfaces here instead of
    /// producing an invalid payload.
    pub fn encode(&self) -> Result<WireParameter> {
        let pair = match self {
            Self::Decimal(d) => WireParameter {
                kind: "DECIMAL",
                value: Value::String(d.to_string()),
            },
            Self::Date(d) => WireParameter {
                kind: "DATE",
                value: Value::String(d.format("%Y-%m-%d").to_string()),
            },
            Self::Timestamp(ts) => WireParameter {
                kind: "TIMESTAMP",
                value: Value::String(
                    ts.with_timezone(&Utc).format(SQL_TIME_FORMAT).to_string(),
                ),
            },
            Self::Double(v) => {
                let number = serde_json::Number::from_f64(*v).ok_or_else(|| {
                    DruidLinkError::Configuration(format!(
                        "DOUBLE parameter must be finite, got {}",
                        v
                    ))
                })?;
                WireParameter {
                    kind: "DOUBLE",
                    value: Value::Number(number),
                }
            }
            Self::Integer(v) => WireParameter {
                kind: "INTEGER",
                value: Value::Number((*v).into()),
            },
            Self::Boolean(v) => WireParameter {
                kind: "BOOLEAN",
                value: Value::Bool(*v),
            },
            Self::Varchar(s) => WireParameter {
                kind: "VARCHAR",
                value: Value::String(s.clone()),
            },
        };
        Ok(pair)
    }
}

/// Encode an ordered parameter list for the wire.
pub fn encode_parameters(params: &[SqlParameter]) -> Result<Vec<WireParameter>> {
    params.iter().map(SqlParameter::encode).collect()
}

impl From<Decimal> for SqlParameter {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<NaiveDate> for SqlParameter {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<DateTime<FixedOffset>> for SqlParameter {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<DateTime<Utc>> for SqlParameter {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value.fixed_offset())
    }
}

impl From<f64> for SqlParameter {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<f32> for SqlParameter {
    fn from(value: f32) -> Self {
        Self::Double(value.into())
    }
}

impl From<i64> for SqlParameter {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for SqlParameter {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u32> for SqlParameter {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<bool> for SqlParameter {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<String> for SqlParameter {
    fn from(value: String) -> Self {
        Self::Varchar(value)
    }
}

impl From<&str> for SqlParameter {
    fn from(value: &str) -> Self {
        Self::Varchar(value.to_string())
    }
}
