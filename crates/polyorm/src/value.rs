//! Owned SQL values passed across the `Querier` boundary.

use crate::error::{OrmError, OrmResult};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// A dynamically typed SQL value.
///
/// Dialect code never inspects driver types; every bound parameter and every
/// scanned column is one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
    Json(serde_json::Value),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value counts as "unset" for key purposes: null, zero, or empty text.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Null => true,
            Value::I64(v) => *v == 0,
            Value::U64(v) => *v == 0,
            Value::Text(s) => s.is_empty(),
            Value::Bytes(b) => b.is_empty(),
            _ => false,
        }
    }

    /// Integer view of the value, used when scanning generated keys.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            Value::U64(v) => i64::try_from(*v).ok(),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Shift a timestamp into `tz`; other values pass through.
    pub fn in_time_zone(self, tz: FixedOffset) -> Self {
        match self {
            Value::DateTime(dt) => Value::DateTime(dt.with_timezone(&tz)),
            other => other,
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I64(_) => "i64",
            Value::U64(_) => "u64",
            Value::F64(_) => "f64",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Json(_) => "json",
        }
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::I64(i64::from(v))
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::U64(u64::from(v))
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64);
impl_from_unsigned!(u8, u16, u32, u64);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F64(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Value::DateTime(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v.fixed_offset())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// Conversion out of a [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: Value) -> OrmResult<Self>;
}

fn mismatch(expected: &str, got: &Value) -> OrmError {
    OrmError::decode(
        "",
        format!("expected {expected}, got {}", got.type_name()),
    )
}

impl FromValue for Value {
    fn from_value(value: Value) -> OrmResult<Self> {
        Ok(value)
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::I64(v) => Ok(v),
            Value::U64(v) => i64::try_from(v).map_err(|e| OrmError::decode("", e.to_string())),
            // Oracle-family drivers hand NUMBER columns back as text.
            Value::Text(ref s) => s.trim().parse().map_err(|_| mismatch("i64", &value)),
            // ... or as floats, e.g. COUNT(*).
            Value::F64(v) if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 => {
                Ok(v as i64)
            }
            ref other => Err(mismatch("i64", other)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> OrmResult<Self> {
        let v = i64::from_value(value)?;
        i32::try_from(v).map_err(|e| OrmError::decode("", e.to_string()))
    }
}

impl FromValue for u64 {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::U64(v) => Ok(v),
            Value::I64(v) => u64::try_from(v).map_err(|e| OrmError::decode("", e.to_string())),
            Value::Text(ref s) => s.trim().parse().map_err(|_| mismatch("u64", &value)),
            ref other => Err(mismatch("u64", other)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::F64(v) => Ok(v),
            Value::I64(v) => Ok(v as f64),
            Value::U64(v) => Ok(v as f64),
            Value::Text(ref s) => s.trim().parse().map_err(|_| mismatch("f64", &value)),
            ref other => Err(mismatch("f64", other)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Bool(v) => Ok(v),
            Value::I64(v) => Ok(v != 0),
            Value::U64(v) => Ok(v != 0),
            ref other => Err(mismatch("bool", other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Text(s) => Ok(s),
            ref other => Err(mismatch("text", other)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Bytes(b) => Ok(b),
            Value::Text(s) => Ok(s.into_bytes()),
            ref other => Err(mismatch("bytes", other)),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Date(d) => Ok(d),
            Value::DateTime(dt) => Ok(dt.date_naive()),
            ref other => Err(mismatch("date", other)),
        }
    }
}

impl FromValue for DateTime<FixedOffset> {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            ref other => Err(mismatch("datetime", other)),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Json(v) => Ok(v),
            Value::Text(ref s) => {
                serde_json::from_str(s).map_err(|e| OrmError::decode("", e.to_string()))
            }
            ref other => Err(mismatch("json", other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Null => Ok(None),
            v => T::from_value(v).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_detection() {
        assert!(Value::Null.is_zero());
        assert!(Value::I64(0).is_zero());
        assert!(Value::U64(0).is_zero());
        assert!(Value::from("").is_zero());
        assert!(!Value::I64(7).is_zero());
        assert!(!Value::Bool(false).is_zero());
    }

    #[test]
    fn numeric_text_decodes() {
        assert_eq!(i64::from_value(Value::from(" 42")).unwrap(), 42);
        assert_eq!(Option::<i64>::from_value(Value::Null).unwrap(), None);
        assert_eq!(i64::from_value(Value::F64(3.0)).unwrap(), 3);
        assert!(i64::from_value(Value::F64(2.5)).is_err());
        assert!(i64::from_value(Value::F64(f64::NAN)).is_err());
        assert!(i64::from_value(Value::Bool(true)).is_err());
        assert!(u64::from_value(Value::I64(-1)).is_err());
    }

    #[test]
    fn time_zone_shift_keeps_instant() {
        let utc = DateTime::parse_from_rfc3339("2024-05-01T12:00:00+00:00").unwrap();
        let tz = FixedOffset::east_opt(8 * 3600).unwrap();
        let Value::DateTime(shifted) = Value::DateTime(utc).in_time_zone(tz) else {
            panic!("expected datetime");
        };
        assert_eq!(shifted, utc);
        assert_eq!(shifted.offset().local_minus_utc(), 8 * 3600);
    }
}
