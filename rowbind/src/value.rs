//! Database values and the coercion protocol used when a column's declared type
//! differs from the type of the member it is bound to.

use crate::error::ConvertError;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Display;
use std::str::FromStr;
use uuid::Uuid;

/// Declared type of a column, or the underlying type of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Decimal,
    String,
    Char,
    Guid,
    DateTime,
    DateTimeOffset,
    Date,
    Time,
    TimeSpan,
    Bytes,
    /// A member typed as [`Value`] accepts whatever the column holds.
    Any,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::I8 => "i8",
            ValueKind::I16 => "i16",
            ValueKind::I32 => "i32",
            ValueKind::I64 => "i64",
            ValueKind::U8 => "u8",
            ValueKind::U16 => "u16",
            ValueKind::U32 => "u32",
            ValueKind::U64 => "u64",
            ValueKind::F32 => "f32",
            ValueKind::F64 => "f64",
            ValueKind::Decimal => "Decimal",
            ValueKind::String => "String",
            ValueKind::Char => "char",
            ValueKind::Guid => "Uuid",
            ValueKind::DateTime => "NaiveDateTime",
            ValueKind::DateTimeOffset => "DateTime<FixedOffset>",
            ValueKind::Date => "NaiveDate",
            ValueKind::Time => "NaiveTime",
            ValueKind::TimeSpan => "Duration",
            ValueKind::Bytes => "Vec<u8>",
            ValueKind::Any => "Value",
        }
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            ValueKind::I8 | ValueKind::I16 | ValueKind::I32 | ValueKind::I64 | ValueKind::U8 | ValueKind::U16 | ValueKind::U32 | ValueKind::U64
        )
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    String(String),
    Char(char),
    Guid(Uuid),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
    Date(NaiveDate),
    Time(NaiveTime),
    TimeSpan(Duration),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn kind(&self) -> Option<ValueKind> {
        let kind = match self {
            Value::Null => return None,
            Value::Bool(_) => ValueKind::Bool,
            Value::I8(_) => ValueKind::I8,
            Value::I16(_) => ValueKind::I16,
            Value::I32(_) => ValueKind::I32,
            Value::I64(_) => ValueKind::I64,
            Value::U8(_) => ValueKind::U8,
            Value::U16(_) => ValueKind::U16,
            Value::U32(_) => ValueKind::U32,
            Value::U64(_) => ValueKind::U64,
            Value::F32(_) => ValueKind::F32,
            Value::F64(_) => ValueKind::F64,
            Value::Decimal(_) => ValueKind::Decimal,
            Value::String(_) => ValueKind::String,
            Value::Char(_) => ValueKind::Char,
            Value::Guid(_) => ValueKind::Guid,
            Value::DateTime(_) => ValueKind::DateTime,
            Value::DateTimeOffset(_) => ValueKind::DateTimeOffset,
            Value::Date(_) => ValueKind::Date,
            Value::Time(_) => ValueKind::Time,
            Value::TimeSpan(_) => ValueKind::TimeSpan,
            Value::Bytes(_) => ValueKind::Bytes,
        };
        Some(kind)
    }

    pub fn type_name(&self) -> &'static str {
        self.kind().map_or("null", ValueKind::name)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integral payload of any integer variant.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I8(v) => Some(*v as i64),
            Value::I16(v) => Some(*v as i64),
            Value::I32(v) => Some(*v as i64),
            Value::I64(v) => Some(*v),
            Value::U8(v) => Some(*v as i64),
            Value::U16(v) => Some(*v as i64),
            Value::U32(v) => Some(*v as i64),
            Value::U64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Builds a value of the given integral kind, failing when `n` does not fit.
    pub fn integral(kind: ValueKind, n: i64) -> Result<Value, ConvertError> {
        convert(Value::I64(n), kind)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(v) => write!(f, "{}", v),
            Value::I8(v) => write!(f, "{}", v),
            Value::I16(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::U8(v) => write!(f, "{}", v),
            Value::U16(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::String(v) => f.write_str(v),
            Value::Char(v) => write!(f, "{}", v),
            Value::Guid(v) => write!(f, "{}", v),
            Value::DateTime(v) => write!(f, "{}", v),
            Value::DateTimeOffset(v) => write!(f, "{}", v.to_rfc3339()),
            Value::Date(v) => write!(f, "{}", v),
            Value::Time(v) => write!(f, "{}", v),
            Value::TimeSpan(v) => write!(f, "{}", v),
            Value::Bytes(v) => {
                f.write_str("0x")?;
                for b in v {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
        }
    }
}

enum Number {
    Int(i128),
    Float(f64),
    Dec(Decimal),
}

fn to_number(value: &Value) -> Option<Number> {
    let n = match value {
        Value::Bool(v) => Number::Int(*v as i128),
        Value::Char(v) => Number::Int(*v as u32 as i128),
        Value::I8(v) => Number::Int(*v as i128),
        Value::I16(v) => Number::Int(*v as i128),
        Value::I32(v) => Number::Int(*v as i128),
        Value::I64(v) => Number::Int(*v as i128),
        Value::U8(v) => Number::Int(*v as i128),
        Value::U16(v) => Number::Int(*v as i128),
        Value::U32(v) => Number::Int(*v as i128),
        Value::U64(v) => Number::Int(*v as i128),
        Value::F32(v) => Number::Float(*v as f64),
        Value::F64(v) => Number::Float(*v),
        Value::Decimal(v) => Number::Dec(*v),
        _ => return None,
    };
    Some(n)
}

// floats round to nearest, ties to even
fn integral(n: &Number) -> Option<i128> {
    match n {
        Number::Int(i) => Some(*i),
        Number::Float(f) => {
            if !f.is_finite() {
                return None;
            }
            let r = f.round_ties_even();
            if r < i128::MIN as f64 || r > i128::MAX as f64 {
                None
            } else {
                Some(r as i128)
            }
        }
        Number::Dec(d) => d.round().to_i128(),
    }
}

fn float(n: &Number) -> Option<f64> {
    match n {
        Number::Int(i) => Some(*i as f64),
        Number::Float(f) => Some(*f),
        Number::Dec(d) => d.to_f64(),
    }
}

macro_rules! narrow {
    ($n:expr, $t:ty, $variant:ident) => {
        integral($n).and_then(|i| <$t>::try_from(i).ok()).map(Value::$variant)
    };
}

fn from_number(n: Number, target: ValueKind) -> Option<Value> {
    match target {
        ValueKind::I8 => narrow!(&n, i8, I8),
        ValueKind::I16 => narrow!(&n, i16, I16),
        ValueKind::I32 => narrow!(&n, i32, I32),
        ValueKind::I64 => narrow!(&n, i64, I64),
        ValueKind::U8 => narrow!(&n, u8, U8),
        ValueKind::U16 => narrow!(&n, u16, U16),
        ValueKind::U32 => narrow!(&n, u32, U32),
        ValueKind::U64 => narrow!(&n, u64, U64),
        ValueKind::F64 => float(&n).map(Value::F64),
        ValueKind::F32 => float(&n)
            .map(|f| f as f32)
            .filter(|f| f.is_finite() || !float(&n).is_some_and(f64::is_finite))
            .map(Value::F32),
        ValueKind::Decimal => {
            let d = match n {
                Number::Int(i) => Decimal::try_from_i128_with_scale(i, 0).ok(),
                Number::Float(f) => Decimal::from_f64(f),
                Number::Dec(d) => Some(d),
            };
            d.map(Value::Decimal)
        }
        ValueKind::Bool => Some(Value::Bool(match n {
            Number::Int(i) => i != 0,
            Number::Float(f) => f != 0.0,
            Number::Dec(d) => !d.is_zero(),
        })),
        ValueKind::Char => integral(&n)
            .and_then(|i| u32::try_from(i).ok())
            .and_then(char::from_u32)
            .map(Value::Char),
        _ => None,
    }
}

fn parse_as<T>(s: &str, target: ValueKind, wrap: fn(T) -> Value) -> Result<Value, ConvertError>
where
    T: FromStr,
    T::Err: Display,
{
    s.trim()
        .parse::<T>()
        .map(wrap)
        .map_err(|e| ConvertError::new(ValueKind::String.name(), target.name(), e.to_string()))
}

fn parse_date_time(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local()))
        .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0)))
}

fn parse_str(s: String, target: ValueKind) -> Result<Value, ConvertError> {
    let fail = |reason: &str| ConvertError::new(ValueKind::String.name(), target.name(), reason);
    match target {
        ValueKind::Bool => match s.trim().to_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(fail("expected true or false")),
        },
        ValueKind::I8 => parse_as(&s, target, Value::I8),
        ValueKind::I16 => parse_as(&s, target, Value::I16),
        ValueKind::I32 => parse_as(&s, target, Value::I32),
        ValueKind::I64 => parse_as(&s, target, Value::I64),
        ValueKind::U8 => parse_as(&s, target, Value::U8),
        ValueKind::U16 => parse_as(&s, target, Value::U16),
        ValueKind::U32 => parse_as(&s, target, Value::U32),
        ValueKind::U64 => parse_as(&s, target, Value::U64),
        ValueKind::F32 => parse_as(&s, target, Value::F32),
        ValueKind::F64 => parse_as(&s, target, Value::F64),
        ValueKind::Decimal => parse_as(&s, target, Value::Decimal),
        ValueKind::Guid => parse_as(&s, target, Value::Guid),
        ValueKind::Char => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Char(c)),
                _ => Err(fail("expected exactly one character")),
            }
        }
        ValueKind::DateTime => parse_date_time(&s).map(Value::DateTime).ok_or_else(|| fail("unrecognized date-time")),
        ValueKind::DateTimeOffset => DateTime::parse_from_rfc3339(s.trim())
            .map(Value::DateTimeOffset)
            .map_err(|e| fail(&e.to_string())),
        ValueKind::Date => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Value::Date)
            .map_err(|e| fail(&e.to_string())),
        ValueKind::Time => NaiveTime::parse_from_str(s.trim(), "%H:%M:%S%.f")
            .map(Value::Time)
            .map_err(|e| fail(&e.to_string())),
        ValueKind::Bytes => Ok(Value::Bytes(s.into_bytes())),
        ValueKind::String | ValueKind::Any => Ok(Value::String(s)),
        ValueKind::TimeSpan => Err(fail("no conversion defined")),
    }
}

fn midnight() -> NaiveTime {
    NaiveTime::from_hms_opt(0, 0, 0).unwrap_or_default()
}

/// Converts `value` to the `target` kind. NULL stays NULL.
pub fn convert(value: Value, target: ValueKind) -> Result<Value, ConvertError> {
    let source = match value.kind() {
        None => return Ok(Value::Null),
        Some(kind) => kind,
    };
    if source == target || target == ValueKind::Any {
        return Ok(value);
    }
    let fail = |reason: &str| ConvertError::new(source.name(), target.name(), reason);
    match (value, target) {
        (v, ValueKind::String) => Ok(Value::String(v.to_string())),
        (Value::String(s), t) => parse_str(s, t),
        (Value::Bytes(b), ValueKind::Guid) => Uuid::from_slice(&b).map(Value::Guid).map_err(|e| fail(&e.to_string())),
        (Value::Guid(g), ValueKind::Bytes) => Ok(Value::Bytes(g.as_bytes().to_vec())),
        (Value::DateTime(dt), ValueKind::Date) => Ok(Value::Date(dt.date())),
        (Value::DateTime(dt), ValueKind::Time) => Ok(Value::Time(dt.time())),
        (Value::DateTime(dt), ValueKind::DateTimeOffset) => FixedOffset::east_opt(0)
            .map(|utc| Value::DateTimeOffset(DateTime::from_naive_utc_and_offset(dt, utc)))
            .ok_or_else(|| fail("invalid offset")),
        (Value::Date(d), ValueKind::DateTime) => Ok(Value::DateTime(d.and_time(midnight()))),
        (Value::DateTimeOffset(dt), ValueKind::DateTime) => Ok(Value::DateTime(dt.naive_local())),
        (Value::DateTimeOffset(dt), ValueKind::Date) => Ok(Value::Date(dt.date_naive())),
        (Value::Time(t), ValueKind::TimeSpan) => Ok(Value::TimeSpan(t.signed_duration_since(midnight()))),
        (Value::TimeSpan(d), ValueKind::Time) => {
            let secs = d.num_seconds();
            let nanos = (d - Duration::seconds(secs)).num_nanoseconds().unwrap_or(0);
            u32::try_from(secs)
                .ok()
                .zip(u32::try_from(nanos).ok())
                .and_then(|(s, n)| NaiveTime::from_num_seconds_from_midnight_opt(s, n))
                .map(Value::Time)
                .ok_or_else(|| fail("duration is not a time of day"))
        }
        (v, t) => match to_number(&v) {
            Some(n) => from_number(n, t).ok_or_else(|| fail(&format!("{} is out of range or not convertible", v))),
            None => Err(fail("no conversion defined")),
        },
    }
}
