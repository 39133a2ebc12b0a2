use crate::error::ConvertError;
use crate::value::{convert, Value, ValueKind};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::any::type_name;
use uuid::Uuid;

/// Static description of an enumeration stored as its integral discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumInfo {
    pub name: &'static str,
    pub underlying: ValueKind,
    pub variants: &'static [(&'static str, i64)],
}

impl EnumInfo {
    /// Discriminant for a variant name; exact match first, then ignoring case,
    /// then the text read as a number. Numbers are not checked against the variants.
    pub fn parse(&self, name: &str) -> Option<i64> {
        let name = name.trim();
        self.variants
            .iter()
            .find(|(n, _)| *n == name)
            .or_else(|| self.variants.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)))
            .map(|(_, d)| *d)
            .or_else(|| name.parse::<i64>().ok())
    }

    pub fn is_defined(&self, discriminant: i64) -> bool {
        self.variants.iter().any(|(_, d)| *d == discriminant)
    }

    /// Turns a column value into a value of the underlying integral kind.
    /// Strings are parsed by variant name, everything else is converted.
    pub fn to_underlying(&self, value: Value) -> Result<Value, ConvertError> {
        match value {
            Value::String(s) => match self.parse(&s) {
                Some(d) => Value::integral(self.underlying, d),
                None => Err(ConvertError::new("String", self.name, format!("'{}' is neither a variant name nor a number", s))),
            },
            other => convert(other, self.underlying),
        }
    }

    pub fn discriminant(&self, value: Value) -> Result<i64, ConvertError> {
        let source = value.type_name();
        self.to_underlying(value)?
            .as_i64()
            .ok_or_else(|| ConvertError::new(source, self.name, "discriminant out of range"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    pub name: &'static str,
    /// Nullable-unwrapped kind; integral kind for enumerations.
    pub kind: ValueKind,
    pub nullable: bool,
    pub enumeration: Option<EnumInfo>,
}

impl TypeInfo {
    pub const fn scalar(name: &'static str, kind: ValueKind) -> Self {
        TypeInfo { name, kind, nullable: false, enumeration: None }
    }

    pub const fn enumeration(info: EnumInfo) -> Self {
        TypeInfo { name: info.name, kind: info.underlying, nullable: false, enumeration: Some(info) }
    }

    pub fn is_string(&self) -> bool {
        self.kind == ValueKind::String && self.enumeration.is_none()
    }

    /// Whether a column of `column` kind can be handed to this type without conversion.
    pub fn accepts(&self, column: ValueKind) -> bool {
        self.enumeration.is_none() && (self.kind == ValueKind::Any || self.kind == column)
    }
}

/// Types with a fixed database representation.
pub trait DbTyped {
    fn type_info() -> TypeInfo;
}

/// Strict extraction: only the variant matching [`DbTyped::type_info`] is accepted.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ConvertError>;
}

pub trait ToValue {
    fn to_value(&self) -> Value;
}

fn mismatch<T>(value: &Value) -> ConvertError {
    match value {
        Value::Null => ConvertError::new("null", type_name::<T>(), "null is not allowed"),
        other => ConvertError::new(other.type_name(), type_name::<T>(), "unexpected value kind"),
    }
}

macro_rules! impl_db_scalar {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl DbTyped for $t {
                fn type_info() -> TypeInfo {
                    TypeInfo::scalar(ValueKind::$variant.name(), ValueKind::$variant)
                }
            }

            impl FromValue for $t {
                fn from_value(value: Value) -> Result<Self, ConvertError> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(mismatch::<$t>(&other)),
                    }
                }
            }

            impl ToValue for $t {
                fn to_value(&self) -> Value {
                    Value::$variant(self.clone())
                }
            }
        )*
    };
}

impl_db_scalar!(
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    String => String,
    char => Char,
    Uuid => Guid,
    NaiveDateTime => DateTime,
    DateTime<FixedOffset> => DateTimeOffset,
    NaiveDate => Date,
    NaiveTime => Time,
    Duration => TimeSpan,
    Vec<u8> => Bytes,
);

impl DbTyped for Value {
    /// Holds any column, null included.
    fn type_info() -> TypeInfo {
        TypeInfo { nullable: true, ..TypeInfo::scalar("Value", ValueKind::Any) }
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        Ok(value)
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl<T: DbTyped> DbTyped for Option<T> {
    fn type_info() -> TypeInfo {
        TypeInfo { name: type_name::<Option<T>>(), nullable: true, ..T::type_info() }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl ToValue for &str {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS: EnumInfo = EnumInfo { name: "Status", underlying: ValueKind::I32, variants: &[("Active", 1), ("Inactive", 2)] };

    #[test]
    fn option_is_nullable_with_inner_kind() {
        let info = <Option<i32>>::type_info();
        assert!(info.nullable);
        assert_eq!(info.kind, ValueKind::I32);
        assert!(!i32::type_info().nullable);
    }

    #[test]
    fn strict_extraction_rejects_other_kinds() {
        assert_eq!(i64::from_value(Value::I64(3)).unwrap(), 3);
        assert!(i64::from_value(Value::I32(3)).is_err());
        assert!(i64::from_value(Value::Null).is_err());
        assert_eq!(<Option<i64>>::from_value(Value::Null).unwrap(), None);
    }

    #[test]
    fn enum_names_parse_exact_then_ignoring_case() {
        assert_eq!(STATUS.parse("Active"), Some(1));
        assert_eq!(STATUS.parse("inactive"), Some(2));
        assert_eq!(STATUS.parse("Deleted"), None);
    }

    #[test]
    fn enum_digit_strings_parse_as_discriminants() {
        assert_eq!(STATUS.parse(" 2 "), Some(2));
        assert_eq!(STATUS.to_underlying(Value::String("1".into())).unwrap(), Value::I32(1));
        assert_eq!(STATUS.parse("-7"), Some(-7));
        assert!(STATUS.to_underlying(Value::String("99999999999".into())).is_err());
    }

    #[test]
    fn enum_underlying_from_string_or_number() {
        assert_eq!(STATUS.to_underlying(Value::String("Active".into())).unwrap(), Value::I32(1));
        assert_eq!(STATUS.to_underlying(Value::I64(2)).unwrap(), Value::I32(2));
        assert_eq!(STATUS.discriminant(Value::U8(1)).unwrap(), 1);
        assert!(STATUS.to_underlying(Value::String("Gone".into())).is_err());
    }

    #[test]
    fn value_accepts_any_column() {
        assert!(Value::type_info().accepts(ValueKind::Guid));
        assert!(Value::type_info().nullable);
        assert!(i32::type_info().accepts(ValueKind::I32));
        assert!(!i32::type_info().accepts(ValueKind::I64));
        assert!(!TypeInfo::enumeration(STATUS).accepts(ValueKind::I32));
    }
}
