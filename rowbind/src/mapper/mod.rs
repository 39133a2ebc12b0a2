//! Row materialization. A [`Mapper`] is chosen once per (type, sample schema)
//! pair and then applied to every row of the result.

pub mod anonymous;
pub mod binding;
pub mod convertible;
pub mod direct;
pub mod enums;
pub mod nullable;
pub mod object;

use crate::accessor::{ArgInfo, Constructor, MemberInfo, Record};
use crate::debug;
use crate::error::{ConvertError, MappingError};
use crate::row::{Row, Schema};
use crate::types::{DbTyped, EnumInfo, FromValue, TypeInfo};
use crate::value::{Value, ValueKind};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::any::type_name;
use std::fmt;
use uuid::Uuid;

pub use anonymous::{AnonymousMapper, ArgumentInfo};
pub use binding::{match_columns, underlying_name, ColumnMatch, MatchPass};
pub use convertible::ConvertibleMapper;
pub use direct::DirectMapper;
pub use enums::EnumMapper;
pub use nullable::NullableMapper;
pub use object::{MemberSetupInfo, ObjectMapper};

/// Pass-through cast used when the first column already holds the target type.
pub struct DirectCast<T> {
    pub kind: ValueKind,
    pub nullable: bool,
    pub cast: fn(Value) -> Result<T, ConvertError>,
}

pub struct ScalarShape<T> {
    pub info: TypeInfo,
    pub from_value: fn(Value) -> Result<T, ConvertError>,
}

pub struct EnumShape<T> {
    pub info: EnumInfo,
    /// Receives a value of the underlying integral kind.
    pub from_value: fn(Value) -> Result<T, ConvertError>,
}

pub type BoxedRowMapper<T> = Box<dyn RowMapper<T> + Send + Sync>;

pub struct NullableShape<T> {
    pub inner: &'static str,
    pub none: fn() -> T,
    pub parse_inner: fn(&Schema) -> Result<BoxedRowMapper<T>, MappingError>,
}

pub struct PositionalShape<T> {
    pub type_name: &'static str,
    pub args: Vec<ArgInfo>,
    pub construct: Constructor<T>,
}

pub struct ObjectShape<T> {
    pub type_name: &'static str,
    pub construct: fn() -> T,
    pub members: Vec<MemberInfo<T>>,
}

impl<T: Record> ObjectShape<T> {
    pub fn of() -> Self {
        ObjectShape { type_name: type_name::<T>(), construct: T::construct, members: T::members() }
    }
}

/// What a type looks like to the mapper parser.
pub enum Shape<T> {
    Scalar(ScalarShape<T>),
    Enum(EnumShape<T>),
    Nullable(NullableShape<T>),
    Positional(PositionalShape<T>),
    Object(ObjectShape<T>),
}

/// Types that rows can be materialized into.
pub trait Mappable: Sized + 'static {
    fn shape() -> Shape<Self>;

    fn direct_cast() -> Option<DirectCast<Self>> {
        None
    }
}

pub trait RowMapper<T> {
    fn map_row(&self, row: &dyn Row, row_number: usize) -> Result<T, MappingError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapperKind {
    Direct,
    Anonymous,
    Nullable,
    Enum,
    Convertible,
    Object,
}

pub enum Mapper<T> {
    Direct(DirectMapper<T>),
    Anonymous(AnonymousMapper<T>),
    Nullable(NullableMapper<T>),
    Enum(EnumMapper<T>),
    Convertible(ConvertibleMapper<T>),
    Object(ObjectMapper<T>),
}

impl<T: Mappable> Mapper<T> {
    pub fn parse<R: Row + ?Sized>(sample: &R) -> Result<Self, MappingError> {
        Self::from_schema(&Schema::of(sample))
    }

    pub fn from_schema(schema: &Schema) -> Result<Self, MappingError> {
        if let (Some(cast), Some(first)) = (T::direct_cast(), schema.first_kind()) {
            if cast.kind == ValueKind::Any || cast.kind == first {
                debug!("Direct mapper for {} over {} column", type_name::<T>(), first);
                return Ok(Mapper::Direct(DirectMapper::new(cast)));
            }
        }
        let mapper = match T::shape() {
            Shape::Positional(shape) => Mapper::Anonymous(AnonymousMapper::new(shape, schema)),
            Shape::Nullable(shape) => Mapper::Nullable(NullableMapper::new(shape, schema)?),
            Shape::Enum(shape) => Mapper::Enum(EnumMapper::new(shape)),
            Shape::Scalar(shape) => Mapper::Convertible(ConvertibleMapper::new(shape)),
            Shape::Object(shape) => Mapper::Object(ObjectMapper::new(shape, schema)),
        };
        debug!("{:?} mapper for {} over {} columns", mapper.kind(), type_name::<T>(), schema.len());
        Ok(mapper)
    }
}

impl<T> Mapper<T> {
    pub fn kind(&self) -> MapperKind {
        match self {
            Mapper::Direct(_) => MapperKind::Direct,
            Mapper::Anonymous(_) => MapperKind::Anonymous,
            Mapper::Nullable(_) => MapperKind::Nullable,
            Mapper::Enum(_) => MapperKind::Enum,
            Mapper::Convertible(_) => MapperKind::Convertible,
            Mapper::Object(_) => MapperKind::Object,
        }
    }

    pub fn map_row(&self, row: &dyn Row, row_number: usize) -> Result<T, MappingError> {
        match self {
            Mapper::Direct(m) => m.map_row(row, row_number),
            Mapper::Anonymous(m) => m.map_row(row, row_number),
            Mapper::Nullable(m) => m.map_row(row, row_number),
            Mapper::Enum(m) => m.map_row(row, row_number),
            Mapper::Convertible(m) => m.map_row(row, row_number),
            Mapper::Object(m) => m.map_row(row, row_number),
        }
    }

    /// Maps every row, numbering them from zero.
    pub fn map_rows<'a, R, I>(&self, rows: I) -> Result<Vec<T>, MappingError>
    where
        R: Row + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        rows.into_iter().enumerate().map(|(n, row)| self.map_row(row, n)).collect()
    }
}

impl<T> RowMapper<T> for Mapper<T> {
    fn map_row(&self, row: &dyn Row, row_number: usize) -> Result<T, MappingError> {
        Mapper::map_row(self, row, row_number)
    }
}

impl<T> fmt::Debug for Mapper<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mapper<{}>({:?})", type_name::<T>(), self.kind())
    }
}

/// Column 0 of a scalar-style read; rows without columns cannot be mapped.
pub(crate) fn first_value<T>(row: &dyn Row) -> Result<(Value, String), MappingError> {
    if row.field_count() == 0 {
        return Err(MappingError::EmptySchema { target_type: type_name::<T>() });
    }
    Ok((row.value(0), row.name(0).to_string()))
}

macro_rules! impl_mappable_scalar {
    ($($t:ty),* $(,)?) => {
        $(
            impl Mappable for $t {
                fn shape() -> Shape<Self> {
                    Shape::Scalar(ScalarShape { info: <$t>::type_info(), from_value: <$t>::from_value })
                }

                fn direct_cast() -> Option<DirectCast<Self>> {
                    Some(DirectCast { kind: <$t>::type_info().kind, nullable: <$t>::type_info().nullable, cast: <$t>::from_value })
                }
            }
        )*
    };
}

impl_mappable_scalar!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    Decimal,
    String,
    char,
    Uuid,
    NaiveDateTime,
    DateTime<FixedOffset>,
    NaiveDate,
    NaiveTime,
    Duration,
    Vec<u8>,
    Value,
);

impl<U: Mappable + FromValue> Mappable for Option<U> {
    fn shape() -> Shape<Self> {
        Shape::Nullable(NullableShape {
            inner: type_name::<U>(),
            none: || None,
            parse_inner: |schema| {
                let inner: BoxedRowMapper<Option<U>> = Box::new(nullable::SomeAdapter(Mapper::<U>::from_schema(schema)?));
                Ok(inner)
            },
        })
    }

    fn direct_cast() -> Option<DirectCast<Self>> {
        U::direct_cast().map(|d| DirectCast { kind: d.kind, nullable: true, cast: <Option<U>>::from_value })
    }
}
