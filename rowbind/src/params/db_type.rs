use crate::error::MappingError;
use crate::types::TypeInfo;
use crate::value::ValueKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Database parameter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DbType {
    AnsiString,
    Binary,
    Byte,
    Boolean,
    Date,
    DateTime,
    DateTimeOffset,
    Decimal,
    Double,
    Guid,
    Int16,
    Int32,
    Int64,
    SByte,
    Single,
    String,
    StringFixedLength,
    Time,
    UInt16,
    UInt32,
    UInt64,
}

impl DbType {
    pub fn of_kind(kind: ValueKind) -> Option<DbType> {
        let db_type = match kind {
            ValueKind::Bool => DbType::Boolean,
            ValueKind::I8 => DbType::SByte,
            ValueKind::I16 => DbType::Int16,
            ValueKind::I32 => DbType::Int32,
            ValueKind::I64 => DbType::Int64,
            ValueKind::U8 => DbType::Byte,
            ValueKind::U16 => DbType::UInt16,
            ValueKind::U32 => DbType::UInt32,
            ValueKind::U64 => DbType::UInt64,
            ValueKind::F32 => DbType::Single,
            ValueKind::F64 => DbType::Double,
            ValueKind::Decimal => DbType::Decimal,
            ValueKind::String => DbType::String,
            ValueKind::Char => DbType::StringFixedLength,
            ValueKind::Guid => DbType::Guid,
            ValueKind::DateTime => DbType::DateTime,
            ValueKind::DateTimeOffset => DbType::DateTimeOffset,
            ValueKind::Date => DbType::Date,
            ValueKind::Time | ValueKind::TimeSpan => DbType::Time,
            ValueKind::Bytes => DbType::Binary,
            ValueKind::Any => return None,
        };
        Some(db_type)
    }

    /// Nullable members map like their inner type, enums like their integral type.
    pub fn infer(type_info: &TypeInfo) -> Result<DbType, MappingError> {
        Self::of_kind(type_info.kind).ok_or(MappingError::UnsupportedType { type_name: type_info.name })
    }
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
