//! rowbind turns query result rows into typed values and typed values into
//! command parameters.
//!
//! Row layouts are bound to target types once, by a mapper picked from the first
//! row's schema, and kept in a two-generation command cache keyed by connection,
//! SQL text, command kind, parameter type and result type. Member access is
//! generated at compile time by `#[derive(Record)]` and `#[derive(DbEnum)]`.
//!

extern crate self as rowbind;

pub mod accessor;
pub mod command;
pub mod engine;
pub mod error;
pub mod logger;
pub mod mapper;
pub mod params;
pub mod row;
pub mod settings;
pub mod types;
pub mod value;

pub use accessor::{ArgInfo, Constructor, Getter, MemberInfo, MemberKind, Record, Setter};
pub use command::{CacheStats, CommandCache, CommandCacheItem, CommandIdentity, CommandKind, TypeKey};
pub use engine::{Engine, PreparedCommand};
pub use error::{ConvertError, MappingError, SetError, SettingsError};
pub use mapper::{Mappable, Mapper, MapperKind, Shape};
pub use params::{placeholders, DbParameter, DbParameterInfo, DbType, ParameterProvider};
pub use row::{Column, DataRow, Row, RowSet, Schema};
pub use settings::{CacheSettings, LogSettings, ParameterSettings, Settings};
pub use types::{DbTyped, EnumInfo, FromValue, ToValue, TypeInfo};
pub use value::{convert, Value, ValueKind};

pub use chrono;
pub use macros::DbEnum;
pub use macros::Record;
pub use rust_decimal;
pub use uuid;
