//! Parameter derivation: which members of a parameter object become command
//! parameters, and with what database types.

pub mod db_type;
pub mod placeholder;
pub mod provider;

pub use db_type::DbType;
pub use placeholder::placeholders;
pub use provider::{DbParameter, DbParameterInfo, ParameterProvider};
