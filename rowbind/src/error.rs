use config::ConfigError;
use thiserror::Error;

/// Low level value conversion failure, before it gets attributed to a member.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert {source_type} to {target_type}: {reason}")]
pub struct ConvertError {
    pub source_type: &'static str,
    pub target_type: &'static str,
    pub reason: String,
}

impl ConvertError {
    pub fn new(source_type: &'static str, target_type: &'static str, reason: impl Into<String>) -> Self {
        ConvertError { source_type, target_type, reason: reason.into() }
    }

    pub fn undefined_variant(enum_name: &'static str, discriminant: i64) -> Self {
        ConvertError::new("integral", enum_name, format!("{} is not a defined discriminant", discriminant))
    }
}

/// Failure of a member setter.
#[derive(Debug, Error)]
pub enum SetError {
    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// Raised by a fallible accessor method; surfaces as [`MappingError::User`].
    #[error(transparent)]
    User(Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug, Error)]
pub enum MappingError {

    #[error("The member type {type_name} is not supported as a database parameter")]
    UnsupportedType { type_name: &'static str },

    #[error("Row {row}: null cannot be assigned to {member} of non-nullable type {target_type}")]
    NullCast { member: String, target_type: &'static str, row: usize },

    #[error("Row {row}: cannot convert {source_type} to {target_type} for {member}: {reason}")]
    InvalidCast {
        member: String,
        source_type: &'static str,
        target_type: &'static str,
        row: usize,
        reason: String,
    },

    #[error("Row without columns cannot be mapped to {target_type}")]
    EmptySchema { target_type: &'static str },

    #[error("Parameters were derived for {expected} but {actual} was supplied")]
    ParameterSource { expected: &'static str, actual: &'static str },

    #[error("Cached mapper does not produce {actual}")]
    ResultType { actual: &'static str },

    #[error(transparent)]
    User(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl MappingError {
    pub fn invalid_cast(member: &str, row: usize, err: ConvertError) -> Self {
        MappingError::InvalidCast {
            member: member.to_string(),
            source_type: err.source_type,
            target_type: err.target_type,
            row,
            reason: err.reason,
        }
    }

    pub fn null_cast(member: &str, target_type: &'static str, row: usize) -> Self {
        MappingError::NullCast { member: member.to_string(), target_type, row }
    }

    /// Stamps the row number onto cast errors raised below the mapper.
    pub fn at_row(self, row: usize) -> Self {
        match self {
            MappingError::NullCast { member, target_type, .. } => MappingError::NullCast { member, target_type, row },
            MappingError::InvalidCast { member, source_type, target_type, reason, .. } => {
                MappingError::InvalidCast { member, source_type, target_type, row, reason }
            }
            other => other,
        }
    }

    pub fn is_cast(&self) -> bool {
        matches!(self, MappingError::NullCast { .. } | MappingError::InvalidCast { .. })
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
