use super::{first_value, DirectCast};
use crate::error::MappingError;
use crate::row::Row;

/// Hands column 0 through with a typed cast only.
pub struct DirectMapper<T> {
    cast: DirectCast<T>,
}

impl<T> DirectMapper<T> {
    pub fn new(cast: DirectCast<T>) -> Self {
        DirectMapper { cast }
    }

    pub fn map_row(&self, row: &dyn Row, row_number: usize) -> Result<T, MappingError> {
        let (value, column) = first_value::<T>(row)?;
        if value.is_null() && !self.cast.nullable {
            return Err(MappingError::null_cast(&column, self.cast.kind.name(), row_number));
        }
        (self.cast.cast)(value).map_err(|e| MappingError::invalid_cast(&column, row_number, e))
    }
}
