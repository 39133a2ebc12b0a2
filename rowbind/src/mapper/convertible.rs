use super::{first_value, ScalarShape};
use crate::error::{ConvertError, MappingError};
use crate::row::Row;
use crate::types::TypeInfo;
use crate::value::{convert, Value};

/// Scalar read of column 0 converted to the target's declared type. Columns
/// that already hold that type are taken by the direct mapper instead.
pub struct ConvertibleMapper<T> {
    info: TypeInfo,
    from_value: fn(Value) -> Result<T, ConvertError>,
}

impl<T> ConvertibleMapper<T> {
    pub fn new(shape: ScalarShape<T>) -> Self {
        ConvertibleMapper { info: shape.info, from_value: shape.from_value }
    }

    pub fn map_row(&self, row: &dyn Row, row_number: usize) -> Result<T, MappingError> {
        let (value, column) = first_value::<T>(row)?;
        if value.is_null() {
            return Err(MappingError::null_cast(&column, self.info.name, row_number));
        }
        let value = convert(value, self.info.kind).map_err(|e| MappingError::invalid_cast(&column, row_number, e))?;
        (self.from_value)(value).map_err(|e| MappingError::invalid_cast(&column, row_number, e))
    }
}
