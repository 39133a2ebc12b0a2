use super::{first_value, BoxedRowMapper, Mapper, NullableShape, RowMapper};
use crate::error::MappingError;
use crate::row::{Row, Schema};

/// NULL in column 0 reads as `None`, anything else goes to the inner mapper.
pub struct NullableMapper<T> {
    inner_type: &'static str,
    none: fn() -> T,
    inner: BoxedRowMapper<T>,
}

impl<T> NullableMapper<T> {
    pub fn new(shape: NullableShape<T>, schema: &Schema) -> Result<Self, MappingError> {
        let inner = (shape.parse_inner)(schema)?;
        Ok(NullableMapper { inner_type: shape.inner, none: shape.none, inner })
    }

    pub fn inner_type(&self) -> &'static str {
        self.inner_type
    }

    pub fn map_row(&self, row: &dyn Row, row_number: usize) -> Result<T, MappingError> {
        let (value, _) = first_value::<T>(row)?;
        if value.is_null() {
            return Ok((self.none)());
        }
        self.inner.map_row(row, row_number)
    }
}

/// Lifts an inner mapper's result into `Some`.
pub(crate) struct SomeAdapter<U>(pub(crate) Mapper<U>);

impl<U> RowMapper<Option<U>> for SomeAdapter<U> {
    fn map_row(&self, row: &dyn Row, row_number: usize) -> Result<Option<U>, MappingError> {
        self.0.map_row(row, row_number).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use crate::mapper::{Mapper, MapperKind};
    use crate::row::{DataRow, Schema};
    use crate::value::{Value, ValueKind};
    use std::sync::Arc;

    fn rows(values: Vec<Value>) -> Vec<DataRow> {
        let schema = Arc::new(Schema::default().column("Amount", ValueKind::I32));
        values.into_iter().map(|v| DataRow::new(schema.clone(), vec![v])).collect()
    }

    #[test]
    fn wraps_a_converting_inner_mapper() {
        let rows = rows(vec![Value::I32(3), Value::Null]);
        let mapper = Mapper::<Option<i64>>::parse(&rows[0]).unwrap();
        assert_eq!(mapper.kind(), MapperKind::Nullable);
        assert_eq!(mapper.map_rows(&rows).unwrap(), vec![Some(3), None]);
    }
}
