use super::{first_value, EnumShape};
use crate::error::{ConvertError, MappingError};
use crate::row::Row;
use crate::types::EnumInfo;
use crate::value::Value;

/// Reads column 0 as the enum's underlying integral type, by variant name when
/// the column holds text, then turns the discriminant into a variant.
pub struct EnumMapper<T> {
    info: EnumInfo,
    from_value: fn(Value) -> Result<T, ConvertError>,
}

impl<T> EnumMapper<T> {
    pub fn new(shape: EnumShape<T>) -> Self {
        EnumMapper { info: shape.info, from_value: shape.from_value }
    }

    pub fn map_row(&self, row: &dyn Row, row_number: usize) -> Result<T, MappingError> {
        let (value, column) = first_value::<T>(row)?;
        if value.is_null() {
            return Err(MappingError::null_cast(&column, self.info.name, row_number));
        }
        self.info
            .to_underlying(value)
            .and_then(self.from_value)
            .map_err(|e| MappingError::invalid_cast(&column, row_number, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::{EnumShape, Mappable, Mapper, MapperKind, Shape};
    use crate::row::{DataRow, Schema};
    use crate::value::ValueKind;
    use std::sync::Arc;

    #[derive(Debug, PartialEq)]
    enum Status {
        Active,
        Inactive,
    }

    const STATUS: EnumInfo = EnumInfo { name: "Status", underlying: ValueKind::I32, variants: &[("Active", 1), ("Inactive", 2)] };

    impl Mappable for Status {
        fn shape() -> Shape<Self> {
            Shape::Enum(EnumShape {
                info: STATUS,
                from_value: |v| match v.as_i64() {
                    Some(1) => Ok(Status::Active),
                    Some(2) => Ok(Status::Inactive),
                    other => Err(ConvertError::undefined_variant("Status", other.unwrap_or_default())),
                },
            })
        }
    }

    fn row(kind: ValueKind, value: Value) -> DataRow {
        DataRow::new(Arc::new(Schema::default().column("Status", kind)), vec![value])
    }

    #[test]
    fn maps_names_and_discriminants() {
        let by_name = row(ValueKind::String, Value::String("Active".into()));
        let mapper = Mapper::<Status>::parse(&by_name).unwrap();
        assert_eq!(mapper.kind(), MapperKind::Enum);
        assert_eq!(mapper.map_row(&by_name, 0).unwrap(), Status::Active);
        assert_eq!(mapper.map_row(&row(ValueKind::I64, Value::I64(2)), 1).unwrap(), Status::Inactive);
        assert_eq!(mapper.map_row(&row(ValueKind::String, Value::String("inactive".into())), 2).unwrap(), Status::Inactive);
    }

    #[test]
    fn text_columns_holding_digits_map_by_discriminant() {
        let sample = row(ValueKind::String, Value::String("2".into()));
        let mapper = Mapper::<Status>::parse(&sample).unwrap();
        assert_eq!(mapper.map_row(&sample, 0).unwrap(), Status::Inactive);
        assert!(matches!(mapper.map_row(&row(ValueKind::String, Value::String("3".into())), 1), Err(MappingError::InvalidCast { row: 1, .. })));
    }

    #[test]
    fn undefined_values_are_cast_errors() {
        let sample = row(ValueKind::I32, Value::I32(9));
        let mapper = Mapper::<Status>::parse(&sample).unwrap();
        assert!(matches!(mapper.map_row(&sample, 4), Err(MappingError::InvalidCast { row: 4, .. })));
        assert!(matches!(mapper.map_row(&row(ValueKind::I32, Value::Null), 5), Err(MappingError::NullCast { .. })));
    }
}
