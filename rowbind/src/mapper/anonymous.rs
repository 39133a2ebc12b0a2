use super::binding::{coerce, match_columns};
use super::PositionalShape;
use crate::accessor::Constructor;
use crate::debug;
use crate::error::MappingError;
use crate::row::{Row, Schema};
use crate::types::TypeInfo;
use crate::value::Value;

/// A constructor argument and the column feeding it, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgumentInfo {
    pub name: &'static str,
    pub type_info: TypeInfo,
    /// `None` leaves the argument at its type's default.
    pub column: Option<usize>,
    pub needs_conversion: bool,
}

impl ArgumentInfo {
    pub fn is_enum(&self) -> bool {
        self.type_info.enumeration.is_some()
    }

    pub fn is_nullable(&self) -> bool {
        self.type_info.nullable
    }
}

/// Builds instances through a positional constructor whose arguments are bound
/// to columns by name.
pub struct AnonymousMapper<T> {
    type_name: &'static str,
    args: Vec<ArgumentInfo>,
    construct: Constructor<T>,
}

impl<T> AnonymousMapper<T> {
    pub fn new(shape: PositionalShape<T>, schema: &Schema) -> Self {
        let names: Vec<&str> = shape.args.iter().map(|a| a.name).collect();
        let columns: Vec<&str> = schema.columns().iter().map(|c| c.name.as_str()).collect();
        let mut args: Vec<ArgumentInfo> = shape
            .args
            .iter()
            .map(|a| ArgumentInfo { name: a.name, type_info: a.type_info, column: None, needs_conversion: false })
            .collect();
        for m in match_columns(&columns, &names) {
            let arg = &mut args[m.candidate];
            arg.column = Some(m.column);
            arg.needs_conversion = !arg.type_info.accepts(schema.columns()[m.column].kind);
        }
        let unmatched: Vec<&str> = args.iter().filter(|a| a.column.is_none()).map(|a| a.name).collect();
        if !unmatched.is_empty() {
            debug!("{} constructor arguments without a column: {}", shape.type_name, unmatched.join(", "));
        }
        AnonymousMapper { type_name: shape.type_name, args, construct: shape.construct }
    }

    pub fn arguments(&self) -> &[ArgumentInfo] {
        &self.args
    }

    pub fn map_row(&self, row: &dyn Row, row_number: usize) -> Result<T, MappingError> {
        let values = self
            .args
            .iter()
            .map(|arg| self.read_arg(arg, row, row_number))
            .collect::<Result<Vec<Option<Value>>, MappingError>>()?;
        (self.construct)(values).map_err(|e| e.at_row(row_number))
    }

    fn read_arg(&self, arg: &ArgumentInfo, row: &dyn Row, row_number: usize) -> Result<Option<Value>, MappingError> {
        let Some(column) = arg.column.filter(|&c| c < row.field_count()) else {
            return Ok(None);
        };
        let value = row.value(column);
        if value.is_null() {
            if arg.is_nullable() {
                return Ok(Some(Value::Null));
            }
            return Err(MappingError::null_cast(arg.name, arg.type_info.name, row_number));
        }
        coerce(value, &arg.type_info, arg.needs_conversion)
            .map(Some)
            .map_err(|e| MappingError::invalid_cast(arg.name, row_number, e))
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::{take_arg, ArgInfo};
    use crate::mapper::{Mappable, Mapper, MapperKind, Shape};
    use crate::row::DataRow;
    use crate::types::DbTyped;
    use crate::value::ValueKind;
    use std::sync::Arc;

    #[derive(Debug, PartialEq)]
    struct Point {
        x: i64,
        y: i64,
        label: Option<String>,
    }

    fn construct_point(args: Vec<Option<Value>>) -> Result<Point, MappingError> {
        let mut args = args.into_iter();
        Ok(Point {
            x: take_arg(&mut args, "x")?,
            y: take_arg(&mut args, "y")?,
            label: take_arg(&mut args, "label")?,
        })
    }

    impl Mappable for Point {
        fn shape() -> Shape<Self> {
            Shape::Positional(PositionalShape {
                type_name: "Point",
                args: vec![
                    ArgInfo { name: "x", type_info: i64::type_info() },
                    ArgInfo { name: "y", type_info: i64::type_info() },
                    ArgInfo { name: "label", type_info: <Option<String>>::type_info() },
                ],
                construct: construct_point,
            })
        }
    }

    #[derive(Debug, PartialEq)]
    struct Raw {
        payload: Value,
    }

    impl Mappable for Raw {
        fn shape() -> Shape<Self> {
            Shape::Positional(PositionalShape {
                type_name: "Raw",
                args: vec![ArgInfo { name: "payload", type_info: Value::type_info() }],
                construct: |args| {
                    let mut args = args.into_iter();
                    Ok(Raw { payload: take_arg(&mut args, "payload")? })
                },
            })
        }
    }

    fn schema() -> Arc<Schema> {
        Arc::new(Schema::default().column("X", ValueKind::I32).column("Label", ValueKind::String))
    }

    #[test]
    fn binds_arguments_by_name_and_defaults_the_rest() {
        let row = DataRow::new(schema(), vec![Value::I32(4), Value::String("p".into())]);
        let mapper = Mapper::<Point>::parse(&row).unwrap();
        assert_eq!(mapper.kind(), MapperKind::Anonymous);
        assert_eq!(mapper.map_row(&row, 0).unwrap(), Point { x: 4, y: 0, label: Some("p".into()) });
    }

    #[test]
    fn null_only_reaches_nullable_arguments() {
        let row = DataRow::new(schema(), vec![Value::I32(4), Value::Null]);
        let mapper = Mapper::<Point>::parse(&row).unwrap();
        assert_eq!(mapper.map_row(&row, 0).unwrap().label, None);

        let row = DataRow::new(schema(), vec![Value::Null, Value::Null]);
        match mapper.map_row(&row, 2).unwrap_err() {
            MappingError::NullCast { member, row, .. } => {
                assert_eq!(member, "x");
                assert_eq!(row, 2);
            }
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn untyped_arguments_take_null() {
        let schema = Arc::new(Schema::default().column("Payload", ValueKind::Bytes));
        let row = DataRow::new(schema.clone(), vec![Value::Null]);
        let mapper = Mapper::<Raw>::parse(&row).unwrap();
        assert_eq!(mapper.map_row(&row, 0).unwrap(), Raw { payload: Value::Null });
        let row = DataRow::new(schema, vec![Value::Bytes(vec![1])]);
        assert_eq!(mapper.map_row(&row, 1).unwrap(), Raw { payload: Value::Bytes(vec![1]) });
    }

    #[test]
    fn records_which_arguments_need_conversion() {
        let mapper = AnonymousMapper::new(
            match Point::shape() {
                Shape::Positional(shape) => shape,
                _ => unreachable!(),
            },
            &schema(),
        );
        let args = mapper.arguments();
        assert_eq!(args[0].column, Some(0));
        assert!(args[0].needs_conversion);
        assert_eq!(args[1].column, None);
        assert!(!args[2].needs_conversion);
        assert!(args[2].is_nullable());
    }
}
