//! Row source contract. Drivers expose the current row of a forward-only reader
//! through [`Row`]; mappers only use it for schema discovery and value extraction.

use crate::value::{Value, ValueKind};
use std::sync::Arc;

pub trait Row {
    fn field_count(&self) -> usize;
    fn name(&self, ordinal: usize) -> &str;
    fn field_type(&self, ordinal: usize) -> ValueKind;
    fn value(&self, ordinal: usize) -> Value;

    fn ordinal(&self, name: &str) -> Option<usize> {
        (0..self.field_count())
            .find(|&i| self.name(i) == name)
            .or_else(|| (0..self.field_count()).find(|&i| self.name(i).eq_ignore_ascii_case(name)))
    }

    fn value_by_name(&self, name: &str) -> Option<Value> {
        self.ordinal(name).map(|i| self.value(i))
    }
}

impl<R: Row + ?Sized> Row for &R {
    fn field_count(&self) -> usize {
        (**self).field_count()
    }
    fn name(&self, ordinal: usize) -> &str {
        (**self).name(ordinal)
    }
    fn field_type(&self, ordinal: usize) -> ValueKind {
        (**self).field_type(ordinal)
    }
    fn value(&self, ordinal: usize) -> Value {
        (**self).value(ordinal)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ValueKind,
}

/// Column layout of a sample row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Schema { columns }
    }

    pub fn of<R: Row + ?Sized>(row: &R) -> Self {
        let columns = (0..row.field_count())
            .map(|i| Column { name: row.name(i).to_string(), kind: row.field_type(i) })
            .collect();
        Schema { columns }
    }

    pub fn column(mut self, name: &str, kind: ValueKind) -> Self {
        self.columns.push(Column { name: name.to_string(), kind });
        self
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn first_kind(&self) -> Option<ValueKind> {
        self.columns.first().map(|c| c.kind)
    }
}

/// Materialized row over a shared schema.
#[derive(Debug, Clone)]
pub struct DataRow {
    schema: Arc<Schema>,
    values: Vec<Value>,
}

impl DataRow {
    /// Missing trailing values read as NULL, surplus values are dropped.
    pub fn new(schema: Arc<Schema>, mut values: Vec<Value>) -> Self {
        values.resize(schema.len(), Value::Null);
        DataRow { schema, values }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl Row for DataRow {
    fn field_count(&self) -> usize {
        self.schema.len()
    }

    fn name(&self, ordinal: usize) -> &str {
        &self.schema.columns[ordinal].name
    }

    fn field_type(&self, ordinal: usize) -> ValueKind {
        self.schema.columns[ordinal].kind
    }

    fn value(&self, ordinal: usize) -> Value {
        self.values[ordinal].clone()
    }
}

/// Builds rows sharing one schema, the way a reader hands them out.
#[derive(Debug, Clone)]
pub struct RowSet {
    schema: Arc<Schema>,
    rows: Vec<DataRow>,
}

impl RowSet {
    pub fn new(schema: Schema) -> Self {
        RowSet { schema: Arc::new(schema), rows: Vec::new() }
    }

    pub fn push(mut self, values: Vec<Value>) -> Self {
        self.rows.push(DataRow::new(self.schema.clone(), values));
        self
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn rows(&self) -> &[DataRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<DataRow> {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataRow {
        let schema = Schema::default().column("Id", ValueKind::I32).column("Name", ValueKind::String);
        DataRow::new(Arc::new(schema), vec![Value::I32(1), Value::String("a".into())])
    }

    #[test]
    fn looks_up_ordinals_exact_then_ignoring_case() {
        let row = sample();
        assert_eq!(row.ordinal("Name"), Some(1));
        assert_eq!(row.ordinal("name"), Some(1));
        assert_eq!(row.ordinal("missing"), None);
        assert_eq!(row.value_by_name("id"), Some(Value::I32(1)));
    }

    #[test]
    fn snapshots_schema() {
        let schema = Schema::of(&sample());
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.first_kind(), Some(ValueKind::I32));
        assert_eq!(schema.columns()[1].name, "Name");
    }

    #[test]
    fn pads_missing_values_with_null() {
        let schema = Arc::new(Schema::default().column("A", ValueKind::I32).column("B", ValueKind::I32));
        let row = DataRow::new(schema, vec![Value::I32(1)]);
        assert_eq!(row.value(1), Value::Null);
    }
}
