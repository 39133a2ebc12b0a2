use super::binding::{coerce, match_columns};
use super::ObjectShape;
use crate::accessor::{MemberInfo, MemberKind, Setter};
use crate::debug;
use crate::error::{MappingError, SetError};
use crate::row::{Row, Schema};
use crate::types::TypeInfo;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// A column bound to a writable member.
pub struct MemberSetupInfo<T> {
    pub ordinal: usize,
    pub member: &'static str,
    pub type_info: TypeInfo,
    pub needs_conversion: bool,
    setter: Setter<T>,
}

impl<T> MemberSetupInfo<T> {
    pub fn is_enum(&self) -> bool {
        self.type_info.enumeration.is_some()
    }

    pub fn is_nullable(&self) -> bool {
        self.type_info.nullable
    }
}

impl<T> fmt::Debug for MemberSetupInfo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberSetupInfo")
            .field("ordinal", &self.ordinal)
            .field("member", &self.member)
            .field("type", &self.type_info.name)
            .field("needs_conversion", &self.needs_conversion)
            .finish()
    }
}

struct MemberBinding<T> {
    column_count: usize,
    setups: Vec<MemberSetupInfo<T>>,
}

/// Assigns columns to the writable members of a default-constructed instance.
/// Bindings are rebuilt whenever a row arrives with a different column count;
/// a same-count schema with other columns keeps the old binding.
pub struct ObjectMapper<T> {
    type_name: &'static str,
    construct: fn() -> T,
    members: Vec<MemberInfo<T>>,
    binding: RwLock<Arc<MemberBinding<T>>>,
}

impl<T> ObjectMapper<T> {
    pub fn new(shape: ObjectShape<T>, schema: &Schema) -> Self {
        let mut members: Vec<MemberInfo<T>> = shape.members.into_iter().filter(MemberInfo::is_writable).collect();
        members.sort_by_key(|m| m.kind != MemberKind::Property);
        let binding = Arc::new(Self::bind(shape.type_name, &members, schema));
        ObjectMapper { type_name: shape.type_name, construct: shape.construct, members, binding: RwLock::new(binding) }
    }

    fn bind(type_name: &str, members: &[MemberInfo<T>], schema: &Schema) -> MemberBinding<T> {
        let names: Vec<&str> = members.iter().map(|m| m.name).collect();
        let columns: Vec<&str> = schema.columns().iter().map(|c| c.name.as_str()).collect();
        let matches = match_columns(&columns, &names);
        let mut setups = Vec::with_capacity(matches.len());
        for m in &matches {
            let member = &members[m.candidate];
            let Some(setter) = member.setter else { continue };
            setups.push(MemberSetupInfo {
                ordinal: m.column,
                member: member.name,
                type_info: member.type_info,
                needs_conversion: !member.type_info.accepts(schema.columns()[m.column].kind),
                setter,
            });
        }
        if setups.len() < columns.len() {
            let bound: Vec<usize> = setups.iter().map(|s| s.ordinal).collect();
            let unbound: Vec<&str> = columns.iter().enumerate().filter(|(i, _)| !bound.contains(i)).map(|(_, c)| *c).collect();
            debug!("{} has no member for columns: {}", type_name, unbound.join(", "));
        }
        MemberBinding { column_count: schema.len(), setups }
    }

    fn current(&self, row: &dyn Row) -> Arc<MemberBinding<T>> {
        let current = self.binding.read().unwrap_or_else(PoisonError::into_inner).clone();
        if current.column_count == row.field_count() {
            return current;
        }
        let rebound = Arc::new(Self::bind(self.type_name, &self.members, &Schema::of(row)));
        debug!("Re-bound {} for {} columns, was {}", self.type_name, rebound.column_count, current.column_count);
        *self.binding.write().unwrap_or_else(PoisonError::into_inner) = rebound.clone();
        rebound
    }

    pub fn map_row(&self, row: &dyn Row, row_number: usize) -> Result<T, MappingError> {
        let binding = self.current(row);
        let mut instance = (self.construct)();
        for setup in &binding.setups {
            let value = row.value(setup.ordinal);
            if value.is_null() {
                if setup.is_nullable() {
                    continue;
                }
                return Err(MappingError::null_cast(setup.member, setup.type_info.name, row_number));
            }
            let source_type = value.type_name();
            let value = coerce(value, &setup.type_info, setup.needs_conversion)
                .map_err(|e| MappingError::invalid_cast(setup.member, row_number, e))?;
            (setup.setter)(&mut instance, value).map_err(|e| match e {
                SetError::Convert(e) => MappingError::InvalidCast {
                    member: setup.member.to_string(),
                    source_type,
                    target_type: setup.type_info.name,
                    row: row_number,
                    reason: e.reason,
                },
                SetError::User(e) => MappingError::User(e),
            })?;
        }
        Ok(instance)
    }

    /// (column ordinal, member name) pairs of the current binding.
    pub fn bound_members(&self) -> Vec<(usize, &'static str)> {
        let binding = self.binding.read().unwrap_or_else(PoisonError::into_inner);
        binding.setups.iter().map(|s| (s.ordinal, s.member)).collect()
    }

    pub fn column_count(&self) -> usize {
        self.binding.read().unwrap_or_else(PoisonError::into_inner).column_count
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::Record;
    use crate::error::SetError;
    use crate::mapper::{Mappable, Mapper, MapperKind, Shape};
    use crate::row::DataRow;
    use crate::types::{DbTyped, FromValue};
    use crate::value::{Value, ValueKind};

    #[derive(Debug, Default, PartialEq)]
    struct User {
        id: i64,
        user_name: String,
        age: Option<i32>,
        score: i32,
    }

    fn get_id(u: &User) -> Value {
        Value::I64(u.id)
    }
    fn set_id(u: &mut User, v: Value) -> Result<(), SetError> {
        u.id = FromValue::from_value(v)?;
        Ok(())
    }
    fn get_name(u: &User) -> Value {
        Value::String(u.user_name.clone())
    }
    fn set_name(u: &mut User, v: Value) -> Result<(), SetError> {
        u.user_name = FromValue::from_value(v)?;
        Ok(())
    }
    fn get_age(u: &User) -> Value {
        u.age.map_or(Value::Null, Value::I32)
    }
    fn set_age(u: &mut User, v: Value) -> Result<(), SetError> {
        u.age = FromValue::from_value(v)?;
        Ok(())
    }
    fn get_score(u: &User) -> Value {
        Value::I32(u.score)
    }
    fn set_score(u: &mut User, v: Value) -> Result<(), SetError> {
        u.score = FromValue::from_value(v)?;
        Ok(())
    }

    impl Record for User {
        fn construct() -> Self {
            User::default()
        }

        fn members() -> Vec<MemberInfo<Self>> {
            vec![
                MemberInfo::field("id", i64::type_info(), get_id, set_id),
                MemberInfo::field("user_name", String::type_info(), get_name, set_name),
                MemberInfo::field("age", <Option<i32>>::type_info(), get_age, set_age),
                MemberInfo::field("score", i32::type_info(), get_score, set_score),
            ]
        }
    }

    impl Mappable for User {
        fn shape() -> Shape<Self> {
            Shape::Object(ObjectShape::of())
        }
    }

    #[derive(Debug, thiserror::Error, PartialEq)]
    #[error("score {0} is out of range")]
    struct OutOfRange(i32);

    #[derive(Debug, Default)]
    struct Checked {
        score: i32,
    }

    fn set_checked_score(c: &mut Checked, v: Value) -> Result<(), SetError> {
        let score: i32 = FromValue::from_value(v)?;
        if score > 100 {
            return Err(SetError::User(Box::new(OutOfRange(score))));
        }
        c.score = score;
        Ok(())
    }

    impl Record for Checked {
        fn construct() -> Self {
            Checked::default()
        }

        fn members() -> Vec<MemberInfo<Self>> {
            vec![MemberInfo::property("Score", i32::type_info(), None, Some(set_checked_score))]
        }
    }

    impl Mappable for Checked {
        fn shape() -> Shape<Self> {
            Shape::Object(ObjectShape::of())
        }
    }

    fn row(columns: &[(&str, ValueKind)], values: Vec<Value>) -> DataRow {
        let schema = columns.iter().fold(Schema::default(), |s, (n, k)| s.column(n, *k));
        DataRow::new(Arc::new(schema), values)
    }

    fn object(mapper: &Mapper<User>) -> &ObjectMapper<User> {
        match mapper {
            Mapper::Object(m) => m,
            other => panic!("expected object mapper, got {other:?}"),
        }
    }

    #[test]
    fn binds_fuzzy_names_and_converts() {
        let sample = row(&[("ID", ValueKind::I32), ("User_Name", ValueKind::String)], vec![Value::I32(7), Value::String("ann".into())]);
        let mapper = Mapper::<User>::parse(&sample).unwrap();
        assert_eq!(mapper.kind(), MapperKind::Object);
        let user = mapper.map_row(&sample, 0).unwrap();
        assert_eq!(user, User { id: 7, user_name: "ann".into(), age: None, score: 0 });
        let setups = object(&mapper).bound_members();
        assert_eq!(setups, vec![(0, "id"), (1, "user_name")]);
    }

    #[test]
    fn null_policy_follows_member_nullability() {
        let columns = [("Age", ValueKind::I32), ("Score", ValueKind::I32)];
        let mapper = Mapper::<User>::parse(&row(&columns, vec![Value::Null, Value::I32(1)])).unwrap();
        assert_eq!(mapper.map_row(&row(&columns, vec![Value::Null, Value::I32(1)]), 0).unwrap().age, None);

        let err = mapper.map_row(&row(&columns, vec![Value::I32(3), Value::Null]), 8).unwrap_err();
        match err {
            MappingError::NullCast { member, target_type, row } => {
                assert_eq!(member, "score");
                assert_eq!(target_type, "i32");
                assert_eq!(row, 8);
            }
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn conversion_failures_name_member_and_types() {
        let columns = [("score", ValueKind::String)];
        let mapper = Mapper::<User>::parse(&row(&columns, vec![Value::String("x".into())])).unwrap();
        match mapper.map_row(&row(&columns, vec![Value::String("high".into())]), 1).unwrap_err() {
            MappingError::InvalidCast { member, source_type, target_type, .. } => {
                assert_eq!(member, "score");
                assert_eq!(source_type, "String");
                assert_eq!(target_type, "i32");
            }
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn accessor_errors_pass_through_unchanged() {
        let columns = [("score", ValueKind::I32)];
        let mapper = Mapper::<Checked>::parse(&row(&columns, vec![Value::I32(1)])).unwrap();
        assert_eq!(mapper.map_row(&row(&columns, vec![Value::I32(70)]), 0).unwrap().score, 70);
        match mapper.map_row(&row(&columns, vec![Value::I32(130)]), 1).unwrap_err() {
            MappingError::User(e) => assert_eq!(e.downcast_ref::<OutOfRange>(), Some(&OutOfRange(130))),
            other => panic!("unexpected {other}"),
        }
        assert!(matches!(mapper.map_row(&row(&columns, vec![Value::String("x".into())]), 2), Err(MappingError::InvalidCast { .. })));
    }

    #[derive(Debug, Default, PartialEq)]
    struct Loose {
        payload: Value,
    }

    fn set_payload(l: &mut Loose, v: Value) -> Result<(), SetError> {
        l.payload = v;
        Ok(())
    }

    impl Record for Loose {
        fn construct() -> Self {
            Loose::default()
        }

        fn members() -> Vec<MemberInfo<Self>> {
            vec![MemberInfo::field("payload", Value::type_info(), |l| l.payload.clone(), set_payload)]
        }
    }

    impl Mappable for Loose {
        fn shape() -> Shape<Self> {
            Shape::Object(ObjectShape::of())
        }
    }

    #[test]
    fn untyped_members_take_null() {
        let columns = [("Payload", ValueKind::String)];
        let mapper = Mapper::<Loose>::parse(&row(&columns, vec![Value::Null])).unwrap();
        assert_eq!(mapper.map_row(&row(&columns, vec![Value::Null]), 0).unwrap(), Loose { payload: Value::Null });
        let mapped = mapper.map_row(&row(&columns, vec![Value::String("x".into())]), 1).unwrap();
        assert_eq!(mapped.payload, Value::String("x".into()));
    }

    #[test]
    fn rebinds_only_when_column_count_changes() {
        let two = [("Id", ValueKind::I64), ("Score", ValueKind::I32)];
        let mapper = Mapper::<User>::parse(&row(&two, vec![Value::I64(1), Value::I32(2)])).unwrap();
        mapper.map_row(&row(&two, vec![Value::I64(1), Value::I32(2)]), 0).unwrap();
        mapper.map_row(&row(&two, vec![Value::I64(2), Value::I32(3)]), 1).unwrap();
        assert_eq!(object(&mapper).bound_members(), vec![(0, "id"), (1, "score")]);

        // same count, different columns: the old binding stays
        let renamed = [("Age", ValueKind::I32), ("UserName", ValueKind::String)];
        assert!(mapper.map_row(&row(&renamed, vec![Value::I32(30), Value::String("bo".into())]), 2).is_err());
        assert_eq!(object(&mapper).column_count(), 2);

        let three = [("Age", ValueKind::I32), ("UserName", ValueKind::String), ("Score", ValueKind::I64)];
        let user = mapper.map_row(&row(&three, vec![Value::I32(30), Value::String("bo".into()), Value::I64(5)]), 3).unwrap();
        assert_eq!(user, User { id: 0, user_name: "bo".into(), age: Some(30), score: 5 });
        assert_eq!(object(&mapper).bound_members(), vec![(0, "age"), (1, "user_name"), (2, "score")]);
    }
}
