//! Fast member access. `#[derive(Record)]` compiles constructors, getters and
//! setters into plain function pointers; the mappers and the parameter provider
//! only ever call through these.

use crate::error::{MappingError, SetError};
use crate::types::{FromValue, TypeInfo};
use crate::value::Value;

pub type Getter<T> = fn(&T) -> Value;
pub type Setter<T> = fn(&mut T, Value) -> Result<(), SetError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Property,
}

pub struct MemberInfo<T> {
    pub name: &'static str,
    pub kind: MemberKind,
    pub type_info: TypeInfo,
    pub getter: Option<Getter<T>>,
    pub setter: Option<Setter<T>>,
}

impl<T> MemberInfo<T> {
    pub fn field(name: &'static str, type_info: TypeInfo, getter: Getter<T>, setter: Setter<T>) -> Self {
        MemberInfo { name, kind: MemberKind::Field, type_info, getter: Some(getter), setter: Some(setter) }
    }

    pub fn property(name: &'static str, type_info: TypeInfo, getter: Option<Getter<T>>, setter: Option<Setter<T>>) -> Self {
        MemberInfo { name, kind: MemberKind::Property, type_info, getter, setter }
    }

    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    pub fn is_readable(&self) -> bool {
        self.getter.is_some()
    }
}

impl<T> Clone for MemberInfo<T> {
    fn clone(&self) -> Self {
        MemberInfo { name: self.name, kind: self.kind, type_info: self.type_info, getter: self.getter, setter: self.setter }
    }
}

impl<T> std::fmt::Debug for MemberInfo<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberInfo")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("type", &self.type_info.name)
            .field("readable", &self.is_readable())
            .field("writable", &self.is_writable())
            .finish()
    }
}

/// A type whose instances can be built and populated member by member.
pub trait Record: Sized + 'static {
    fn construct() -> Self;
    /// Public fields in declaration order, followed by declared properties.
    fn members() -> Vec<MemberInfo<Self>>;
}

impl Record for () {
    fn construct() -> Self {}

    fn members() -> Vec<MemberInfo<Self>> {
        Vec::new()
    }
}

/// One argument of a positional constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgInfo {
    pub name: &'static str,
    pub type_info: TypeInfo,
}

pub type Constructor<T> = fn(Vec<Option<Value>>) -> Result<T, MappingError>;

/// Pulls the next constructor argument; an unmatched argument takes its type's default.
pub fn take_arg<A>(args: &mut std::vec::IntoIter<Option<Value>>, name: &str) -> Result<A, MappingError>
where
    A: FromValue + Default,
{
    match args.next().flatten() {
        Some(value) => A::from_value(value).map_err(|e| MappingError::invalid_cast(name, 0, e)),
        None => Ok(A::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DbTyped;
    use crate::value::ValueKind;

    #[derive(Default)]
    struct Pair {
        left: i32,
        right: String,
    }

    fn get_left(p: &Pair) -> Value {
        Value::I32(p.left)
    }

    fn set_left(p: &mut Pair, v: Value) -> Result<(), SetError> {
        p.left = i32::from_value(v)?;
        Ok(())
    }

    fn get_right(p: &Pair) -> Value {
        Value::String(p.right.clone())
    }

    fn pair_members() -> Vec<MemberInfo<Pair>> {
        vec![
            MemberInfo::field("left", i32::type_info(), get_left, set_left),
            MemberInfo::property("Right", String::type_info(), Some(get_right), None),
        ]
    }

    #[test]
    fn setters_assign_and_getters_read() {
        let members = pair_members();
        let mut pair = Pair::default();
        (members[0].setter.unwrap())(&mut pair, Value::I32(9)).unwrap();
        assert_eq!(pair.left, 9);
        assert_eq!((members[0].getter.unwrap())(&pair), Value::I32(9));
        assert!(!members[1].is_writable());
        assert_eq!(members[1].type_info.kind, ValueKind::String);
    }

    #[test]
    fn setter_rejects_wrong_kind() {
        let members = pair_members();
        let mut pair = Pair::default();
        assert!((members[0].setter.unwrap())(&mut pair, Value::String("x".into())).is_err());
    }

    #[test]
    fn unmatched_args_default() {
        let mut args = vec![Some(Value::I32(4)), None].into_iter();
        assert_eq!(take_arg::<i32>(&mut args, "a").unwrap(), 4);
        assert_eq!(take_arg::<String>(&mut args, "b").unwrap(), "");
        assert_eq!(take_arg::<Option<i32>>(&mut args, "c").unwrap(), None);
    }
}
