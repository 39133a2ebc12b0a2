use super::db_type::DbType;
use super::placeholder::placeholders;
use crate::accessor::{Getter, MemberInfo, MemberKind, Record};
use crate::command::CommandKind;
use crate::error::MappingError;
use crate::mapper::binding::underlying_name;
use crate::settings::ParameterSettings;
use crate::value::Value;
use std::fmt;

/// A parameter derived from a member of the parameter type.
pub struct DbParameterInfo<P> {
    pub name: String,
    pub db_type: DbType,
    pub is_string: bool,
    getter: Getter<P>,
}

impl<P> fmt::Debug for DbParameterInfo<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbParameterInfo")
            .field("name", &self.name)
            .field("db_type", &self.db_type)
            .field("is_string", &self.is_string)
            .finish()
    }
}

/// A typed parameter value ready to be attached to a command.
#[derive(Debug, Clone, PartialEq)]
pub struct DbParameter {
    pub name: String,
    pub db_type: DbType,
    pub value: Value,
    pub size: Option<usize>,
}

/// Readable members by name; properties replace same-named fields.
struct MemberLookup<'a, P> {
    members: Vec<&'a MemberInfo<P>>,
}

impl<'a, P> MemberLookup<'a, P> {
    fn new(members: &'a [MemberInfo<P>]) -> Self {
        let mut lookup: Vec<&'a MemberInfo<P>> = Vec::with_capacity(members.len());
        for member in members.iter().filter(|m| m.kind == MemberKind::Field) {
            lookup.push(member);
        }
        for member in members.iter().filter(|m| m.kind == MemberKind::Property) {
            match lookup.iter_mut().find(|m| m.name == member.name) {
                Some(slot) => *slot = member,
                None => lookup.push(member),
            }
        }
        MemberLookup { members: lookup }
    }

    fn find(&self, name: &str) -> Option<&'a MemberInfo<P>> {
        let key = underlying_name(name);
        self.members
            .iter()
            .find(|m| m.name == name)
            .or_else(|| self.members.iter().find(|m| m.name.to_lowercase() == name.to_lowercase()))
            .or_else(|| self.members.iter().find(|m| underlying_name(m.name) == key))
            .copied()
    }
}

/// Turns a parameter object into typed database parameters. The parameter
/// shape is fixed at construction; values are read on every call.
pub struct ParameterProvider<P> {
    parameters: Vec<DbParameterInfo<P>>,
    string_size: usize,
}

impl<P: Record> ParameterProvider<P> {
    /// Text commands take the members named by placeholders in `sql`, other
    /// command kinds take every readable member in declaration order. Either
    /// way a property hides the field it shares a name with.
    pub fn new(sql: &str, kind: CommandKind, settings: &ParameterSettings) -> Result<Self, MappingError> {
        let members: Vec<MemberInfo<P>> = P::members().into_iter().filter(MemberInfo::is_readable).collect();
        let lookup = MemberLookup::new(&members);
        let selected: Vec<(String, &MemberInfo<P>)> = match kind {
            CommandKind::Text => {
                placeholders(sql).into_iter().filter_map(|name| lookup.find(name).map(|m| (name.to_string(), m))).collect()
            }
            CommandKind::StoredProcedure | CommandKind::TableDirect => {
                lookup.members.iter().map(|m| (m.name.to_string(), *m)).collect()
            }
        };

        let mut parameters = Vec::with_capacity(selected.len());
        for (name, member) in selected {
            let Some(getter) = member.getter else { continue };
            parameters.push(DbParameterInfo {
                name,
                db_type: DbType::infer(&member.type_info)?,
                is_string: member.type_info.is_string(),
                getter,
            });
        }
        Ok(ParameterProvider { parameters, string_size: settings.string_size })
    }
}

impl<P> ParameterProvider<P> {
    pub fn empty() -> Self {
        ParameterProvider { parameters: Vec::new(), string_size: ParameterSettings::default().string_size }
    }

    pub fn parameters(&self) -> &[DbParameterInfo<P>] {
        &self.parameters
    }

    pub fn generate_parameters(&self, source: &P) -> Vec<DbParameter> {
        self.parameters.iter().map(|info| self.generate(info, source)).collect()
    }

    fn generate(&self, info: &DbParameterInfo<P>, source: &P) -> DbParameter {
        let value = (info.getter)(source);
        let (db_type, size) = match &value {
            Value::Null if info.is_string => (DbType::AnsiString, Some(1)),
            Value::Null => (info.db_type, None),
            Value::String(s) if s.chars().count() <= self.string_size => (info.db_type, Some(self.string_size)),
            _ => (info.db_type, None),
        };
        DbParameter { name: info.name.clone(), db_type, value, size }
    }
}

impl<P> fmt::Debug for ParameterProvider<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterProvider").field("parameters", &self.parameters).finish()
    }
}
