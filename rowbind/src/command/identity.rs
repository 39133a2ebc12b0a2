use serde::{Deserialize, Serialize};
use std::any::{type_name, TypeId};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CommandKind {
    #[default]
    Text,
    StoredProcedure,
    TableDirect,
}

/// A Rust type taking part in a command identity.
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    pub id: TypeId,
    pub name: &'static str,
}

impl TypeKey {
    pub fn of<T: 'static>() -> Self {
        TypeKey { id: TypeId::of::<T>(), name: type_name::<T>() }
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

/// Cache key for a (connection, sql, kind, parameter type, result type) tuple.
#[derive(Clone)]
pub struct CommandIdentity {
    connection: Arc<str>,
    sql: Arc<str>,
    kind: CommandKind,
    parameter_type: TypeKey,
    result_type: TypeKey,
    hash: u64,
}

impl CommandIdentity {
    pub fn new(connection: &str, sql: &str, kind: CommandKind, parameter_type: TypeKey, result_type: TypeKey) -> Self {
        let mut hasher = DefaultHasher::new();
        connection.hash(&mut hasher);
        sql.hash(&mut hasher);
        kind.hash(&mut hasher);
        parameter_type.hash(&mut hasher);
        result_type.hash(&mut hasher);
        CommandIdentity {
            connection: Arc::from(connection),
            sql: Arc::from(sql),
            kind,
            parameter_type,
            result_type,
            hash: hasher.finish(),
        }
    }

    pub fn of<P: 'static, T: 'static>(connection: &str, sql: &str, kind: CommandKind) -> Self {
        Self::new(connection, sql, kind, TypeKey::of::<P>(), TypeKey::of::<T>())
    }

    pub fn connection(&self) -> &str {
        &self.connection
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn parameter_type(&self) -> TypeKey {
        self.parameter_type
    }

    pub fn result_type(&self) -> TypeKey {
        self.result_type
    }
}

impl PartialEq for CommandIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self.kind == other.kind
            && self.parameter_type == other.parameter_type
            && self.result_type == other.result_type
            && self.sql == other.sql
            && self.connection == other.connection
    }
}

impl Eq for CommandIdentity {}

impl Hash for CommandIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash)
    }
}

impl fmt::Debug for CommandIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandIdentity")
            .field("sql", &self.sql)
            .field("kind", &self.kind)
            .field("parameters", &self.parameter_type.name)
            .field("result", &self.result_type.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONN: &str = "Server=.;Database=app";
    const SQL: &str = "select * from users where Id = @Id";

    #[test]
    fn equal_components_make_equal_identities() {
        let a = CommandIdentity::of::<(i32, String), String>(CONN, SQL, CommandKind::Text);
        let b = CommandIdentity::of::<(i32, String), String>(CONN, &SQL.to_string(), CommandKind::Text);
        assert_eq!(a, b);
        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn any_changed_component_makes_a_different_identity() {
        let base = CommandIdentity::of::<i32, String>(CONN, SQL, CommandKind::Text);
        assert_ne!(base, CommandIdentity::of::<i32, String>("Server=other", SQL, CommandKind::Text));
        assert_ne!(base, CommandIdentity::of::<i32, String>(CONN, "select 1", CommandKind::Text));
        assert_ne!(base, CommandIdentity::of::<i32, String>(CONN, SQL, CommandKind::StoredProcedure));
        assert_ne!(base, CommandIdentity::of::<i64, String>(CONN, SQL, CommandKind::Text));
        assert_ne!(base, CommandIdentity::of::<i32, i32>(CONN, SQL, CommandKind::Text));
    }
}
