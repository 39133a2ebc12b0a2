//! Glue between the command cache, the parameter provider and the mappers.

use crate::accessor::Record;
use crate::command::{CommandCache, CommandCacheItem, CommandIdentity, CommandKind};
use crate::error::MappingError;
use crate::mapper::Mappable;
use crate::params::{DbParameter, ParameterProvider};
use crate::row::Row;
use crate::settings::Settings;
use std::sync::Arc;

/// A cached command together with the parameter values of one call.
#[derive(Debug, Clone)]
pub struct PreparedCommand {
    pub item: Arc<CommandCacheItem>,
    pub parameters: Vec<DbParameter>,
}

impl PreparedCommand {
    pub fn sql(&self) -> &str {
        self.item.sql()
    }
}

pub struct Engine {
    settings: Settings,
    cache: CommandCache,
}

impl Engine {
    pub fn new(settings: Settings) -> Self {
        let cache = CommandCache::new(settings.cache.clone());
        Engine { settings, cache }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cache(&self) -> &CommandCache {
        &self.cache
    }

    /// Cached item for the command, deriving its parameter shape on a miss.
    pub fn prepare<P: Record, T: Mappable>(&self, connection: &str, sql: &str, kind: CommandKind) -> Result<Arc<CommandCacheItem>, MappingError> {
        let identity = CommandIdentity::of::<P, T>(connection, sql, kind);
        self.cache.get_or_insert_with(identity, || {
            let provider = ParameterProvider::<P>::new(sql, kind, &self.settings.parameters)?;
            Ok(CommandCacheItem::new(sql, provider))
        })
    }

    pub fn command<P: Record, T: Mappable>(
        &self,
        connection: &str,
        sql: &str,
        kind: CommandKind,
        parameters: &P,
    ) -> Result<PreparedCommand, MappingError> {
        let item = self.prepare::<P, T>(connection, sql, kind)?;
        let parameters = item.generate_parameters(parameters)?;
        Ok(PreparedCommand { item, parameters })
    }

    /// Maps a result. The first row fixes the item's mapper; later results,
    /// even with another schema, go through that same mapper.
    pub fn materialize<T, R, I>(&self, item: &CommandCacheItem, rows: I) -> Result<Vec<T>, MappingError>
    where
        T: Mappable,
        R: Row,
        I: IntoIterator<Item = R>,
    {
        let mut rows = rows.into_iter();
        let Some(first) = rows.next() else {
            return Ok(Vec::new());
        };
        let mapper = item.mapper_or_parse::<T>(&first)?;
        let mut result = vec![mapper.map_row(&first, 0)?];
        for (n, row) in rows.enumerate() {
            result.push(mapper.map_row(&row, n + 1)?);
        }
        Ok(result)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(Settings::default())
    }
}
