use super::identity::CommandIdentity;
use crate::error::MappingError;
use crate::mapper::{Mappable, Mapper};
use crate::params::{DbParameter, ParameterProvider};
use crate::row::Row;
use crate::settings::CacheSettings;
use crate::{debug, info};
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// Everything reusable about one command: its SQL, how to derive its
/// parameters and, once the first row has been seen, how to map its rows.
pub struct CommandCacheItem {
    sql: Arc<str>,
    parameter_type: &'static str,
    parameters: Arc<dyn Any + Send + Sync>,
    mapper: OnceLock<Arc<dyn Any + Send + Sync>>,
    reuse: AtomicU64,
}

impl CommandCacheItem {
    pub fn new<P: 'static>(sql: &str, parameters: ParameterProvider<P>) -> Self {
        CommandCacheItem {
            sql: Arc::from(sql.trim()),
            parameter_type: type_name::<P>(),
            parameters: Arc::new(parameters),
            mapper: OnceLock::new(),
            reuse: AtomicU64::new(0),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn parameter_provider<P: 'static>(&self) -> Result<&ParameterProvider<P>, MappingError> {
        self.parameters
            .downcast_ref::<ParameterProvider<P>>()
            .ok_or(MappingError::ParameterSource { expected: self.parameter_type, actual: type_name::<P>() })
    }

    pub fn generate_parameters<P: 'static>(&self, source: &P) -> Result<Vec<DbParameter>, MappingError> {
        Ok(self.parameter_provider::<P>()?.generate_parameters(source))
    }

    pub fn mapper<T: 'static>(&self) -> Option<&Mapper<T>> {
        self.mapper.get().and_then(|m| m.downcast_ref::<Mapper<T>>())
    }

    pub fn has_mapper(&self) -> bool {
        self.mapper.get().is_some()
    }

    /// The mapper stored on this item, parsed from `sample` the first time.
    /// Once set it is never replaced.
    pub fn mapper_or_parse<T: Mappable>(&self, sample: &dyn Row) -> Result<&Mapper<T>, MappingError> {
        if self.mapper.get().is_none() {
            let parsed: Arc<dyn Any + Send + Sync> = Arc::new(Mapper::<T>::parse(sample)?);
            // a concurrent caller may have set it first, either one will do
            let _ = self.mapper.set(parsed);
        }
        self.mapper::<T>().ok_or(MappingError::ResultType { actual: type_name::<T>() })
    }

    pub fn reuse_count(&self) -> u64 {
        self.reuse.load(Ordering::Relaxed)
    }

    pub fn is_reused(&self) -> bool {
        self.reuse_count() > 0
    }

    fn mark_reused(&self) {
        self.reuse.fetch_add(1, Ordering::Relaxed);
    }
}

impl fmt::Debug for CommandCacheItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandCacheItem")
            .field("sql", &self.sql)
            .field("parameters", &self.parameter_type)
            .field("mapped", &self.has_mapper())
            .field("reuse", &self.reuse_count())
            .finish()
    }
}

type Generation = HashMap<CommandIdentity, Arc<CommandCacheItem>>;

#[derive(Default)]
struct Generations {
    first: Generation,
    second: Option<Generation>,
    collections: u64,
}

impl Generations {
    fn lookup(&self, identity: &CommandIdentity) -> Option<&Arc<CommandCacheItem>> {
        self.first.get(identity).or_else(|| self.second.as_ref().and_then(|g| g.get(identity)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub generation1: usize,
    pub generation2: usize,
    pub generation2_active: bool,
    pub collections: u64,
}

/// Two-generation command cache. New entries land in generation 1; when it is
/// full, entries that were hit at least once move to generation 2 and the
/// rest are dropped.
pub struct CommandCache {
    settings: CacheSettings,
    generations: RwLock<Generations>,
}

impl CommandCache {
    pub fn new(settings: CacheSettings) -> Self {
        CommandCache { settings, generations: RwLock::new(Generations::default()) }
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    pub fn get(&self, identity: &CommandIdentity) -> Option<Arc<CommandCacheItem>> {
        let generations = self.generations.read().unwrap_or_else(PoisonError::into_inner);
        let item = generations.lookup(identity)?;
        item.mark_reused();
        Some(item.clone())
    }

    pub fn set(&self, identity: CommandIdentity, item: Arc<CommandCacheItem>) {
        let mut generations = self.generations.write().unwrap_or_else(PoisonError::into_inner);
        self.insert(&mut generations, identity, item);
    }

    /// Cached item for `identity`, built and inserted on a miss. When two
    /// callers miss concurrently the first insert wins.
    pub fn get_or_insert_with<F>(&self, identity: CommandIdentity, build: F) -> Result<Arc<CommandCacheItem>, MappingError>
    where
        F: FnOnce() -> Result<CommandCacheItem, MappingError>,
    {
        if let Some(item) = self.get(&identity) {
            return Ok(item);
        }
        debug!("Command cache miss for {:?}", identity);
        let item = Arc::new(build()?);
        let mut generations = self.generations.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = generations.lookup(&identity) {
            return Ok(existing.clone());
        }
        self.insert(&mut generations, identity, item.clone());
        Ok(item)
    }

    fn insert(&self, generations: &mut Generations, identity: CommandIdentity, item: Arc<CommandCacheItem>) {
        if generations.first.len() >= self.settings.generation1_capacity {
            self.collect(generations);
        }
        generations.first.insert(identity, item);
    }

    fn collect(&self, generations: &mut Generations) {
        let total = generations.first.len();
        let capacity = self.settings.generation2_capacity;
        let second = generations.second.get_or_insert_with(|| HashMap::with_capacity(capacity));
        let mut kept = 0;
        for (identity, item) in generations.first.drain() {
            if item.is_reused() {
                second.insert(identity, item);
                kept += 1;
            }
        }
        generations.collections += 1;
        info!("Command cache collection {}: kept {} of {} entries, generation 2 holds {}", generations.collections, kept, total, second.len());
    }

    pub fn stats(&self) -> CacheStats {
        let generations = self.generations.read().unwrap_or_else(PoisonError::into_inner);
        CacheStats {
            generation1: generations.first.len(),
            generation2: generations.second.as_ref().map_or(0, HashMap::len),
            generation2_active: generations.second.is_some(),
            collections: generations.collections,
        }
    }

    pub fn clear(&self) {
        *self.generations.write().unwrap_or_else(PoisonError::into_inner) = Generations::default();
    }
}

impl Default for CommandCache {
    fn default() -> Self {
        CommandCache::new(CacheSettings::default())
    }
}
