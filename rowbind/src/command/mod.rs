//! Command identities and the generational command cache.

pub mod cache;
pub mod identity;

pub use cache::{CacheStats, CommandCache, CommandCacheItem};
pub use identity::{CommandIdentity, CommandKind, TypeKey};
