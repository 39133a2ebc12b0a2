use crate::error::SettingsError;
use crate::info;
use crate::logger::{self, Level};
use config::{Config, Environment, File, FileFormat};
use dotenv::dotenv;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt::Debug;
use std::sync::Once;

pub const ENV_PREFIX: &str = "ROWBIND";

static DOTENV_ONCE: Once = Once::new();

fn ensure_dotenv_loaded() {
    DOTENV_ONCE.call_once(|| match dotenv() {
        Ok(_) => info!("Settings loaded including .env file."),
        Err(_) => info!("Settings loaded without .env file."),
    });
}

/// Reads `T` from an optional config file overlaid with `{prefix}__*` environment variables.
pub fn load_config<T>(path: Option<&str>, prefix: &str) -> Result<T, SettingsError>
where
    T: DeserializeOwned + Debug,
{
    ensure_dotenv_loaded();

    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::with_name(path).required(true));
    }
    let builder = builder.add_source(Environment::with_prefix(prefix).try_parsing(true).separator("__"));

    let cfg = builder.build()?.try_deserialize::<T>()?;
    info!("{:?}", cfg);
    Ok(cfg)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Entries held by generation 1 before a collection runs.
    pub generation1_capacity: usize,
    /// Initial capacity of generation 2 when the first collection creates it.
    pub generation2_capacity: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings { generation1_capacity: 5000, generation2_capacity: 2500 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParameterSettings {
    /// Strings up to this many characters are sent with this fixed size.
    pub string_size: usize,
}

impl Default for ParameterSettings {
    fn default() -> Self {
        ParameterSettings { string_size: 4000 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: Level,
}

impl Default for LogSettings {
    fn default() -> Self {
        LogSettings { level: Level::Info }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub cache: CacheSettings,
    pub parameters: ParameterSettings,
    pub log: LogSettings,
}

impl Settings {
    /// Loads from a config file plus `ROWBIND__*` environment overrides.
    pub fn new(path: &str) -> Result<Self, SettingsError> {
        Self::loaded(load_config(Some(path), ENV_PREFIX)?)
    }

    /// Defaults plus `ROWBIND__*` environment overrides.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::loaded(load_config(None, ENV_PREFIX)?)
    }

    pub fn from_toml(toml: &str) -> Result<Self, SettingsError> {
        let settings = Config::builder().add_source(File::from_str(toml, FileFormat::Toml)).build()?.try_deserialize::<Settings>()?;
        Self::loaded(settings)
    }

    fn loaded(settings: Settings) -> Result<Self, SettingsError> {
        settings.validate()?;
        logger::set_level(settings.log.level);
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.cache.generation1_capacity == 0 {
            return Err(SettingsError::Invalid { name: "cache.generation1_capacity", reason: "must be positive".into() });
        }
        if self.cache.generation2_capacity == 0 {
            return Err(SettingsError::Invalid { name: "cache.generation2_capacity", reason: "must be positive".into() });
        }
        if self.parameters.string_size == 0 {
            return Err(SettingsError::Invalid { name: "parameters.string_size", reason: "must be positive".into() });
        }
        Ok(())
    }
}
