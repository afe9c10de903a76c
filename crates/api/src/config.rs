use appreg_cache::CacheConfig;
use appreg_database::DatabaseConfig;
use appreg_storage::StorageConfig;
use serde::Deserialize;
use std::path::PathBuf;

/// Where client records live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Raw settings as read from `APPREG_*` environment variables
#[derive(Debug, Deserialize)]
struct Settings {
    server_host: String,
    server_port: u16,
    store: StoreBackend,
    session_cookie: String,
    media_root: PathBuf,
    media_url: String,
    default_logo_uri: String,
    max_upload_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub store: StoreBackend,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub session_cookie: String,
    pub storage: StorageConfig,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn load() -> Result<Self, ::config::ConfigError> {
        Self::from_source(::config::Environment::with_prefix("APPREG").try_parsing(true))
    }

    fn from_source(env: ::config::Environment) -> Result<Self, ::config::ConfigError> {
        let storage = StorageConfig::default();

        let settings: Settings = ::config::Config::builder()
            .set_default("server_host", "0.0.0.0")?
            .set_default("server_port", 3000_i64)?
            .set_default("store", "postgres")?
            .set_default("session_cookie", "sessionid")?
            .set_default("media_root", storage.media_root.to_string_lossy().to_string())?
            .set_default("media_url", storage.media_url)?
            .set_default("default_logo_uri", storage.default_logo_uri)?
            .set_default("max_upload_bytes", 5 * 1024 * 1024_i64)?
            .add_source(env)
            .build()?
            .try_deserialize()?;

        Ok(Self {
            server_host: settings.server_host,
            server_port: settings.server_port,
            store: settings.store,
            database: DatabaseConfig::from_env(),
            cache: CacheConfig::from_env(),
            session_cookie: settings.session_cookie,
            storage: StorageConfig {
                media_root: settings.media_root,
                media_url: settings.media_url,
                default_logo_uri: settings.default_logo_uri,
            },
            max_upload_bytes: settings.max_upload_bytes,
        })
    }
}
