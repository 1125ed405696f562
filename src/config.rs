use std::env;
use std::net::SocketAddr;

use crate::error::AppError;
use crate::store::FirestoreConfig;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    Sqlite,
    Memory,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub backend: StoreBackend,
    pub database_url: String,
    pub firestore: Option<FirestoreConfig>,
    /// Seconds between background reloads from the store. 0 disables them.
    pub refresh_interval_secs: u64,
    pub assistant_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            backend: StoreBackend::Sqlite,
            database_url: "sqlite://schedule.db?mode=rwc".to_string(),
            firestore: None,
            refresh_interval_secs: 0,
            assistant_delay_ms: 1000,
        }
    }
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();

        let bind_addr = match lookup("BIND_ADDR") {
            Some(addr) => addr
                .parse()
                .map_err(|_| AppError::Config(format!("BIND_ADDR is not a socket address: {}", addr)))?,
            None => defaults.bind_addr,
        };

        let backend = match lookup("STORE_BACKEND").as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("sqlite") => StoreBackend::Sqlite,
            Some("firestore") => StoreBackend::Firestore,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(AppError::Config(format!("unknown STORE_BACKEND: {}", other)));
            }
        };

        let firestore = if backend == StoreBackend::Firestore {
            let project_id = lookup("FIRESTORE_PROJECT_ID")
                .ok_or_else(|| AppError::Config("FIRESTORE_PROJECT_ID is not set".to_string()))?;
            let api_key = lookup("FIRESTORE_API_KEY")
                .ok_or_else(|| AppError::Config("FIRESTORE_API_KEY is not set".to_string()))?;
            let mut config = FirestoreConfig::new(project_id, api_key);
            if let Some(database) = lookup("FIRESTORE_DATABASE") {
                config.database = database;
            }
            if let Some(base_url) = lookup("FIRESTORE_BASE_URL") {
                config.base_url = base_url;
            }
            Some(config)
        } else {
            None
        };

        Ok(Self {
            bind_addr,
            backend,
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            firestore,
            refresh_interval_secs: parse_u64(&lookup, "REFRESH_INTERVAL_SECS", defaults.refresh_interval_secs)?,
            assistant_delay_ms: parse_u64(&lookup, "ASSISTANT_DELAY_MS", defaults.assistant_delay_ms)?,
        })
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<u64, AppError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} must be a non-negative integer, got {}", key, raw))),
        None => Ok(default),
    }
}
