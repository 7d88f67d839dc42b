//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use storage::{DEFAULT_NAMESPACE, StorageBackend, StorageError};
use store::StoreConfig;

/// Where the store keeps its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    Memory,
    #[default]
    File,
    Postgres,
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageKind::Memory),
            "file" | "local" => Ok(StorageKind::File),
            "postgres" | "postgresql" => Ok(StorageKind::Postgres),
            other => Err(format!("unknown storage kind: {other}")),
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `INVENTORY_STORAGE`: `memory`, `file` or `postgres` (default: `file`)
/// - `INVENTORY_DATA_DIR`: directory of the local data file (default: `./data`)
/// - `INVENTORY_NAMESPACE`: name of the local data file (default: `inventory-storage`)
/// - `DATABASE_URL`: PostgreSQL connection string, required for `postgres`
/// - `PERSIST_MAX_ATTEMPTS`: attempts per write (default: `3`)
/// - `PERSIST_BACKOFF_MS`: pause between attempts (default: `200`)
/// - `NOTIFICATION_CAPACITY`: notifications kept, 0 for no limit (default: `100`)
/// - `NOTIFICATION_DISPLAY_MS`: how long clients show a notification (default: `4000`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub storage: StorageKind,
    pub data_dir: PathBuf,
    pub namespace: String,
    pub database_url: Option<String>,
    pub persist_max_attempts: u32,
    pub persist_backoff_ms: u64,
    pub notification_capacity: usize,
    pub notification_display_ms: u64,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from any key/value source. Unparsable values
    /// fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parsed(&lookup, "PORT").unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            storage: parsed(&lookup, "INVENTORY_STORAGE").unwrap_or(defaults.storage),
            data_dir: lookup("INVENTORY_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            namespace: lookup("INVENTORY_NAMESPACE").unwrap_or(defaults.namespace),
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            persist_max_attempts: parsed(&lookup, "PERSIST_MAX_ATTEMPTS")
                .unwrap_or(defaults.persist_max_attempts),
            persist_backoff_ms: parsed(&lookup, "PERSIST_BACKOFF_MS")
                .unwrap_or(defaults.persist_backoff_ms),
            notification_capacity: parsed(&lookup, "NOTIFICATION_CAPACITY")
                .unwrap_or(defaults.notification_capacity),
            notification_display_ms: parsed(&lookup, "NOTIFICATION_DISPLAY_MS")
                .unwrap_or(defaults.notification_display_ms),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolves the configured persistence strategy.
    pub fn storage_backend(&self) -> Result<StorageBackend, StorageError> {
        match self.storage {
            StorageKind::Memory => Ok(StorageBackend::Memory),
            StorageKind::File => Ok(StorageBackend::LocalFile {
                dir: self.data_dir.clone(),
                namespace: self.namespace.clone(),
            }),
            StorageKind::Postgres => self
                .database_url
                .clone()
                .map(|url| StorageBackend::Postgres { url })
                .ok_or_else(|| {
                    StorageError::InvalidConfig("DATABASE_URL is required for postgres".to_string())
                }),
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new()
            .with_max_attempts(self.persist_max_attempts)
            .with_backoff(Duration::from_millis(self.persist_backoff_ms))
            .with_notification_capacity(self.notification_capacity)
    }
}

/// Reads and parses one key; missing or unparsable values give `None`.
fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            storage: StorageKind::default(),
            data_dir: PathBuf::from("./data"),
            namespace: DEFAULT_NAMESPACE.to_string(),
            database_url: None,
            persist_max_attempts: store::DEFAULT_PERSIST_MAX_ATTEMPTS,
            persist_backoff_ms: 200,
            notification_capacity: 100,
            notification_display_ms: 4000,
        }
    }
}
