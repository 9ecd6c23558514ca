//! Embedding configuration for logging and the bundled SQLite adapter.
//!
//! # Responsibility
//! - Parse one JSON document describing log level, log directory and storage.
//! - Bootstrap logging and open a migrated connection from it.
//!
//! # Invariants
//! - Missing fields fall back to build-mode defaults.
//! - Unknown fields are rejected so typos surface at startup.

use crate::db::{
    open_db_in_memory_with_timeout, open_db_with_timeout, DbError, DEFAULT_BUSY_TIMEOUT,
};
use crate::logging::{default_log_level, init_logging};
use rusqlite::Connection;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_BUSY_TIMEOUT_MS: u64 = DEFAULT_BUSY_TIMEOUT.as_millis() as u64;

/// Where the bundled adapter stores records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatabaseLocation {
    #[default]
    Memory,
    File { path: PathBuf },
}

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub log_level: String,
    /// Absolute directory for rolling log files; logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    pub database: DatabaseLocation,
    /// Applied to both file and in-memory databases.
    pub busy_timeout_ms: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            database: DatabaseLocation::default(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Logging(String),
    Db(DbError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::Logging(message) => write!(f, "logging init failed: {message}"),
            Self::Db(err) => write!(f, "database open failed: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Logging(_) => None,
            Self::Db(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl From<DbError> for ConfigError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl CoreConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Starts file logging when `log_dir` is configured.
    ///
    /// Returns `Ok(false)` when logging is not configured.
    pub fn init_logging(&self) -> Result<bool, ConfigError> {
        let Some(log_dir) = &self.log_dir else {
            return Ok(false);
        };
        let log_dir = log_dir
            .to_str()
            .ok_or_else(|| ConfigError::Logging("log_dir must be valid UTF-8".to_string()))?;
        init_logging(&self.log_level, log_dir).map_err(ConfigError::Logging)?;
        Ok(true)
    }

    /// Opens and migrates the configured database.
    pub fn open_database(&self) -> Result<Connection, ConfigError> {
        let conn = match &self.database {
            DatabaseLocation::Memory => open_db_in_memory_with_timeout(self.busy_timeout())?,
            DatabaseLocation::File { path } => open_db_with_timeout(path, self.busy_timeout())?,
        };
        Ok(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, DatabaseLocation};
    use std::path::PathBuf;

    #[test]
    fn empty_document_uses_defaults() {
        let config = CoreConfig::from_json_str("{}").expect("empty config parses");
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.database, DatabaseLocation::Memory);
        assert_eq!(config.busy_timeout().as_millis(), 5_000);
    }

    #[test]
    fn parses_file_database_location() {
        let config = CoreConfig::from_json_str(
            r#"{ "log_level": "warn", "database": { "kind": "file", "path": "/tmp/app.db" } }"#,
        )
        .expect("file config parses");
        assert_eq!(config.log_level, "warn");
        assert_eq!(
            config.database,
            DatabaseLocation::File {
                path: PathBuf::from("/tmp/app.db")
            }
        );
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = CoreConfig::from_json_str(r#"{ "log_levle": "info" }"#)
            .expect_err("typo must be rejected");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn logging_is_skipped_without_log_dir() {
        let started = CoreConfig::default()
            .init_logging()
            .expect("no-op logging init");
        assert!(!started);
    }

    #[test]
    fn busy_timeout_applies_to_in_memory_database() {
        let config = CoreConfig::from_json_str(r#"{ "busy_timeout_ms": 1234 }"#)
            .expect("timeout config parses");
        let conn = config.open_database().expect("in-memory database opens");
        let timeout: i64 = conn
            .query_row("PRAGMA busy_timeout;", [], |row| row.get(0))
            .expect("read busy timeout");
        assert_eq!(timeout, 1234);
    }

    #[test]
    fn opens_in_memory_database() {
        let conn = CoreConfig::default()
            .open_database()
            .expect("in-memory database opens");
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'records';",
                [],
                |row| row.get(0),
            )
            .expect("query sqlite_master");
        assert_eq!(tables, 1);
    }
}
