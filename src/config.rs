//! Connection configuration for the shared database handle

use crate::error::{DbError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable holding the database URL (`sqlite://path`, `sqlite::memory:`)
pub const DATABASE_URL_ENV: &str = "LMS_DATABASE_URL";

/// Environment variable overriding the busy timeout in milliseconds
pub const BUSY_TIMEOUT_ENV: &str = "LMS_DATABASE_BUSY_TIMEOUT_MS";

pub const MEMORY_PATH: &str = ":memory:";

/// Matches `sqlite:<path>` and `sqlite://<path>`; `sqlite::memory:` yields `:memory:`
static SQLITE_URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^sqlite:(?://)?(?P<path>.+)$").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// Database file path, or `:memory:`
    pub path: String,
    pub foreign_keys: bool,
    /// Journal mode PRAGMA applied on open (e.g. `WAL`); left untouched when unset
    pub journal_mode: Option<String>,
    pub busy_timeout_ms: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        DbConfig {
            path: MEMORY_PATH.to_string(),
            foreign_keys: true,
            journal_mode: None,
            busy_timeout_ms: 5000,
        }
    }
}

impl DbConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn file(path: impl AsRef<Path>) -> Self {
        DbConfig {
            path: path.as_ref().to_string_lossy().into_owned(),
            ..Self::default()
        }
    }

    /// Parse a `sqlite:` URL into a config with default settings
    pub fn from_url(url: &str) -> Result<Self> {
        let captures = SQLITE_URL_REGEX
            .captures(url.trim())
            .ok_or_else(|| DbError::connection(format!("Unsupported database URL: {url}")))?;

        Ok(DbConfig {
            path: captures["path"].to_string(),
            ..Self::default()
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| DbError::connection(format!("Invalid database config: {e}")))
    }

    /// Build the config from `LMS_DATABASE_URL` and `LMS_DATABASE_BUSY_TIMEOUT_MS`
    pub fn from_env() -> Result<Self> {
        let url = std::env::var(DATABASE_URL_ENV)
            .map_err(|_| DbError::connection(format!("{DATABASE_URL_ENV} is not set")))?;
        let mut config = Self::from_url(&url)?;

        if let Ok(timeout) = std::env::var(BUSY_TIMEOUT_ENV) {
            config.busy_timeout_ms = timeout.trim().parse().map_err(|_| {
                DbError::connection(format!("{BUSY_TIMEOUT_ENV} is not a number: {timeout}"))
            })?;
        }

        Ok(config)
    }

    pub fn is_memory(&self) -> bool {
        self.path == MEMORY_PATH
    }
}
