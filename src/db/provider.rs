//! Provider module - owns the single shared SQLite connection

use crate::config::DbConfig;
use crate::error::{DbError, Result};
use once_cell::sync::OnceCell;
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{info, warn};

/// Hands out the one connection it opens on first demand
#[derive(Debug)]
pub struct ConnectionProvider {
    /// `None` defers to [`DbConfig::from_env`] when the connection is first opened
    config: Option<DbConfig>,
    conn: OnceCell<Mutex<Connection>>,
}

impl ConnectionProvider {
    pub fn new(config: DbConfig) -> Self {
        ConnectionProvider {
            config: Some(config),
            conn: OnceCell::new(),
        }
    }

    pub fn from_env() -> Self {
        ConnectionProvider {
            config: None,
            conn: OnceCell::new(),
        }
    }

    /// Lock the shared connection, opening it if this is the first access.
    ///
    /// A failed open is reported as-is and leaves the provider unopened. A lock
    /// poisoned by a panicking mapper or binder is taken over: the statement
    /// and cursor of that call were dropped while unwinding.
    pub fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        let conn = self.conn.get_or_try_init(|| {
            let config = match &self.config {
                Some(config) => config.clone(),
                None => DbConfig::from_env()?,
            };
            open_connection(&config).map(Mutex::new)
        })?;

        Ok(conn.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn is_open(&self) -> bool {
        self.conn.get().is_some()
    }
}

fn open_connection(config: &DbConfig) -> Result<Connection> {
    let conn = if config.is_memory() {
        Connection::open_in_memory()
    } else {
        Connection::open(&config.path)
    }
    .map_err(|e| {
        warn!(path = %config.path, error = %e, "failed to open database");
        DbError::connection_with(format!("Cannot open database at {}", config.path), e)
    })?;

    conn.execute_batch(&format!(
        "PRAGMA foreign_keys = {};",
        if config.foreign_keys { "ON" } else { "OFF" }
    ))
    .map_err(|e| DbError::connection_with("Cannot set foreign_keys", e))?;

    if let Some(mode) = &config.journal_mode {
        if !mode.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DbError::connection(format!("Invalid journal_mode: {mode}")));
        }
        conn.execute_batch(&format!("PRAGMA journal_mode = {mode};"))
            .map_err(|e| DbError::connection_with(format!("Cannot set journal_mode {mode}"), e))?;
    }

    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|e| DbError::connection_with("Cannot set busy timeout", e))?;

    info!(path = %config.path, "opened shared database connection");
    Ok(conn)
}
