//! Error module - one error type for every failure the query core can surface

use rusqlite::Error as SqliteError;
use std::error::Error as StdError;

pub type Result<T> = std::result::Result<T, DbError>;

/// Failure category of a [`DbError`], for callers that branch on the kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Statement,
    Binding,
    Execution,
    Mapping,
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The shared connection could not be opened, configured or locked
    #[error("Connection error: {reason}")]
    Connection {
        reason: String,
        #[source]
        source: Option<SqliteError>,
    },

    /// The SQL text failed to prepare
    #[error("Statement error in `{sql}`: {source}")]
    Statement {
        sql: String,
        #[source]
        source: SqliteError,
    },

    /// The driver rejected the value bound at `position` (1-based)
    #[error("Binding error at parameter {position}: {source}")]
    Binding {
        position: usize,
        #[source]
        source: SqliteError,
    },

    #[error("Execution error in `{sql}`: {source}")]
    Execution {
        sql: String,
        #[source]
        source: SqliteError,
    },

    /// A row could not be read or converted by the mapper
    #[error("Mapping error{}: {source}", column_suffix(.column))]
    Mapping {
        column: Option<String>,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

fn column_suffix(column: &Option<String>) -> String {
    match column {
        Some(name) => format!(" on column `{name}`"),
        None => String::new(),
    }
}

impl DbError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::Connection { .. } => ErrorKind::Connection,
            DbError::Statement { .. } => ErrorKind::Statement,
            DbError::Binding { .. } => ErrorKind::Binding,
            DbError::Execution { .. } => ErrorKind::Execution,
            DbError::Mapping { .. } => ErrorKind::Mapping,
        }
    }

    pub(crate) fn connection(reason: impl Into<String>) -> Self {
        DbError::Connection {
            reason: reason.into(),
            source: None,
        }
    }

    pub(crate) fn connection_with(reason: impl Into<String>, source: SqliteError) -> Self {
        DbError::Connection {
            reason: reason.into(),
            source: Some(source),
        }
    }

    pub(crate) fn statement(sql: &str, source: SqliteError) -> Self {
        DbError::Statement {
            sql: sql.to_string(),
            source,
        }
    }

    pub(crate) fn execution(sql: &str, source: SqliteError) -> Self {
        DbError::Execution {
            sql: sql.to_string(),
            source,
        }
    }

    pub(crate) fn column(column: &str, source: SqliteError) -> Self {
        DbError::Mapping {
            column: Some(column.to_string()),
            source: Box::new(source),
        }
    }

    /// Mapping failure raised by a caller's row mapper
    pub fn mapping(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        DbError::Mapping {
            column: None,
            source: source.into(),
        }
    }

    /// Extended SQLite result code of the underlying failure, if the driver reported one
    pub fn sqlite_code(&self) -> Option<i32> {
        let source = match self {
            DbError::Connection { source, .. } => source.as_ref()?,
            DbError::Statement { source, .. }
            | DbError::Binding { source, .. }
            | DbError::Execution { source, .. } => source,
            DbError::Mapping { source, .. } => source.downcast_ref::<SqliteError>()?,
        };
        match source {
            SqliteError::SqliteFailure(err, _) => Some(err.extended_code),
            _ => None,
        }
    }
}
