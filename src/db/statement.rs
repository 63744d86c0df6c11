//! Statement module - the prepare / bind / execute steps of a single call

use crate::db::{ParamBinder, TableRow};
use crate::error::{DbError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{ffi, Connection, Statement};
use tracing::debug;

/// Matches SQL made only of whitespace, `;`, `--` line comments and `/* */` block comments
static EMPTY_SQL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\s|;|--[^\n]*|/\*[^*]*\*+(?:[^/*][^*]*\*+)*/)*$").unwrap());

/// Prepare `sql` uncached, so the statement is finalized when dropped.
///
/// SQL without any statement in it is refused here rather than at execution.
pub(crate) fn prepare<'conn>(conn: &'conn Connection, sql: &str) -> Result<Statement<'conn>> {
    if EMPTY_SQL_REGEX.is_match(sql) {
        return Err(DbError::statement(
            sql,
            rusqlite::Error::SqliteFailure(
                ffi::Error::new(ffi::SQLITE_MISUSE),
                Some("SQL contains no statement".to_string()),
            ),
        ));
    }
    conn.prepare(sql).map_err(|e| DbError::statement(sql, e))
}

/// Run the caller's binder against `stmt`, then check that no placeholder was left unbound.
///
/// SQLite treats unbound placeholders as `NULL`; that default is refused here.
pub(crate) fn bind_with<B>(stmt: &mut Statement<'_>, sql: &str, binder: B) -> Result<()>
where
    B: FnOnce(&mut ParamBinder<'_, '_>) -> Result<()>,
{
    let bound = {
        let mut params = ParamBinder::new(stmt);
        binder(&mut params)?;
        params.position()
    };

    let expected = stmt.parameter_count();
    if bound < expected {
        return Err(DbError::execution(
            sql,
            rusqlite::Error::InvalidParameterCount(bound, expected),
        ));
    }
    Ok(())
}

/// Step the bound statement as a query, mapping every row in cursor order
pub(crate) fn query_rows<T, M>(stmt: &mut Statement<'_>, sql: &str, mut mapper: M) -> Result<Vec<T>>
where
    M: FnMut(&TableRow<'_, '_>) -> Result<T>,
{
    let mut rows = stmt.raw_query();
    let mut results = Vec::new();

    while let Some(row) = rows.next().map_err(|e| DbError::execution(sql, e))? {
        results.push(mapper(&TableRow::new(row))?);
    }

    debug!(sql, rows = results.len(), "query finished");
    Ok(results)
}

/// Step the bound statement as a modification, returning the affected-row count.
///
/// The driver's per-statement count is stale after DDL, so it is only trusted
/// when the connection's running total moved.
pub(crate) fn execute(conn: &Connection, stmt: &mut Statement<'_>, sql: &str) -> Result<usize> {
    let before = conn.total_changes();
    let reported = stmt.raw_execute().map_err(|e| DbError::execution(sql, e))?;
    let changes = if conn.total_changes() == before { 0 } else { reported };

    debug!(sql, changes, "update finished");
    Ok(changes)
}
