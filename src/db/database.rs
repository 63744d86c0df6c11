//! Database module - the query executor every data-access call goes through

use crate::config::DbConfig;
use crate::db::statement::{bind_with, execute, prepare, query_rows};
use crate::db::{ConnectionProvider, ParamBinder, TableRow};
use crate::error::{DbError, Result};
use crate::models::QueryResult;
use once_cell::sync::OnceCell;

static GLOBAL: OnceCell<Database> = OnceCell::new();

/// Runs SQL against the shared connection and maps the results.
///
/// Each call prepares its own statement, binds it, executes it once and
/// drops it before returning, whether the call succeeds or not. Calls hold
/// the connection lock for their whole duration, so a mapper or binder must
/// not call back into the same `Database`.
#[derive(Debug)]
pub struct Database {
    provider: ConnectionProvider,
}

impl Database {
    pub fn new(provider: ConnectionProvider) -> Self {
        Database { provider }
    }

    pub fn with_config(config: DbConfig) -> Self {
        Self::new(ConnectionProvider::new(config))
    }

    /// The process-wide database, configured from the environment unless
    /// [`Database::init_global`] ran first. The connection itself opens on first use.
    pub fn global() -> &'static Database {
        GLOBAL.get_or_init(|| Database::new(ConnectionProvider::from_env()))
    }

    /// Install the process-wide database with an explicit config.
    ///
    /// Fails if the global database was already installed or used.
    pub fn init_global(config: DbConfig) -> Result<&'static Database> {
        GLOBAL
            .set(Database::with_config(config))
            .map_err(|_| DbError::connection("Global database is already initialized"))?;
        Ok(Self::global())
    }

    pub fn provider(&self) -> &ConnectionProvider {
        &self.provider
    }

    /// Run a query without parameters and map every row
    pub fn with_query<T, M>(&self, sql: &str, mapper: M) -> Result<Vec<T>>
    where
        M: FnMut(&TableRow<'_, '_>) -> Result<T>,
    {
        self.with_query_params(sql, mapper, |_| Ok(()))
    }

    /// Run a query, binding its placeholders with `binder`, and map every row.
    ///
    /// Rows come back in the order the database produced them. A failing
    /// mapper aborts the call and no rows are returned.
    pub fn with_query_params<T, M, B>(&self, sql: &str, mapper: M, binder: B) -> Result<Vec<T>>
    where
        M: FnMut(&TableRow<'_, '_>) -> Result<T>,
        B: FnOnce(&mut ParamBinder<'_, '_>) -> Result<()>,
    {
        let conn = self.provider.connection()?;
        let mut stmt = prepare(&conn, sql)?;
        bind_with(&mut stmt, sql, binder)?;
        query_rows(&mut stmt, sql, mapper)
    }

    pub fn with_query_one<T, M>(&self, sql: &str, mapper: M) -> Result<Option<T>>
    where
        M: FnMut(&TableRow<'_, '_>) -> Result<T>,
    {
        self.with_query_one_params(sql, mapper, |_| Ok(()))
    }

    /// First mapped row of [`Database::with_query_params`], or `None` when no row matched
    pub fn with_query_one_params<T, M, B>(&self, sql: &str, mapper: M, binder: B) -> Result<Option<T>>
    where
        M: FnMut(&TableRow<'_, '_>) -> Result<T>,
        B: FnOnce(&mut ParamBinder<'_, '_>) -> Result<()>,
    {
        let rows = self.with_query_params(sql, mapper, binder)?;
        Ok(rows.into_iter().next())
    }

    pub fn with_update(&self, sql: &str) -> Result<usize> {
        self.with_update_params(sql, |_| Ok(()))
    }

    /// Run a data-modification statement and return the number of rows it changed
    pub fn with_update_params<B>(&self, sql: &str, binder: B) -> Result<usize>
    where
        B: FnOnce(&mut ParamBinder<'_, '_>) -> Result<()>,
    {
        let conn = self.provider.connection()?;
        let mut stmt = prepare(&conn, sql)?;
        bind_with(&mut stmt, sql, binder)?;
        execute(&conn, &mut stmt, sql)
    }

    /// Like [`Database::with_update_params`], also reporting the last inserted rowid
    pub fn with_update_outcome<B>(&self, sql: &str, binder: B) -> Result<QueryResult>
    where
        B: FnOnce(&mut ParamBinder<'_, '_>) -> Result<()>,
    {
        let conn = self.provider.connection()?;
        let changes = {
            let mut stmt = prepare(&conn, sql)?;
            bind_with(&mut stmt, sql, binder)?;
            execute(&conn, &mut stmt, sql)?
        };

        Ok(QueryResult {
            changes,
            last_insert_rowid: conn.last_insert_rowid(),
        })
    }

    /// Execute a parameterless multi-statement script.
    ///
    /// `changes` counts every row the script modified.
    pub fn exec_batch(&self, sql: &str) -> Result<QueryResult> {
        let conn = self.provider.connection()?;
        let before = conn.total_changes();
        conn.execute_batch(sql)
            .map_err(|e| DbError::execution(sql, e))?;

        Ok(QueryResult {
            changes: (conn.total_changes() - before) as usize,
            last_insert_rowid: conn.last_insert_rowid(),
        })
    }
}
