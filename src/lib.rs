//! Query-execution core of the library-management data layer.
//!
//! Callers hand [`Database`] a SQL string with `?` placeholders, a closure
//! that binds the placeholders in order, and a closure that maps each row.
//!
//! ```no_run
//! use lms_db::{Database, DbConfig};
//!
//! # fn main() -> lms_db::Result<()> {
//! let db = Database::with_config(DbConfig::file("lms.db"));
//! let copies: Vec<(i32, i32)> = db.with_query_params(
//!     "SELECT id, copies FROM book_copies WHERE branch_id = ?",
//!     |row| Ok((row.get_int("id")?, row.get_int("copies")?)),
//!     |params| {
//!         params.bind_int(3)?;
//!         Ok(())
//!     },
//! )?;
//! # let _ = copies;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
mod error;
mod models;

pub use config::DbConfig;
pub use db::{ConnectionProvider, Database, ParamBinder, TableRow};
pub use error::{DbError, ErrorKind, Result};
pub use models::QueryResult;

pub fn sqlite_version() -> &'static str {
    rusqlite::version()
}
