//! Database module - query execution over a shared SQLite connection

mod database;
mod params;
mod provider;
mod row;
mod statement;

pub use database::Database;
pub use params::{json_to_sql, ParamBinder};
pub use provider::ConnectionProvider;
pub use row::TableRow;
